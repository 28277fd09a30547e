//! Selector-driven extraction, the second strategy in the chain.
//!
//! Walks a fixed list of container selectors that cover the news CMSes the
//! portal actually ingests, and falls back to collecting standalone
//! paragraphs when none of them match.

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;

/// Container selectors tried in order. First match with enough text wins.
pub const CONTENT_SELECTORS: &[&str] = &[
    ".post-content",
    ".article-content",
    ".entry-content",
    "#main-content",
    ".main-content",
    ".content",
    "article",
    ".article-body",
    ".post-body",
];

/// Tags whose subtree text is never article content.
const SKIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Extract article text via the container selector list.
///
/// A matched container must carry at least `min_content_len` chars of
/// visible text, otherwise the next selector is tried. The paragraph
/// fallback keeps every `<p>` of at least `min_paragraph_len` chars.
pub fn extract(
    html: &str,
    min_content_len: usize,
    min_paragraph_len: usize,
) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);

    for css in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(container) = document.select(&selector).next() {
            let text = visible_text(container);
            if text.chars().count() >= min_content_len {
                return Ok(text);
            }
        }
    }

    let Ok(paragraph_selector) = Selector::parse("p") else {
        return Err(ExtractError::NoContent("paragraph selector".to_string()));
    };
    let blocks: Vec<String> = document
        .select(&paragraph_selector)
        .filter_map(|paragraph| {
            let text = squeeze_whitespace(&paragraph.text().collect::<String>());
            (text.chars().count() >= min_paragraph_len).then_some(text)
        })
        .collect();

    if blocks.is_empty() {
        return Err(ExtractError::NoContent(
            "no content selector matched".to_string(),
        ));
    }
    Ok(blocks.join("\n\n"))
}

/// Subtree text with page chrome stripped out, squeezed onto one line.
fn visible_text(container: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(container, &mut out);
    squeeze_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if SKIPPED_TAGS.contains(&child_element.value().name()) {
                continue;
            }
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(&text.text);
            out.push(' ');
        }
    }
}

pub(crate) fn squeeze_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
