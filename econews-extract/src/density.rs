//! Block text-density extraction, the third strategy in the chain.
//!
//! Collects leaf block elements in document order and keeps the ones that
//! read like prose: enough text of their own and only a small share of it
//! inside anchors. Catches pages the selector list and the scoring pass
//! both miss, typically minimal templates without any content markup.

use scraper::{ElementRef, Html, Selector};

use crate::dom::squeeze_whitespace;
use crate::error::ExtractError;
use crate::readability::link_density;

/// Blocks with a higher share of anchor text are treated as navigation.
const MAX_ANCHOR_RATIO: f32 = 0.33;

/// Tags that make a block a container rather than a leaf.
const BLOCK_CONTAINERS: &[&str] = &[
    "p", "div", "section", "article", "ul", "ol", "table", "blockquote", "pre", "header",
    "footer", "aside", "nav",
];

/// Tags never part of the article body.
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// Keep dense leaf blocks of at least `min_block_len` chars, joined with
/// blank lines.
pub fn extract(html: &str, min_block_len: usize) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);
    let Ok(block_selector) = Selector::parse("p, li, blockquote, pre, td, div, section, article")
    else {
        return Err(ExtractError::NoContent("block selector".to_string()));
    };

    let blocks: Vec<String> = document
        .select(&block_selector)
        .filter_map(|element| {
            if has_block_children(element) || inside_page_chrome(element) {
                return None;
            }
            let text = squeeze_whitespace(&element.text().collect::<String>());
            if text.chars().count() < min_block_len {
                return None;
            }
            if link_density(&element) > MAX_ANCHOR_RATIO {
                return None;
            }
            Some(text)
        })
        .collect();

    if blocks.is_empty() {
        return Err(ExtractError::NoContent("no dense text blocks".to_string()));
    }
    Ok(blocks.join("\n\n"))
}

fn has_block_children(element: ElementRef<'_>) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| BLOCK_CONTAINERS.contains(&child.value().name()))
}

fn inside_page_chrome(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| CHROME_TAGS.contains(&ancestor.value().name()))
}
