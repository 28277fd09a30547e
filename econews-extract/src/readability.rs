//! Scoring-based extraction, the first strategy in the chain.
//!
//! Classic readability approach: every paragraph feeds points into its
//! ancestors based on text mass and comma count, ancestors start from a tag
//! and class/id prior, and the best-scoring candidate (after a link-density
//! penalty) supplies the article body.

use std::collections::HashMap;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::dom::squeeze_whitespace;
use crate::error::ExtractError;

/// Class/id fragments that mark an element as likely article content.
const POSITIVE_HINTS: &[&str] = &[
    "article", "body", "content", "entry", "main", "page", "post", "text", "blog", "story",
];

/// Class/id fragments that mark an element as page chrome.
const NEGATIVE_HINTS: &[&str] = &[
    "banner", "combx", "comment", "contact", "foot", "footer", "masthead", "media", "meta",
    "nav", "promo", "related", "scroll", "shoutbox", "sidebar", "sponsor", "shopping", "tags",
    "tool", "widget", "hidden",
];

/// Scoring knobs. Defaults follow the usual readability constants.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Paragraphs shorter than this contribute nothing
    pub min_paragraph_score_len: usize,
    /// One point per full chunk of this many chars
    pub text_chunk_len: usize,
    /// Cap on chunk points per paragraph
    pub max_chunk_points: f32,
    /// Weight of each comma
    pub comma_weight: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_paragraph_score_len: 25,
            text_chunk_len: 100,
            max_chunk_points: 3.0,
            comma_weight: 1.0,
        }
    }
}

/// Winning candidate of a scoring pass.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    /// Final candidate score after the link-density penalty
    pub score: f32,
    /// Candidate text, paragraphs joined with blank lines
    pub content: String,
}

/// Run the scoring pass and return the best candidate's text.
pub fn extract(html: &str, config: &ScoreConfig) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);
    match score_document(&document, config) {
        Some(result) if result.score > 0.0 && !result.content.is_empty() => Ok(result.content),
        _ => Err(ExtractError::NoContent(
            "no readable candidate".to_string(),
        )),
    }
}

/// Score every candidate and return the best one, if any.
pub fn score_document(document: &Html, config: &ScoreConfig) -> Option<ScoreResult> {
    let paragraph_selector = Selector::parse("p").ok()?;

    let mut scores: HashMap<NodeId, f32> = HashMap::new();
    for paragraph in document.select(&paragraph_selector) {
        let text = squeeze_whitespace(&paragraph.text().collect::<String>());
        if text.chars().count() < config.min_paragraph_score_len {
            continue;
        }
        let points = content_density_score(&text, config);

        // Full points to the parent, half to the grandparent.
        let mut ancestor = paragraph.parent().and_then(ElementRef::wrap);
        let mut share = 1.0;
        for _ in 0..2 {
            let Some(element) = ancestor else {
                break;
            };
            let entry = scores.entry(element.id()).or_insert_with(|| {
                base_tag_score(element.value().name()) + class_id_weight(&element)
            });
            *entry += points / share;
            share *= 2.0;
            ancestor = element.parent().and_then(ElementRef::wrap);
        }
    }

    let (candidate, score) = scores
        .iter()
        .filter_map(|(&id, &raw_score)| {
            let element = ElementRef::wrap(document.tree.get(id)?)?;
            Some((element, raw_score * (1.0 - link_density(&element))))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    let blocks: Vec<String> = candidate
        .select(&paragraph_selector)
        .filter_map(|paragraph| {
            let text = squeeze_whitespace(&paragraph.text().collect::<String>());
            (!text.is_empty()).then_some(text)
        })
        .collect();

    let content = if blocks.is_empty() {
        squeeze_whitespace(&candidate.text().collect::<String>())
    } else {
        blocks.join("\n\n")
    };

    Some(ScoreResult { score, content })
}

/// Prior score for a candidate tag.
pub fn base_tag_score(tag: &str) -> f32 {
    match tag {
        "article" | "main" => 10.0,
        "div" | "section" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

/// Class/id prior: +25 per attribute with a positive hint, -25 per negative.
pub fn class_id_weight(element: &ElementRef<'_>) -> f32 {
    let mut weight = 0.0;
    for attr in ["class", "id"] {
        if let Some(value) = element.value().attr(attr) {
            let value = value.to_lowercase();
            if POSITIVE_HINTS.iter().any(|hint| value.contains(hint)) {
                weight += 25.0;
            }
            if NEGATIVE_HINTS.iter().any(|hint| value.contains(hint)) {
                weight -= 25.0;
            }
        }
    }
    weight
}

/// Points a paragraph contributes: 1 + commas + capped length chunks.
pub fn content_density_score(text: &str, config: &ScoreConfig) -> f32 {
    let commas = text.matches(',').count() as f32;
    let chunks = (text.chars().count() / config.text_chunk_len) as f32;
    1.0 + commas * config.comma_weight + chunks.min(config.max_chunk_points)
}

/// Share of a candidate's text that sits inside anchors, in `0.0..=1.0`.
pub fn link_density(element: &ElementRef<'_>) -> f32 {
    let total: usize = element.text().map(str::len).sum();
    if total == 0 {
        return 0.0;
    }
    let Ok(anchor_selector) = Selector::parse("a") else {
        return 0.0;
    };
    let linked: usize = element
        .select(&anchor_selector)
        .map(|anchor| anchor.text().map(str::len).sum::<usize>())
        .sum();
    (linked as f32 / total as f32).min(1.0)
}
