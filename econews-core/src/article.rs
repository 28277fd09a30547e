//! Article types shared across the portal

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One syndicated feed entry, normalized at parse time.
///
/// Both `title` and `link` are guaranteed non-empty: entries missing either
/// are dropped by the feed parser before an `Article` is ever constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Stable id derived from the link (sha256 prefix, hex)
    pub id: String,
    /// Entity-decoded headline
    pub title: String,
    /// Canonical article URL
    pub link: String,
    /// Key into the source registry
    pub source: String,
    /// Publication time in the reporting timezone; ingestion time when the
    /// feed omitted a date
    pub published_at: DateTime<FixedOffset>,
    /// Plain-text description, bounded at 500 chars
    pub summary: String,
}

/// Display projection of an [`Article`] returned by the portal façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleView {
    /// Absolute index into the collected batch (`page_start + i`)
    pub id: usize,
    pub title: String,
    pub link: String,
    /// Display name of the source, not the registry key
    pub source: String,
    pub emoji: String,
    /// Publication time formatted `%H:%M %d/%m`
    pub published: String,
    /// Description truncated at 300 chars
    pub description: String,
}

/// One page of collected news.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsPage {
    pub articles: Vec<ArticleView>,
    pub page: usize,
    pub total_pages: usize,
    pub total_articles: usize,
    pub items_per_page: usize,
}

/// Result of running the extraction chain against one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub content: String,
    /// Whitespace-split token count of `content`
    pub word_count: usize,
}

impl ExtractedContent {
    pub fn new(content: String) -> Self {
        let word_count = content.split_whitespace().count();
        Self {
            content,
            word_count,
        }
    }
}

/// Minimal record kept in the dedup cache instead of the full article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowRecord {
    pub title: String,
    pub link: String,
    pub source: String,
    pub recorded_at: DateTime<FixedOffset>,
}

impl ShadowRecord {
    pub fn of(article: &Article, recorded_at: DateTime<FixedOffset>) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            source: article.source.clone(),
            recorded_at,
        }
    }
}
