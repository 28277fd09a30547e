//! Source registry: which feeds the portal ingests and how they display

use serde::{Deserialize, Serialize};

use crate::error::PortalError;

/// News category served by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    All,
    Domestic,
    International,
    Tech,
    Crypto,
}

impl Category {
    pub const VALID: &'static [&'static str] =
        &["all", "domestic", "international", "tech", "crypto"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Domestic => "domestic",
            Category::International => "international",
            Category::Tech => "tech",
            Category::Crypto => "crypto",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Category::All),
            "domestic" => Ok(Category::Domestic),
            "international" => Ok(Category::International),
            "tech" => Ok(Category::Tech),
            "crypto" => Ok(Category::Crypto),
            other => Err(PortalError::not_found(format!(
                "unknown news category '{}', valid: {}",
                other,
                Category::VALID.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured feed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Registry key, referenced by [`crate::Article::source`]
    pub id: String,
    /// Feed URL
    pub url: String,
    pub category: Category,
    /// Name shown to readers
    pub display_name: String,
    /// Glyph shown next to the source name
    pub emoji: String,
    /// Trusted sources bypass the relevance filter
    pub trusted: bool,
    /// Assisted sources are eligible for the AI extraction strategy
    pub assisted: bool,
}

impl SourceConfig {
    pub fn new(
        id: &str,
        url: &str,
        category: Category,
        display_name: &str,
        emoji: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            category,
            display_name: display_name.to_string(),
            emoji: emoji.to_string(),
            trusted: false,
            assisted: false,
        }
    }

    pub fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    pub fn assisted(mut self) -> Self {
        self.assisted = true;
        self
    }
}

/// Static lookup over the configured sources.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceConfig>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<SourceConfig>) -> Self {
        Self { sources }
    }

    pub fn get(&self, id: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Sources belonging to a category; `All` returns every source.
    pub fn for_category(&self, category: Category) -> Vec<&SourceConfig> {
        self.sources
            .iter()
            .filter(|s| category == Category::All || s.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new(default_sources())
    }
}

/// Curated source list for the portal.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        // Vietnamese market coverage (CafeF) - always relevant
        SourceConfig::new(
            "cafef_stocks",
            "https://cafef.vn/thi-truong-chung-khoan.rss",
            Category::Domestic,
            "CafeF CK",
            "📊",
        )
        .trusted(),
        SourceConfig::new(
            "cafef_realestate",
            "https://cafef.vn/bat-dong-san.rss",
            Category::Domestic,
            "CafeF BĐS",
            "🏘️",
        )
        .trusted(),
        SourceConfig::new(
            "cafef_business",
            "https://cafef.vn/doanh-nghiep.rss",
            Category::Domestic,
            "CafeF DN",
            "🏭",
        )
        .trusted(),
        SourceConfig::new(
            "cafef_finance",
            "https://cafef.vn/tai-chinh-ngan-hang.rss",
            Category::Domestic,
            "CafeF TC",
            "💳",
        )
        .trusted(),
        SourceConfig::new(
            "cafef_macro",
            "https://cafef.vn/vi-mo-dau-tu.rss",
            Category::Domestic,
            "CafeF VM",
            "📉",
        )
        .trusted(),
        // International market coverage - keyword-filtered, AI-assisted extraction
        SourceConfig::new(
            "marketwatch",
            "https://feeds.content.dowjones.io/public/rss/mw_topstories",
            Category::International,
            "MarketWatch",
            "📰",
        )
        .assisted(),
        SourceConfig::new(
            "cnbc",
            "https://www.cnbc.com/id/100003114/device/rss/rss.html",
            Category::International,
            "CNBC",
            "📺",
        )
        .assisted(),
        SourceConfig::new(
            "investing_com",
            "https://www.investing.com/rss/news.rss",
            Category::International,
            "Investing.com",
            "💹",
        )
        .assisted(),
        // Tech
        SourceConfig::new(
            "techcrunch",
            "https://feeds.feedburner.com/TechCrunch/",
            Category::Tech,
            "TechCrunch",
            "🚀",
        ),
        SourceConfig::new(
            "ars_technica",
            "http://feeds.arstechnica.com/arstechnica/index",
            Category::Tech,
            "Ars Technica",
            "⚙️",
        ),
        // Crypto
        SourceConfig::new(
            "cointelegraph",
            "https://cointelegraph.com/rss",
            Category::Crypto,
            "Cointelegraph",
            "🪙",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources() {
        let registry = SourceRegistry::default();
        assert_eq!(registry.len(), 11);
        assert!(registry.get("cafef_stocks").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_category_filter() {
        let registry = SourceRegistry::default();
        assert_eq!(registry.for_category(Category::All).len(), registry.len());
        assert_eq!(registry.for_category(Category::Domestic).len(), 5);
        assert_eq!(registry.for_category(Category::Crypto).len(), 1);
    }

    #[test]
    fn test_trust_and_assist_flags() {
        let registry = SourceRegistry::default();
        assert!(registry.get("cafef_macro").is_some_and(|s| s.trusted));
        assert!(registry.get("marketwatch").is_some_and(|s| s.assisted));
        assert!(registry
            .get("techcrunch")
            .is_some_and(|s| !s.trusted && !s.assisted));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("tech".parse::<Category>().ok(), Some(Category::Tech));
        assert_eq!("ALL".parse::<Category>().ok(), Some(Category::All));
        assert!("sports".parse::<Category>().is_err());
    }
}
