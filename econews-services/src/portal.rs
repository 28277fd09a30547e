//! Portal facade: cached collection, pagination, article extraction.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use econews_cache::{CacheConfig, CachePriority, CacheStats, MemoryCache};
use econews_core::{
    Article, ArticleView, Category, ExtractedContent, NewsPage, PortalError, PortalResult,
    SourceConfig, SourceRegistry,
};
use econews_extract::{ContentExtractor, ExtractConfig};
use econews_feeds::{truncate_chars, FeedClient};

use crate::ingest::{IngestConfig, NewsCollector};

/// Description length in an [`ArticleView`]
const DESCRIPTION_MAX_CHARS: usize = 300;

/// Configuration for NewsPortal
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Page size when the caller passes none or nonsense
    pub default_page_size: usize,
    /// Largest accepted page size
    pub max_page_size: usize,
    /// How long a collected batch is served before re-collection
    pub result_ttl: Duration,
    /// How long extracted article bodies are kept
    pub article_ttl: Duration,
    /// Per-source entry limit for single-category collection
    pub limit_per_source: usize,
    /// Per-source entry limit when collecting every source at once
    pub limit_per_source_all: usize,
    pub ingest: IngestConfig,
    pub extract: ExtractConfig,
    pub cache: CacheConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            default_page_size: 12,
            max_page_size: 50,
            result_ttl: Duration::from_secs(300),
            article_ttl: Duration::from_secs(600),
            limit_per_source: 15,
            limit_per_source_all: 10,
            ingest: IngestConfig::default(),
            extract: ExtractConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Content and dedup cache snapshots, reported together.
#[derive(Debug, Serialize)]
pub struct PortalCacheStats {
    pub content: CacheStats,
    pub dedup: CacheStats,
}

/// The one entry point the API layer talks to.
///
/// Serves paginated news per category out of the shared cache, collecting
/// fresh batches when the cached one expired, and extracts article bodies
/// by position in the most recently served batch.
pub struct NewsPortal {
    collector: NewsCollector,
    extractor: ContentExtractor,
    registry: SourceRegistry,
    cache: Arc<MemoryCache>,
    /// Batch the most recent `collect` call served; article ids index it
    last_batch: RwLock<Vec<Article>>,
    config: PortalConfig,
}

impl NewsPortal {
    pub fn new(assist_key: Option<String>, config: PortalConfig) -> Self {
        info!(
            "Initializing NewsPortal (assist: {})",
            assist_key.is_some()
        );
        Self {
            collector: NewsCollector::new(FeedClient::new(), config.ingest.clone()),
            extractor: ContentExtractor::with_config(config.extract.clone(), assist_key),
            registry: SourceRegistry::default(),
            cache: Arc::new(MemoryCache::new(config.cache.clone())),
            last_batch: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Replace the default source registry.
    pub fn with_registry(mut self, registry: SourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Spawn the background sweepers for the content and dedup caches.
    pub fn start(&self) {
        Arc::clone(&self.cache).start();
        self.collector.start_dedup_sweeper();
    }

    /// One page of news for a category.
    ///
    /// Out-of-range paging inputs are clamped, never rejected: page floors
    /// at 1 and a size outside `1..=max_page_size` falls back to the
    /// default. The served batch becomes the reference for article ids.
    #[instrument(skip(self))]
    pub async fn collect(&self, category: Category, page: usize, page_size: usize) -> NewsPage {
        let page = page.max(1);
        let page_size = if (1..=self.config.max_page_size).contains(&page_size) {
            page_size
        } else {
            self.config.default_page_size
        };

        let batch = self.category_batch(category).await;
        {
            let mut last = self.last_batch.write().await;
            *last = batch.clone();
        }

        let total_articles = batch.len();
        let total_pages = (total_articles + page_size - 1) / page_size;
        let start = (page - 1) * page_size;
        let articles = batch
            .iter()
            .enumerate()
            .skip(start)
            .take(page_size)
            .map(|(index, article)| self.project(index, article))
            .collect();

        NewsPage {
            articles,
            page,
            total_pages,
            total_articles,
            items_per_page: page_size,
        }
    }

    /// Extract the body of an article by its id in the last served batch.
    #[instrument(skip(self))]
    pub async fn extract_content(&self, article_id: usize) -> PortalResult<ExtractedContent> {
        let article = {
            let last = self.last_batch.read().await;
            match last.get(article_id) {
                Some(article) => article.clone(),
                None => {
                    let hint = if last.is_empty() {
                        "no articles collected yet".to_string()
                    } else {
                        format!("valid range: 0-{}", last.len() - 1)
                    };
                    return Err(PortalError::not_found(format!(
                        "article {} not found, {}",
                        article_id, hint
                    )));
                }
            }
        };

        let cache_key = format!("article:{}", article.id);
        if let Some(content) = self.cache.get::<ExtractedContent>(&cache_key) {
            debug!("Serving cached content for article {}", article.id);
            return Ok(content);
        }

        let source = match self.registry.get(&article.source) {
            Some(source) => source.clone(),
            None => SourceConfig::new(&article.source, "", Category::All, &article.source, "📰"),
        };

        let content = self.extractor.extract(&article.link, &source).await;
        let extracted = ExtractedContent::new(content);
        self.cache.set(
            &cache_key,
            &extracted,
            Some(self.config.article_ttl),
            CachePriority::High,
            &["articles"],
        );
        Ok(extracted)
    }

    /// Snapshot of both caches.
    pub fn cache_stats(&self) -> PortalCacheStats {
        PortalCacheStats {
            content: self.cache.stats(),
            dedup: self.collector.dedup_stats(),
        }
    }

    /// Batch for a category, from cache or collected fresh.
    async fn category_batch(&self, category: Category) -> Vec<Article> {
        let cache_key = format!("news:{}", category);
        if let Some(batch) = self.cache.get::<Vec<Article>>(&cache_key) {
            debug!("Serving {} cached articles for {}", batch.len(), category);
            return batch;
        }

        let sources = self.registry.for_category(category);
        let limit = if category == Category::All {
            self.config.limit_per_source_all
        } else {
            self.config.limit_per_source
        };
        let batch = self.collector.collect(&sources, limit).await;
        self.cache.set(
            &cache_key,
            &batch,
            Some(self.config.result_ttl),
            CachePriority::High,
            &["news"],
        );
        batch
    }

    fn project(&self, index: usize, article: &Article) -> ArticleView {
        let (source, emoji) = match self.registry.get(&article.source) {
            Some(config) => (config.display_name.clone(), config.emoji.clone()),
            None => (article.source.clone(), "📰".to_string()),
        };
        ArticleView {
            id: index,
            title: article.title.clone(),
            link: article.link.clone(),
            source,
            emoji,
            published: article.published_at.format("%H:%M %d/%m").to_string(),
            description: truncate_chars(&article.summary, DESCRIPTION_MAX_CHARS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn article(index: usize, source: &str) -> Article {
        let tz = FixedOffset::east_opt(7 * 3600).unwrap();
        Article {
            id: format!("id{:02}", index),
            title: format!("Headline number {}", index),
            link: format!("https://news.example/story-{}", index),
            source: source.to_string(),
            published_at: tz
                .with_ymd_and_hms(2025, 1, 13, 16, 45, (index % 60) as u32)
                .unwrap(),
            summary: "Summary text. ".repeat(40),
        }
    }

    fn seeded_portal(count: usize) -> NewsPortal {
        let portal = NewsPortal::new(None, PortalConfig::default());
        let batch: Vec<Article> = (0..count).map(|i| article(i, "cafef_stocks")).collect();
        portal.cache.set(
            "news:domestic",
            &batch,
            Some(Duration::from_secs(300)),
            CachePriority::High,
            &["news"],
        );
        portal
    }

    #[tokio::test]
    async fn test_pagination_and_clamping() {
        let portal = seeded_portal(25);

        // Nonsense paging inputs fall back to page 1, default size.
        let page = portal.collect(Category::Domestic, 0, 0).await;
        assert_eq!(page.page, 1);
        assert_eq!(page.items_per_page, 12);
        assert_eq!(page.total_articles, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.articles.len(), 12);
        assert_eq!(page.articles[0].id, 0);

        // Oversized page size also falls back to the default.
        let page = portal.collect(Category::Domestic, 1, 200).await;
        assert_eq!(page.items_per_page, 12);

        // Article ids are absolute positions in the batch, not per page.
        let page = portal.collect(Category::Domestic, 3, 12).await;
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.articles[0].id, 24);

        // Paging past the end yields an empty page, not an error.
        let page = portal.collect(Category::Domestic, 99, 12).await;
        assert!(page.articles.is_empty());
        assert_eq!(page.page, 99);
    }

    #[tokio::test]
    async fn test_projection_uses_registry_display() {
        let portal = seeded_portal(1);
        let page = portal.collect(Category::Domestic, 1, 12).await;
        let view = &page.articles[0];
        assert_eq!(view.source, "CafeF CK");
        assert_eq!(view.emoji, "📊");
        assert_eq!(view.published, "16:45 13/01");
        // 560-char summary is cut at 300 chars plus the ellipsis.
        assert_eq!(view.description.chars().count(), 303);
        assert!(view.description.ends_with("..."));
    }

    #[tokio::test]
    async fn test_projection_falls_back_for_unknown_source() {
        let portal = NewsPortal::new(None, PortalConfig::default());
        let batch = vec![article(0, "mystery_feed")];
        portal.cache.set(
            "news:tech",
            &batch,
            Some(Duration::from_secs(300)),
            CachePriority::High,
            &["news"],
        );
        let page = portal.collect(Category::Tech, 1, 12).await;
        assert_eq!(page.articles[0].source, "mystery_feed");
        assert_eq!(page.articles[0].emoji, "📰");
    }

    #[tokio::test]
    async fn test_extract_content_range_errors() {
        let portal = seeded_portal(3);

        // Nothing served yet, so every id is out of range.
        let err = portal.extract_content(0).await.unwrap_err();
        assert!(err.to_string().contains("no articles collected yet"));

        portal.collect(Category::Domestic, 1, 12).await;
        let err = portal.extract_content(3).await.unwrap_err();
        assert!(err.to_string().contains("valid range: 0-2"));
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_extract_content_serves_cached_body() {
        let portal = seeded_portal(3);
        portal.collect(Category::Domestic, 1, 12).await;

        let stored = ExtractedContent::new("Cached article body with six words".to_string());
        portal.cache.set(
            "article:id01",
            &stored,
            Some(Duration::from_secs(600)),
            CachePriority::High,
            &["articles"],
        );

        let extracted = portal.extract_content(1).await.unwrap();
        assert_eq!(extracted.content, "Cached article body with six words");
        assert_eq!(extracted.word_count, 6);
    }

    #[tokio::test]
    async fn test_cache_stats_snapshot() {
        let portal = seeded_portal(2);
        portal.collect(Category::Domestic, 1, 12).await;
        let stats = portal.cache_stats();
        assert_eq!(stats.content.entries, 1);
        assert_eq!(stats.content.hits, 1);
        assert_eq!(stats.dedup.entries, 0);
    }
}
