//! Cross-run duplicate suppression backed by its own bounded cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use econews_cache::{CacheConfig, CachePriority, CacheStats, MemoryCache};
use econews_core::{Article, ShadowRecord};
use econews_feeds::normalize;

/// Remembers which articles recent collection runs already admitted.
///
/// Every admitted article is recorded under two keys, its normalized title
/// and its canonicalized link, and a match on either suppresses the
/// newcomer. A syndicated reprint under a fresh link and a retitled story
/// behind the same link are both caught. Values are small shadow records
/// rather than full articles, and entries age out on their own, so a story
/// republished after the TTL is admitted again.
pub struct DedupRegistry {
    cache: Arc<MemoryCache>,
}

fn title_key(title: &str) -> String {
    format!("title:{}", normalize(title))
}

fn link_key(link: &str) -> String {
    format!("link:{}", link.trim().to_lowercase())
}

impl DedupRegistry {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let cache = MemoryCache::new(CacheConfig {
            max_entries,
            default_ttl: Some(ttl),
            ..CacheConfig::default()
        });
        Self {
            cache: Arc::new(cache),
        }
    }

    /// True when the article's title or link was admitted by a recent run.
    /// First sight records both and returns false.
    pub fn seen_or_record(&self, article: &Article) -> bool {
        let by_title = title_key(&article.title);
        let by_link = link_key(&article.link);
        if self.cache.contains(&by_title) || self.cache.contains(&by_link) {
            debug!("Duplicate suppressed: {}", article.title);
            return true;
        }
        let recorded_at = Utc::now().with_timezone(article.published_at.offset());
        let record = ShadowRecord::of(article, recorded_at);
        self.cache
            .set(&by_title, &record, None, CachePriority::Medium, &[]);
        self.cache
            .set(&by_link, &record, None, CachePriority::Medium, &[]);
        false
    }

    /// Drop expired records so old keys stop blocking readmission.
    pub fn sweep(&self) -> usize {
        self.cache.clear_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Spawn the background expiry sweeper for the underlying cache.
    pub fn start(&self) {
        Arc::clone(&self.cache).start();
    }
}

impl Default for DedupRegistry {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(6 * 60 * 60))
    }
}
