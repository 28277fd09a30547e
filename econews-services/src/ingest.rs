//! Concurrent collection across sources under a wall-clock budget.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use econews_cache::CacheStats;
use econews_core::{Article, SourceConfig};
use econews_feeds::{normalize, FeedClient};

use crate::dedup::DedupRegistry;

/// Configuration for NewsCollector
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Sources fetched in parallel
    pub max_concurrent_sources: usize,
    /// Wall-clock budget for one collection run
    pub collect_budget: Duration,
    /// How long an admitted article keeps blocking duplicates
    pub dedup_ttl: Duration,
    /// Entry ceiling of the dedup registry
    pub dedup_max_entries: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sources: 4,
            collect_budget: Duration::from_secs(30),
            dedup_ttl: Duration::from_secs(6 * 60 * 60),
            dedup_max_entries: 1000,
        }
    }
}

/// Fans fetches out across sources and folds completions into one batch.
pub struct NewsCollector {
    feeds: FeedClient,
    dedup: DedupRegistry,
    config: IngestConfig,
}

impl NewsCollector {
    pub fn new(feeds: FeedClient, config: IngestConfig) -> Self {
        Self {
            feeds,
            dedup: DedupRegistry::new(config.dedup_max_entries, config.dedup_ttl),
            config,
        }
    }

    /// Fetch every source concurrently and return admitted articles sorted
    /// newest first.
    ///
    /// Never errors: failed sources contribute zero articles, and when the
    /// budget runs out, whatever completed by then is returned. Ties on
    /// publish time keep their admission order.
    pub async fn collect(
        &self,
        sources: &[&SourceConfig],
        limit_per_source: usize,
    ) -> Vec<Article> {
        let swept = self.dedup.sweep();
        if swept > 0 {
            debug!("Dedup registry dropped {} expired records", swept);
        }

        let deadline = Instant::now() + self.config.collect_budget;
        let fetches: Vec<_> = sources
            .iter()
            .map(|&source| {
                let feeds = &self.feeds;
                async move {
                    let outcome = feeds.fetch_feed(source, limit_per_source).await;
                    (source.id.clone(), outcome)
                }
            })
            .collect();
        let completions = drain_within(
            stream::iter(fetches).buffer_unordered(self.config.max_concurrent_sources.max(1)),
            deadline,
        )
        .await;

        let mut collected: Vec<Article> = Vec::new();
        let mut batch_titles: HashSet<String> = HashSet::new();
        for (source_id, outcome) in completions {
            match outcome {
                Ok(articles) => {
                    let admitted = self.admit(articles, &mut batch_titles, &mut collected);
                    debug!("Source {} contributed {} articles", source_id, admitted);
                }
                Err(err) => {
                    warn!("Source {} failed: {}", source_id, err);
                }
            }
        }

        sort_newest_first(&mut collected);
        info!(
            "Collected {} articles from {} sources",
            collected.len(),
            sources.len()
        );
        collected
    }

    /// Admit articles in completion order: normalized-title dedup within the
    /// batch first, then the cross-run registry.
    fn admit(
        &self,
        articles: Vec<Article>,
        batch_titles: &mut HashSet<String>,
        collected: &mut Vec<Article>,
    ) -> usize {
        let mut admitted = 0;
        for article in articles {
            if !batch_titles.insert(normalize(&article.title)) {
                continue;
            }
            if self.dedup.seen_or_record(&article) {
                continue;
            }
            collected.push(article);
            admitted += 1;
        }
        admitted
    }

    pub fn dedup_stats(&self) -> CacheStats {
        self.dedup.stats()
    }

    /// Spawn the dedup registry's background expiry sweeper.
    pub fn start_dedup_sweeper(&self) {
        self.dedup.start();
    }
}

/// Newest first; `sort_by` is stable, so equal timestamps keep their
/// admission order.
fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Drain stream completions until it ends or `deadline` passes. Pending
/// work past the deadline is abandoned with the stream.
async fn drain_within<S, T>(mut completions: S, deadline: Instant) -> Vec<T>
where
    S: Stream<Item = T> + Unpin,
{
    let mut items = Vec::new();
    loop {
        match tokio::time::timeout_at(deadline, completions.next()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => break,
            Err(_) => {
                warn!("Collection budget exhausted, keeping partial results");
                break;
            }
        }
    }
    items
}
