//! Feed client: fetches and parses RSS/Atom documents into articles

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use rand::seq::IndexedRandom;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use econews_core::{Article, SourceConfig};

use crate::error::FeedError;
use crate::normalize::{strip_html, truncate_chars};
use crate::relevance::is_relevant;

/// Cap on stored summary length, in characters.
const SUMMARY_MAX_CHARS: usize = 500;

/// Browser User-Agent pool, rotated per request for feed endpoints that
/// reject obvious bot agents.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36 Edg/121.0.0.0",
];

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Configuration for [`FeedClient`]
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// Hard per-request timeout
    pub fetch_timeout: Duration,
    /// Offset of the reporting timezone, in hours east of UTC
    pub reporting_offset_hours: i32,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(20),
            reporting_offset_hours: 7,
        }
    }
}

/// HTTP client for feed documents
pub struct FeedClient {
    client: Client,
    config: FeedClientConfig,
}

impl FeedClient {
    /// Create a client with default configuration
    pub fn new() -> Self {
        Self::with_config(FeedClientConfig::default())
    }

    pub fn with_config(config: FeedClientConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.fetch_timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    /// Fetch one source's feed and map its entries into articles.
    ///
    /// The primary fetch carries a rotated browser User-Agent; if it fails,
    /// one independent plain fetch is attempted before giving up. Per-entry
    /// failures are skipped silently, so a healthy feed with a few malformed
    /// entries still yields the rest.
    #[instrument(skip(self, source), fields(source = %source.id))]
    pub async fn fetch_feed(
        &self,
        source: &SourceConfig,
        limit: usize,
    ) -> Result<Vec<Article>, FeedError> {
        let content = match self.fetch_bytes(&source.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Primary fetch failed for {}: {}, refetching plain", source.id, e);
                self.refetch_plain(&source.url).await?
            }
        };

        self.parse_document(&content, source, limit)
    }

    /// Fetch raw feed bytes with a rotated User-Agent
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FeedError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", random_user_agent())
            .send()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::FeedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))
    }

    /// Second, independent fetch without the browser headers.
    ///
    /// Intentional redundancy against transient primary-fetch failures,
    /// not a retry loop.
    async fn refetch_plain(&self, url: &str) -> Result<Bytes, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::FeedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))
    }

    /// Parse feed bytes, trying RSS first and Atom second
    fn parse_document(
        &self,
        content: &[u8],
        source: &SourceConfig,
        limit: usize,
    ) -> Result<Vec<Article>, FeedError> {
        if let Ok(channel) = rss::Channel::read_from(content) {
            return Ok(self.map_rss_items(&channel, source, limit));
        }

        if let Ok(atom_feed) = atom_syndication::Feed::read_from(content) {
            return Ok(self.map_atom_entries(&atom_feed, source, limit));
        }

        Err(FeedError::ParseError(format!(
            "Failed to parse feed: {}",
            source.url
        )))
    }

    /// Map RSS channel items into Articles
    fn map_rss_items(
        &self,
        channel: &rss::Channel,
        source: &SourceConfig,
        limit: usize,
    ) -> Vec<Article> {
        let tz = self.reporting_tz();

        channel
            .items()
            .iter()
            .take(limit)
            .filter_map(|item| {
                let title = strip_html(item.title()?);
                let link = item.link()?.trim().to_string();
                if title.is_empty() || link.is_empty() {
                    return None;
                }

                // published -> dc:date -> ingestion time, in the reporting tz
                let published_at = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .or_else(|| dublin_core_date(item))
                    .map(|d| d.with_timezone(&tz))
                    .unwrap_or_else(|| Utc::now().with_timezone(&tz));

                let summary = truncate_chars(
                    &strip_html(item.description().unwrap_or_default()),
                    SUMMARY_MAX_CHARS,
                );

                if !is_relevant(&title, &summary, source) {
                    return None;
                }

                Some(Article {
                    id: article_id(&link),
                    title,
                    link,
                    source: source.id.clone(),
                    published_at,
                    summary,
                })
            })
            .collect()
    }

    /// Map Atom feed entries into Articles
    fn map_atom_entries(
        &self,
        atom_feed: &atom_syndication::Feed,
        source: &SourceConfig,
        limit: usize,
    ) -> Vec<Article> {
        let tz = self.reporting_tz();

        atom_feed
            .entries()
            .iter()
            .take(limit)
            .filter_map(|entry| {
                let title = strip_html(entry.title().as_str());
                let link = entry
                    .links()
                    .first()
                    .map(|l| l.href().trim().to_string())
                    .unwrap_or_default();
                if title.is_empty() || link.is_empty() {
                    return None;
                }

                // published -> updated (mandatory in Atom), in the reporting tz
                let published_at = entry
                    .published()
                    .or_else(|| Some(entry.updated()))
                    .map(|d| d.with_timezone(&tz))
                    .unwrap_or_else(|| Utc::now().with_timezone(&tz));

                let summary_html = entry.summary().map(|s| s.as_str()).unwrap_or_default();
                let content_html = entry.content().and_then(|c| c.value()).unwrap_or_default();
                let raw_summary = if !summary_html.is_empty() {
                    summary_html
                } else {
                    content_html
                };
                let summary = truncate_chars(&strip_html(raw_summary), SUMMARY_MAX_CHARS);

                if !is_relevant(&title, &summary, source) {
                    return None;
                }

                Some(Article {
                    id: article_id(&link),
                    title,
                    link,
                    source: source.id.clone(),
                    published_at,
                    summary,
                })
            })
            .collect()
    }

    fn reporting_tz(&self) -> FixedOffset {
        FixedOffset::east_opt(self.config.reporting_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable article id from the canonical link
fn article_id(link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(link.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Resolve an RSS item's Dublin Core date, if present
fn dublin_core_date(item: &rss::Item) -> Option<DateTime<FixedOffset>> {
    item.dublin_core_ext()
        .and_then(|dc| dc.dates().first())
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use econews_core::Category;

    const RSS_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
<title>Test Feed</title>
<link>https://example.com</link>
<description>fixture</description>
<item>
  <title>Stocks rally on Fed pause</title>
  <link>https://example.com/a1</link>
  <description>&lt;p&gt;Markets up across the board.&lt;/p&gt;</description>
  <pubDate>Mon, 13 Jan 2025 09:30:00 +0000</pubDate>
</item>
<item>
  <title>Local team wins derby</title>
  <link>https://example.com/a2</link>
  <description>A great match.</description>
  <pubDate>Mon, 13 Jan 2025 08:00:00 +0000</pubDate>
</item>
<item>
  <title>Earnings season preview</title>
  <link>https://example.com/a3</link>
  <description>What analysts expect.</description>
</item>
<item>
  <title>No link on this one</title>
  <description>Unreachable story about markets.</description>
</item>
</channel>
</rss>"#;

    const ATOM_DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Fixture</title>
  <id>urn:uuid:feed-1</id>
  <updated>2025-01-13T10:00:00Z</updated>
  <entry>
    <title>Bitcoin climbs past resistance</title>
    <id>urn:uuid:entry-1</id>
    <link href="https://example.com/btc"/>
    <updated>2025-01-13T10:00:00Z</updated>
    <summary>Crypto markets extend gains.</summary>
  </entry>
</feed>"#;

    fn trusted_source() -> SourceConfig {
        SourceConfig::new(
            "cafef_stocks",
            "https://example.com/rss",
            Category::Domestic,
            "CafeF CK",
            "📊",
        )
        .trusted()
    }

    fn untrusted_source() -> SourceConfig {
        SourceConfig::new(
            "cnbc",
            "https://example.com/rss",
            Category::International,
            "CNBC",
            "📺",
        )
    }

    #[test]
    fn test_rss_mapping_trusted() {
        let client = FeedClient::new();
        let articles = client
            .parse_document(RSS_DOC.as_bytes(), &trusted_source(), 15)
            .unwrap();

        // The no-link item is dropped; the trusted source keeps the rest
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].title, "Stocks rally on Fed pause");
        assert_eq!(articles[0].link, "https://example.com/a1");
        assert_eq!(articles[0].source, "cafef_stocks");
        assert_eq!(articles[0].summary, "Markets up across the board.");
        // 09:30 UTC in the +07:00 reporting timezone
        assert_eq!(articles[0].published_at.offset().local_minus_utc(), 7 * 3600);
        assert_eq!(articles[0].published_at.hour(), 16);
    }

    #[test]
    fn test_rss_mapping_untrusted_filters() {
        let client = FeedClient::new();
        let articles = client
            .parse_document(RSS_DOC.as_bytes(), &untrusted_source(), 15)
            .unwrap();

        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert!(titles.contains(&"Stocks rally on Fed pause"));
        assert!(!titles.contains(&"Local team wins derby"));
    }

    #[test]
    fn test_rss_limit_applies_to_raw_entries() {
        let client = FeedClient::new();
        let articles = client
            .parse_document(RSS_DOC.as_bytes(), &trusted_source(), 1)
            .unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Stocks rally on Fed pause");
    }

    #[test]
    fn test_missing_date_defaults_to_now() {
        let client = FeedClient::new();
        let articles = client
            .parse_document(RSS_DOC.as_bytes(), &trusted_source(), 15)
            .unwrap();

        let undated = articles
            .iter()
            .find(|a| a.title == "Earnings season preview")
            .unwrap();
        assert_eq!(undated.published_at.offset().local_minus_utc(), 7 * 3600);
        let age = Utc::now().signed_duration_since(undated.published_at);
        assert!(age.num_seconds() >= 0 && age.num_minutes() < 5);
    }

    #[test]
    fn test_atom_mapping() {
        let client = FeedClient::new();
        let articles = client
            .parse_document(ATOM_DOC.as_bytes(), &untrusted_source(), 15)
            .unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Bitcoin climbs past resistance");
        assert_eq!(articles[0].link, "https://example.com/btc");
        assert_eq!(articles[0].summary, "Crypto markets extend gains.");
        assert_eq!(articles[0].published_at.hour(), 17);
    }

    #[test]
    fn test_unparseable_document() {
        let client = FeedClient::new();
        let result = client.parse_document(b"not a feed at all", &trusted_source(), 15);
        assert!(matches!(result, Err(FeedError::ParseError(_))));
    }

    #[test]
    fn test_article_id_is_stable() {
        let a = article_id("https://example.com/a1");
        let b = article_id("https://example.com/a1");
        let c = article_id("https://example.com/a2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }
}
