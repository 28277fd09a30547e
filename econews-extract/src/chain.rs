//! Ordered extraction chain with a deterministic fallback.

use std::time::Duration;

use econews_core::SourceConfig;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::assist::{self, AssistClient};
use crate::error::ExtractError;
use crate::readability::ScoreConfig;
use crate::{density, dom, format, readability};

const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Extraction chain configuration
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum accepted length for structurally extracted text
    pub min_content_len: usize,
    /// Minimum length of a standalone paragraph worth keeping
    pub min_paragraph_len: usize,
    /// Timeout for fetching the article document
    pub fetch_timeout: Duration,
    /// Minimum accepted length for assisted extraction output
    pub assist_min_len: usize,
    /// Timeout for the assist API call
    pub assist_timeout: Duration,
    /// Offset of the reporting timezone, in hours east of UTC
    pub reporting_offset_hours: i32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_content_len: 200,
            min_paragraph_len: 40,
            fetch_timeout: Duration::from_secs(15),
            assist_min_len: 400,
            assist_timeout: Duration::from_secs(35),
            reporting_offset_hours: 7,
        }
    }
}

/// Runs the extraction strategies in order until one produces enough text.
///
/// Order: readability scoring, then the selector list, then block density,
/// then the assist model for assisted sources, then the placeholder.
pub struct ContentExtractor {
    client: Client,
    assist: Option<AssistClient>,
    config: ExtractConfig,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::with_config(ExtractConfig::default(), None)
    }

    /// Build an extractor; `assist_key` enables the assisted strategy.
    pub fn with_config(config: ExtractConfig, assist_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        let assist = assist_key
            .filter(|key| !key.is_empty())
            .map(|key| AssistClient::new(key, config.assist_timeout));
        Self {
            client,
            assist,
            config,
        }
    }

    pub fn assist_configured(&self) -> bool {
        self.assist.as_ref().map_or(false, AssistClient::is_configured)
    }

    /// Extract the article body behind `url`. Never fails; the worst case
    /// is the terminal-styled placeholder naming the failure.
    #[instrument(skip(self, source), fields(source = %source.id))]
    pub async fn extract(&self, url: &str, source: &SourceConfig) -> String {
        match self.run_chain(url, source).await {
            Ok(content) => content,
            Err(err) => {
                warn!("Extraction fell back to placeholder for {}: {}", url, err);
                format::fallback_content(
                    url,
                    source,
                    &err.to_string(),
                    self.config.reporting_offset_hours,
                )
            }
        }
    }

    async fn run_chain(&self, url: &str, source: &SourceConfig) -> Result<String, ExtractError> {
        let structural = match self.fetch_document(url).await {
            Ok(body) => {
                let mut outcome = self.gate(
                    "readability",
                    url,
                    readability::extract(&body, &ScoreConfig::default()),
                );
                if outcome.is_err() {
                    outcome = self.gate(
                        "dom",
                        url,
                        dom::extract(&body, self.config.min_content_len, self.config.min_paragraph_len),
                    );
                }
                if outcome.is_err() {
                    outcome = self.gate(
                        "density",
                        url,
                        density::extract(&body, self.config.min_paragraph_len),
                    );
                }
                outcome
            }
            Err(err) => {
                warn!("Document fetch failed for {}: {}", url, err);
                Err(err)
            }
        };

        let structural_err = match structural {
            Ok(text) => return Ok(self.present(&text, source)),
            Err(err) => err,
        };

        if source.assisted {
            return match self.assisted(url).await {
                Ok(text) => {
                    let formatted = self.present(&text, source);
                    Ok(format!(
                        "[🤖 AI_PARSER - Source: {}]\n\n{}",
                        source.display_name, formatted
                    ))
                }
                Err(err) => {
                    debug!("Assisted extraction failed for {}: {}", url, err);
                    Err(err)
                }
            };
        }

        Err(structural_err)
    }

    /// Accept strategy output only when it clears the length threshold.
    fn gate(
        &self,
        strategy: &str,
        url: &str,
        outcome: Result<String, ExtractError>,
    ) -> Result<String, ExtractError> {
        match outcome {
            Ok(text) => {
                let len = text.chars().count();
                if len >= self.config.min_content_len {
                    debug!("Strategy {} extracted {} chars from {}", strategy, len, url);
                    Ok(text)
                } else {
                    debug!("Strategy {} fell short for {}: {} chars", strategy, url, len);
                    Err(ExtractError::TooShort {
                        len,
                        min: self.config.min_content_len,
                    })
                }
            }
            Err(err) => {
                debug!("Strategy {} failed for {}: {}", strategy, url, err);
                Err(err)
            }
        }
    }

    async fn assisted(&self, url: &str) -> Result<String, ExtractError> {
        let Some(assist) = self.assist.as_ref() else {
            return Err(ExtractError::AssistOffline);
        };
        let text = assist.extract_article(url).await?;
        let len = text.chars().count();
        if len < self.config.assist_min_len {
            return Err(ExtractError::TooShort {
                len,
                min: self.config.assist_min_len,
            });
        }
        if assist::is_refusal(&text) {
            return Err(ExtractError::AssistRefused(url.to_string()));
        }
        Ok(text)
    }

    fn present(&self, text: &str, source: &SourceConfig) -> String {
        format::terminal_format(text, &source.display_name, self.config.reporting_offset_hours)
    }

    async fn fetch_document(&self, url: &str) -> Result<String, ExtractError> {
        debug!("Fetching article document: {}", url);
        let response = self
            .client
            .get(url)
            .header("User-Agent", FETCH_USER_AGENT)
            .send()
            .await
            .map_err(|e| ExtractError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExtractError::FetchStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ExtractError::RequestFailed(e.to_string()))
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use econews_core::Category;

    fn source() -> SourceConfig {
        SourceConfig::new(
            "cnbc",
            "https://example.com/feed",
            Category::International,
            "CNBC",
            "📺",
        )
        .assisted()
    }

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.min_content_len, 200);
        assert_eq!(config.assist_min_len, 400);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.assist_timeout, Duration::from_secs(35));
    }

    #[test]
    fn test_assist_only_with_nonempty_key() {
        let bare = ContentExtractor::new();
        assert!(!bare.assist_configured());
        let empty = ContentExtractor::with_config(ExtractConfig::default(), Some(String::new()));
        assert!(!empty.assist_configured());
        let keyed =
            ContentExtractor::with_config(ExtractConfig::default(), Some("key".to_string()));
        assert!(keyed.assist_configured());
    }

    #[test]
    fn test_gate_rejects_short_text() {
        let extractor = ContentExtractor::new();
        let err = extractor
            .gate("dom", "https://example.com/a", Ok("too short".to_string()))
            .unwrap_err();
        assert!(matches!(err, ExtractError::TooShort { len: 9, min: 200 }));

        let long = "a".repeat(200);
        assert!(extractor.gate("dom", "https://example.com/a", Ok(long)).is_ok());
    }

    #[tokio::test]
    async fn test_assisted_requires_client() {
        let extractor = ContentExtractor::new();
        let err = extractor.assisted("https://example.com/a").await.unwrap_err();
        assert!(matches!(err, ExtractError::AssistOffline));
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_placeholder() {
        // Port 9 on localhost is the discard service; nothing answers there.
        let mut config = ExtractConfig::default();
        config.fetch_timeout = Duration::from_millis(200);
        let extractor = ContentExtractor::with_config(config, None);
        let content = extractor
            .extract("http://127.0.0.1:9/story/offline-test", &source())
            .await;
        assert!(content.starts_with("**📈 INTERNATIONAL FINANCIAL DATA STREAM**"));
        assert!(content.contains("**ARTICLE_REF:** offline-test"));
    }

    #[tokio::test]
    async fn test_unassisted_placeholder_names_fetch_failure() {
        let mut config = ExtractConfig::default();
        config.fetch_timeout = Duration::from_millis(200);
        let extractor = ContentExtractor::with_config(config, None);
        let plain = SourceConfig::new(
            "cafef_stocks",
            "https://example.com/feed",
            Category::Domestic,
            "CafeF CK",
            "📊",
        );
        let content = extractor
            .extract("http://127.0.0.1:9/story/plain-test", &plain)
            .await;
        assert!(content.starts_with("**📰 DOMESTIC FINANCIAL DATA STREAM"));
        assert!(content.contains("**ARTICLE_ID:** plain-test"));
        assert!(content.contains("**ERROR_LOG:** Request failed"));
    }
}
