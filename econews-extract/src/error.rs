//! Error types for content extraction

use thiserror::Error;

/// Failures raised by individual extraction strategies.
///
/// The chain driver matches on these to decide whether to try the next
/// strategy; callers outside the crate only ever see the finished text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Article page answered with a non-success status
    #[error("Document fetch returned HTTP {status} for {url}")]
    FetchStatus { status: u16, url: String },

    /// Assist API returned an error status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Strategy ran but found nothing usable
    #[error("No content found: {0}")]
    NoContent(String),

    /// Strategy produced text below the acceptance threshold
    #[error("Content too short: {len} chars (minimum {min})")]
    TooShort { len: usize, min: usize },

    /// Assisted extraction requested without a configured client
    #[error("Assist client not configured")]
    AssistOffline,

    /// Model answered with an excuse instead of article text
    #[error("Assist refused to extract {0}")]
    AssistRefused(String),
}
