//! Error types for feed ingestion

use thiserror::Error;

/// Errors that can occur while fetching or parsing a feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Feed endpoint returned a non-success status
    #[error("Feed error (status {status}): {url}")]
    FeedStatus {
        /// HTTP status code
        status: u16,
        /// Feed URL
        url: String,
    },

    /// Document was neither valid RSS nor valid Atom
    #[error("Parse error: {0}")]
    ParseError(String),
}
