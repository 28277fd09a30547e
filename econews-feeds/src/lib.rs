//! Feed ingestion for the econews terminal
//!
//! This crate owns the leaf stages of the pipeline:
//! - Fetching one source's feed document with a hard timeout
//! - Parsing RSS/Atom bytes into bounded, normalized article lists
//! - Title normalization for duplicate detection
//! - Keyword relevance filtering for untrusted sources

pub mod client;
pub mod error;
pub mod normalize;
pub mod relevance;

pub use client::{FeedClient, FeedClientConfig};
pub use error::FeedError;
pub use normalize::{normalize, strip_html, truncate_chars};
pub use relevance::is_relevant;
