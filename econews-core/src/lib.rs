//! Core types for the Econews Terminal
//!
//! This crate defines the shared data structures used across the portal,
//! including articles, display projections, and the source registry.

pub mod article;
pub mod error;
pub mod source;

pub use article::{Article, ArticleView, ExtractedContent, NewsPage, ShadowRecord};
pub use error::{PortalError, PortalResult};
pub use source::{default_sources, Category, SourceConfig, SourceRegistry};
