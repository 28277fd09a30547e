//! Service layer for the Econews Terminal
//!
//! Ties the lower crates together: the collector fans fetches out across
//! sources under a wall-clock budget, the dedup registry suppresses
//! repeats across runs, and the portal facade serves paginated news and
//! extracted article bodies out of the shared cache.

pub mod dedup;
pub mod ingest;
pub mod portal;

pub use dedup::DedupRegistry;
pub use ingest::{IngestConfig, NewsCollector};
pub use portal::{NewsPortal, PortalCacheStats, PortalConfig};
