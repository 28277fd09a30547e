//! Memory-aware caching for constrained deployments
//!
//! A bounded key/value store combining LRU ordering, per-entry TTLs,
//! priority-tiered eviction and opportunistic gzip compression. Every
//! cross-request table in the portal (dedup registry, collected batches,
//! extracted article bodies) rides on [`MemoryCache`] so total memory
//! stays bounded no matter how feeds behave.

pub mod entry;
pub mod memory_cache;
pub mod stats;

pub use entry::{CacheEntry, CachePriority};
pub use memory_cache::{CacheConfig, MemoryCache};
pub use stats::{CacheStats, OptimizeReport};
