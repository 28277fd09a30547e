//! Cache statistics snapshots

use serde::Serialize;

/// Point-in-time view of a cache's counters and occupancy
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub memory_bytes: usize,
    pub max_memory_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub compressions: u64,
    pub pressure_events: u64,
    /// Hits as a percentage of all lookups
    pub hit_rate: f64,
    pub uptime_seconds: u64,
    pub tags: usize,
}

/// Outcome of one `optimize_memory` pass
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeReport {
    pub initial_bytes: usize,
    pub target_bytes: usize,
    pub expired_cleared: usize,
    pub priority_evicted: usize,
    pub compressed: usize,
    pub final_bytes: usize,
    pub freed_bytes: usize,
}
