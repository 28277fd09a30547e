//! Memory-aware LRU cache with TTL, priority eviction and compression

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::entry::{CacheEntry, CachePriority};
use crate::stats::{CacheStats, OptimizeReport};

/// Compressed form is kept only below this fraction of the raw size.
const COMPRESSION_KEEP_RATIO: f64 = 0.8;

/// Tier scan order for priority eviction, most evictable first.
/// `Critical` is deliberately absent.
const EVICTION_ORDER: &[CachePriority] = &[
    CachePriority::Disposable,
    CachePriority::Low,
    CachePriority::Medium,
    CachePriority::High,
];

/// Configuration for [`MemoryCache`]
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entry-count ceiling
    pub max_entries: usize,
    /// Byte ceiling over all stored (possibly compressed) values
    pub max_memory_bytes: usize,
    /// TTL applied when `set` passes none
    pub default_ttl: Option<Duration>,
    /// Values at or below this size are never compressed
    pub compression_threshold: usize,
    /// Background expiry sweep interval
    pub sweep_interval: Duration,
    /// Occupancy ratio that triggers a mild optimization pass
    pub warning_ratio: f64,
    /// Occupancy ratio that triggers an aggressive pass and counts as a
    /// memory-pressure event
    pub critical_ratio: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            max_memory_bytes: 50 * 1024 * 1024,
            default_ttl: None,
            compression_threshold: 1024,
            sweep_interval: Duration::from_secs(60),
            warning_ratio: 0.8,
            critical_ratio: 0.95,
        }
    }
}

/// Bounded key/value store for constrained deployments.
///
/// All mutations go through one mutex so the running byte counter always
/// equals the sum of live entry sizes. Values are serialized with
/// serde_json and gzip-compressed when that saves at least 20%.
pub struct MemoryCache {
    inner: Mutex<CacheInner>,
    config: CacheConfig,
    started: AtomicBool,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    tags: HashMap<String, HashSet<String>>,
    memory_bytes: usize,
    stats: StatCounters,
    started_at: Instant,
}

#[derive(Debug, Default)]
struct StatCounters {
    hits: u64,
    misses: u64,
    evictions: u64,
    compressions: u64,
    pressure_events: u64,
}

impl MemoryCache {
    pub fn new(config: CacheConfig) -> Self {
        info!(
            "Memory-aware cache initialized: {} entries, {} bytes",
            config.max_entries, config.max_memory_bytes
        );
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                tags: HashMap::new(),
                memory_bytes: 0,
                stats: StatCounters::default(),
                started_at: Instant::now(),
            }),
            config,
            started: AtomicBool::new(false),
        }
    }

    /// Store a value. Returns `false` and stores nothing when the value
    /// cannot be encoded or capacity cannot be freed without touching
    /// critical entries; callers treat that as "not cached", never an error.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
        priority: CachePriority,
        tags: &[&str],
    ) -> bool {
        let raw = match serde_json::to_vec(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache encode failed for {}: {}", key, e);
                return false;
            }
        };

        let (stored, compressed) = prepare_value(raw, self.config.compression_threshold);
        let size_bytes = stored.len();

        let mut inner = self.inner.lock();
        if compressed {
            inner.stats.compressions += 1;
        }

        if !inner.ensure_space(&self.config, size_bytes, priority) {
            warn!("Cannot cache {}: insufficient space", key);
            return false;
        }

        // Replacing counts the old entry as evicted
        inner.remove_entry(key);

        let entry = CacheEntry::new(
            stored,
            priority,
            ttl.or(self.config.default_ttl),
            compressed,
            tags.iter().map(|t| t.to_string()).collect(),
        );
        inner.memory_bytes += size_bytes;
        for tag in &entry.tags {
            inner
                .tags
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        inner.entries.insert(key.to_string(), entry);

        inner.check_pressure(&self.config);
        inner.assert_accounting();
        true
    }

    /// Fetch and decode a value. An expired entry is a miss and is evicted
    /// on the spot, independent of the background sweep.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut inner = self.inner.lock();

        let state = inner.entries.get(key).map(|entry| entry.is_expired());
        let expired = match state {
            None => {
                inner.stats.misses += 1;
                return None;
            }
            Some(expired) => expired,
        };
        if expired {
            inner.remove_entry(key);
            inner.stats.misses += 1;
            return None;
        }

        let touched = inner.entries.get_mut(key).map(|entry| {
            entry.touch();
            (entry.value.clone(), entry.compressed)
        });
        let (raw, compressed) = match touched {
            Some(pair) => pair,
            None => {
                inner.stats.misses += 1;
                return None;
            }
        };
        inner.stats.hits += 1;
        drop(inner);

        let bytes = if compressed {
            match gunzip(&raw) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Cache decompress failed for {}: {}", key, e);
                    return None;
                }
            }
        } else {
            raw
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Cache decode failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Expiry-aware membership test; does not touch LRU order or hit/miss
    /// counters.
    pub fn contains(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let state = inner.entries.get(key).map(|entry| entry.is_expired());
        match state {
            None => false,
            Some(true) => {
                inner.remove_entry(key);
                false
            }
            Some(false) => true,
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.remove_entry(key).is_some();
        inner.assert_accounting();
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.tags.clear();
        inner.memory_bytes = 0;
        info!("Cache cleared");
    }

    /// Drop every expired entry, returning how many were removed
    pub fn clear_expired(&self) -> usize {
        let mut inner = self.inner.lock();
        let cleared = inner.clear_expired();
        inner.assert_accounting();
        cleared
    }

    /// Drop every entry carrying `tag`
    pub fn clear_by_tag(&self, tag: &str) -> usize {
        let mut inner = self.inner.lock();
        let keys: Vec<String> = match inner.tags.get(tag) {
            Some(set) => set.iter().cloned().collect(),
            None => return 0,
        };
        for key in &keys {
            inner.remove_entry(key);
        }
        inner.assert_accounting();
        keys.len()
    }

    /// Staged reclamation: expiry sweep, then Disposable/Low eviction, then
    /// opportunistic compression, then LRU eviction, stopping once
    /// `target_bytes` have been freed.
    pub fn optimize_memory(&self, target_bytes: usize) -> OptimizeReport {
        let mut inner = self.inner.lock();
        let report = inner.optimize(&self.config, target_bytes);
        inner.assert_accounting();
        info!("Memory optimization freed {} bytes", report.freed_bytes);
        report
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let lookups = inner.stats.hits + inner.stats.misses;
        CacheStats {
            entries: inner.entries.len(),
            max_entries: self.config.max_entries,
            memory_bytes: inner.memory_bytes,
            max_memory_bytes: self.config.max_memory_bytes,
            hits: inner.stats.hits,
            misses: inner.stats.misses,
            evictions: inner.stats.evictions,
            compressions: inner.stats.compressions,
            pressure_events: inner.stats.pressure_events,
            hit_rate: if lookups > 0 {
                inner.stats.hits as f64 / lookups as f64 * 100.0
            } else {
                0.0
            },
            uptime_seconds: inner.started_at.elapsed().as_secs(),
            tags: inner.tags.len(),
        }
    }

    /// Spawn the background expiry sweeper. Idempotent; the loop takes the
    /// same mutex as foreground operations.
    pub fn start(self: Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let sweep_interval = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let cleared = {
                    let mut inner = self.inner.lock();
                    let cleared = inner.clear_expired();
                    inner.check_pressure(&self.config);
                    cleared
                };
                if cleared > 0 {
                    debug!("Background sweep cleared {} expired entries", cleared);
                }
            }
        });
    }

    #[cfg(test)]
    fn audit(&self) -> (usize, usize) {
        let inner = self.inner.lock();
        (
            inner.memory_bytes,
            inner.entries.values().map(|e| e.size_bytes).sum(),
        )
    }
}

impl CacheInner {
    /// Make room for a new entry of `required` bytes at `priority`.
    ///
    /// Entry-count ceiling evicts one LRU non-critical entry; the byte
    /// ceiling clears expired entries, then evicts strictly less important
    /// tiers, then falls back to usage-based eviction. Critical entries are
    /// never touched. Returns false when the entry still would not fit.
    fn ensure_space(
        &mut self,
        config: &CacheConfig,
        required: usize,
        priority: CachePriority,
    ) -> bool {
        if self.entries.len() >= config.max_entries && !self.evict_lru(1) {
            return false;
        }

        if self.memory_bytes + required > config.max_memory_bytes {
            // Aim past the bare minimum so back-to-back inserts don't each
            // pay for eviction
            let target = required + config.max_memory_bytes / 10;

            self.clear_expired();
            if self.memory_bytes + required <= config.max_memory_bytes {
                return true;
            }

            let tiers: Vec<CachePriority> = EVICTION_ORDER
                .iter()
                .copied()
                .filter(|tier| *tier > priority)
                .collect();
            self.evict_tiers(&tiers, Some(target));
            if self.memory_bytes + required <= config.max_memory_bytes {
                return true;
            }

            self.evict_memory_based(target);
            return self.memory_bytes + required <= config.max_memory_bytes;
        }

        true
    }

    /// Evict up to `count` least-recently-used non-critical entries
    fn evict_lru(&mut self, count: usize) -> bool {
        let mut evicted = 0;
        while evicted < count {
            match self.lru_victim() {
                Some(key) => {
                    self.remove_entry(&key);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted > 0
    }

    fn lru_victim(&self) -> Option<String> {
        self.entries
            .iter()
            .filter(|(_, e)| e.priority != CachePriority::Critical)
            .min_by_key(|(_, e)| e.last_accessed)
            .map(|(k, _)| k.clone())
    }

    /// Evict entries tier by tier in the given order, oldest access first
    /// within a tier, stopping once `target` bytes are freed
    fn evict_tiers(&mut self, tiers: &[CachePriority], target: Option<usize>) -> usize {
        let mut evicted = 0;
        let mut freed = 0usize;

        for &tier in tiers {
            loop {
                if let Some(target) = target {
                    if freed >= target {
                        return evicted;
                    }
                }
                let victim = self
                    .entries
                    .iter()
                    .filter(|(_, e)| e.priority == tier)
                    .min_by_key(|(_, e)| e.last_accessed)
                    .map(|(k, _)| k.clone());
                match victim {
                    Some(key) => {
                        if let Some(entry) = self.remove_entry(&key) {
                            freed += entry.size_bytes;
                            evicted += 1;
                        }
                    }
                    None => break,
                }
            }
        }
        evicted
    }

    /// Last-resort eviction across all non-critical entries, least valuable
    /// first: more disposable tier, then longer idle, then larger size
    fn evict_memory_based(&mut self, target: usize) -> bool {
        struct Victim {
            key: String,
            size_bytes: usize,
            priority: CachePriority,
            last_accessed: Instant,
        }

        let mut victims: Vec<Victim> = self
            .entries
            .iter()
            .filter(|(_, e)| e.priority != CachePriority::Critical)
            .map(|(k, e)| Victim {
                key: k.clone(),
                size_bytes: e.size_bytes,
                priority: e.priority,
                last_accessed: e.last_accessed,
            })
            .collect();

        victims.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.last_accessed.cmp(&b.last_accessed))
                .then_with(|| b.size_bytes.cmp(&a.size_bytes))
        });

        let mut freed = 0usize;
        for victim in victims {
            if freed >= target {
                break;
            }
            if self.remove_entry(&victim.key).is_some() {
                freed += victim.size_bytes;
            }
        }
        freed >= target
    }

    fn clear_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove_entry(key);
        }
        if !expired.is_empty() {
            debug!("Cleared {} expired entries", expired.len());
        }
        expired.len()
    }

    /// Recompress large uncompressed non-critical entries in place,
    /// keeping the result only when it saves at least 20%
    fn compress_large(&mut self, config: &CacheConfig) -> usize {
        let mut compressed_count = 0u64;
        let mut reclaimed = 0usize;

        for entry in self.entries.values_mut() {
            if entry.compressed
                || entry.priority == CachePriority::Critical
                || entry.size_bytes <= config.compression_threshold
            {
                continue;
            }
            if let Ok(packed) = gzip(&entry.value) {
                if (packed.len() as f64) < entry.size_bytes as f64 * COMPRESSION_KEEP_RATIO {
                    reclaimed += entry.size_bytes - packed.len();
                    entry.size_bytes = packed.len();
                    entry.value = packed;
                    entry.compressed = true;
                    compressed_count += 1;
                }
            }
        }

        self.memory_bytes -= reclaimed;
        self.stats.compressions += compressed_count;
        compressed_count as usize
    }

    fn optimize(&mut self, config: &CacheConfig, target_bytes: usize) -> OptimizeReport {
        let initial = self.memory_bytes;
        let floor = initial.saturating_sub(target_bytes);

        let expired_cleared = self.clear_expired();

        let mut priority_evicted = 0;
        if self.memory_bytes > floor {
            priority_evicted =
                self.evict_tiers(&[CachePriority::Disposable, CachePriority::Low], None);
        }

        let mut compressed = 0;
        if self.memory_bytes > floor {
            compressed = self.compress_large(config);
        }

        while self.memory_bytes > floor {
            match self.lru_victim() {
                Some(key) => {
                    self.remove_entry(&key);
                }
                None => break,
            }
        }

        OptimizeReport {
            initial_bytes: initial,
            target_bytes,
            expired_cleared,
            priority_evicted,
            compressed,
            final_bytes: self.memory_bytes,
            freed_bytes: initial.saturating_sub(self.memory_bytes),
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.memory_bytes -= entry.size_bytes;
        for tag in &entry.tags {
            if let Some(keys) = self.tags.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tags.remove(tag);
                }
            }
        }
        self.stats.evictions += 1;
        Some(entry)
    }

    fn check_pressure(&mut self, config: &CacheConfig) {
        let ratio = self.memory_bytes as f64 / config.max_memory_bytes as f64;

        if ratio > config.critical_ratio {
            self.stats.pressure_events += 1;
            warn!("Critical cache memory pressure: {:.1}%", ratio * 100.0);
            self.optimize(config, config.max_memory_bytes / 5);
        } else if ratio > config.warning_ratio {
            debug!("Cache memory warning: {:.1}%", ratio * 100.0);
            self.optimize(config, config.max_memory_bytes / 10);
        }
    }

    fn assert_accounting(&self) {
        debug_assert_eq!(
            self.memory_bytes,
            self.entries.values().map(|e| e.size_bytes).sum::<usize>()
        );
    }
}

/// Compress the serialized value when it is large enough and compression
/// actually pays off
fn prepare_value(raw: Vec<u8>, threshold: usize) -> (Vec<u8>, bool) {
    if raw.len() > threshold {
        if let Ok(packed) = gzip(&raw) {
            if (packed.len() as f64) < raw.len() as f64 * COMPRESSION_KEEP_RATIO {
                return (packed, true);
            }
        }
    }
    (raw, false)
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
