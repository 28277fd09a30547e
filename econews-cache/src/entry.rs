//! Cache entry metadata

use std::time::{Duration, Instant};

/// Eviction precedence class. `Critical` is never evicted; `Disposable`
/// goes first. Ordering follows declaration order, so a "less important"
/// tier compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CachePriority {
    /// Never evicted (system data)
    Critical,
    /// High priority (user-facing result sets)
    High,
    /// Default priority (news data)
    Medium,
    /// Low priority (temporary data)
    Low,
    /// First to evict (debug data)
    Disposable,
}

/// One stored value plus its bookkeeping.
///
/// `size_bytes` always reflects the stored representation, compressed or
/// not; the cache's running memory counter is the sum of these.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Vec<u8>,
    pub created_at: Instant,
    pub last_accessed: Instant,
    pub access_count: u64,
    pub priority: CachePriority,
    pub ttl: Option<Duration>,
    pub size_bytes: usize,
    pub compressed: bool,
    pub tags: Vec<String>,
}

impl CacheEntry {
    pub fn new(
        value: Vec<u8>,
        priority: CachePriority,
        ttl: Option<Duration>,
        compressed: bool,
        tags: Vec<String>,
    ) -> Self {
        let now = Instant::now();
        let size_bytes = value.len();
        Self {
            value,
            created_at: now,
            last_accessed: now,
            access_count: 0,
            priority,
            ttl,
            size_bytes,
            compressed,
            tags,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.created_at.elapsed() > ttl,
            None => false,
        }
    }

    /// Record an access for LRU ordering
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(CachePriority::Critical < CachePriority::High);
        assert!(CachePriority::High < CachePriority::Medium);
        assert!(CachePriority::Medium < CachePriority::Low);
        assert!(CachePriority::Low < CachePriority::Disposable);
    }

    #[test]
    fn test_expiry() {
        let mut entry = CacheEntry::new(
            vec![1, 2, 3],
            CachePriority::Medium,
            Some(Duration::from_millis(20)),
            false,
            vec![],
        );
        assert!(!entry.is_expired());
        std::thread::sleep(Duration::from_millis(40));
        assert!(entry.is_expired());

        entry.ttl = None;
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_touch_updates_access() {
        let mut entry =
            CacheEntry::new(vec![0; 8], CachePriority::Low, None, false, vec![]);
        let before = entry.last_accessed;
        std::thread::sleep(Duration::from_millis(5));
        entry.touch();
        assert!(entry.last_accessed > before);
        assert_eq!(entry.access_count, 1);
    }
}
