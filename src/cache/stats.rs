//! Cache Statistics Module
//!
//! Tracks cache performance counters and exposes read-only snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Counters ==
/// Mutable per-store counters, updated inline by the store under its lock.
///
/// Explicit removals (`delete`, invalidation), capacity/memory evictions and
/// TTL expirations are counted separately; conflating them hides whether a
/// store is undersized or just churning.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of insertions (including overwrites)
    pub sets: u64,
    /// Number of explicit removals (delete and invalidation)
    pub deletes: u64,
    /// Number of entries evicted by capacity or memory pressure
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheCounters {
    /// Creates a new counter set with everything at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the set counter.
    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    /// Increments the delete counter.
    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }
}

// == Cache Stats ==
/// Read-only snapshot of a store's counters and derived metrics, taken under
/// the store lock. Safe to hold, serialize or ship to a metrics sink after
/// the lock is released.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Current number of live entries
    pub entries: usize,
    /// Summed estimated size of live entries, in bytes
    pub memory_bytes: u64,
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// hits / (hits + misses), 0.0 before any request
    pub hit_rate: f64,
    /// Insertion time of the oldest live entry, None when empty
    pub oldest_inserted_at: Option<DateTime<Utc>>,
    /// Insertion time of the newest live entry, None when empty
    pub newest_inserted_at: Option<DateTime<Utc>>,
}

/// Converts a Unix-millisecond timestamp into a chrono UTC timestamp.
pub(crate) fn ms_to_datetime(ms: u64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_new() {
        let counters = CacheCounters::new();
        assert_eq!(counters.hits, 0);
        assert_eq!(counters.misses, 0);
        assert_eq!(counters.sets, 0);
        assert_eq!(counters.deletes, 0);
        assert_eq!(counters.evictions, 0);
        assert_eq!(counters.expirations, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let counters = CacheCounters::new();
        assert_eq!(counters.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut counters = CacheCounters::new();
        counters.record_hit();
        counters.record_hit();
        assert_eq!(counters.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut counters = CacheCounters::new();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.hit_rate(), 0.5);
    }

    #[test]
    fn test_eviction_and_delete_are_distinct() {
        let mut counters = CacheCounters::new();
        counters.record_eviction();
        counters.record_delete();
        counters.record_delete();
        assert_eq!(counters.evictions, 1);
        assert_eq!(counters.deletes, 2);
    }

    #[test]
    fn test_ms_to_datetime_roundtrip() {
        let dt = ms_to_datetime(1_700_000_000_000).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }
}
