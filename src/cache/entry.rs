//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support and
//! per-entry access metadata used by the eviction policy.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single cache entry: the stored value plus the metadata the store needs
/// for expiration, LRU eviction and memory accounting.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value, owned exclusively by the entry
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// TTL in milliseconds, fixed at insertion (no sliding expiration)
    pub ttl_ms: u64,
    /// Number of successful reads
    pub hit_count: u64,
    /// Timestamp of the most recent successful read (Unix milliseconds).
    /// Starts equal to `inserted_at`, so it never runs behind it.
    pub last_accessed_at: u64,
    /// Approximate size of the value in bytes, computed at insertion
    pub estimated_size: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry. `last_accessed_at` starts at the insertion time;
    /// overwriting a key goes through here too, so all metadata resets.
    pub fn new(value: V, ttl: Duration, estimated_size: u64) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            inserted_at: now,
            ttl_ms: ttl.as_millis() as u64,
            hit_count: 0,
            last_accessed_at: now,
            estimated_size,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry's TTL has elapsed.
    ///
    /// An entry is expired once strictly more than `ttl` has passed since
    /// insertion; at exactly the boundary it is still served. Both the lazy
    /// path (`get`) and the eager path (janitor sweep) call this predicate,
    /// so the two can never disagree.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms().saturating_sub(self.inserted_at) > self.ttl_ms
    }

    // == Touch ==
    /// Records a successful read: bumps the hit count and refreshes the LRU
    /// recency signal. Does not extend the TTL.
    pub fn touch(&mut self) {
        self.hit_count += 1;
        self.last_accessed_at = current_timestamp_ms();
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds (0 once expired).
    pub fn ttl_remaining_ms(&self) -> u64 {
        let deadline = self.inserted_at + self.ttl_ms;
        deadline.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
