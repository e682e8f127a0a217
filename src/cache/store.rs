//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration and
//! capacity/memory-bounded LRU eviction.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::eviction;
use crate::cache::pattern::KeyMatcher;
use crate::cache::size::EstimateSize;
use crate::cache::stats::{ms_to_datetime, CacheCounters, CacheStats};
use crate::config::CacheConfig;

// == Cache Store ==
/// Bounded key/value store with TTL expiration and LRU eviction.
///
/// The store is a plain single-owner structure (`&mut self` everywhere);
/// concurrent access goes through [`crate::facade::Cache`], which wraps it in
/// a lock. Every operation here is bounded-time and never calls user code, so
/// it is safe to run under that lock.
///
/// Two bounds are enforced on every insert, before the new entry is
/// committed:
/// 1. capacity: at most `max_entries` live entries; one LRU victim is
///    evicted if the insert would exceed it;
/// 2. memory: at most `max_memory_bytes` of summed estimated sizes;
///    entries are evicted in ascending recency order until the new value
///    fits, possibly several per insert.
///
/// The key being written is never an eviction victim.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance counters
    counters: CacheCounters,
    /// Running sum of live entries' estimated sizes
    memory_bytes: u64,
    /// Store configuration (bounds, default TTL, stats flag)
    config: CacheConfig,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            counters: CacheCounters::new(),
            memory_bytes: 0,
            config,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit bumps the entry's hit count and recency. An expired-but-present
    /// entry is removed as a side effect and reported as a miss; expired
    /// data is never visible, whether or not the janitor has swept yet.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                if self.config.stats_enabled {
                    self.counters.record_miss();
                }
                return None;
            }
        };

        if expired {
            // Lazy deletion: the entry must be gone before we report absent.
            if let Some(stale) = self.entries.remove(key) {
                self.memory_bytes = self.memory_bytes.saturating_sub(stale.estimated_size);
                if self.config.stats_enabled {
                    self.counters.record_expiration();
                }
            }
            if self.config.stats_enabled {
                self.counters.record_miss();
            }
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();
        let value = entry.value.clone();
        if self.config.stats_enabled {
            self.counters.record_hit();
        }
        Some(value)
    }

    // == Peek ==
    /// Retrieves a value without recording a hit or a miss and without
    /// bumping recency. Expired entries are still removed and read as
    /// absent. Used where a second lookup must not distort request
    /// accounting, e.g. the façade's post-coalescing re-check.
    pub fn peek(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return None,
        };

        if expired {
            if let Some(stale) = self.entries.remove(key) {
                self.memory_bytes = self.memory_bytes.saturating_sub(stale.estimated_size);
                if self.config.stats_enabled {
                    self.counters.record_expiration();
                }
            }
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Inserts or overwrites an entry, estimating its size from the value's
    /// structure. `ttl` defaults to the store's configured default.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>)
    where
        V: EstimateSize,
    {
        let estimated_size = value.estimated_size();
        self.set_with_size(key, value, ttl, estimated_size);
    }

    /// Inserts or overwrites an entry with a caller-supplied size, bypassing
    /// estimation. Overwriting counts as a fresh insertion: hit count,
    /// insertion time and recency all reset.
    ///
    /// A value whose own size exceeds the store's memory budget can never be
    /// held without breaking the bound, so it is not cached at all.
    pub fn set_with_size(
        &mut self,
        key: impl Into<String>,
        value: V,
        ttl: Option<Duration>,
        estimated_size: u64,
    ) {
        let key = key.into();

        if estimated_size > self.config.max_memory_bytes {
            debug!(
                key = %key,
                size = estimated_size,
                budget = self.config.max_memory_bytes,
                "value exceeds the store's memory budget, not cached"
            );
            return;
        }

        // Take any previous copy out first so the key being written is never
        // an eviction victim and its old size leaves the ledger.
        if let Some(previous) = self.entries.remove(&key) {
            self.memory_bytes = self.memory_bytes.saturating_sub(previous.estimated_size);
        }

        // Capacity check: exactly one LRU victim.
        if self.entries.len() + 1 > self.config.max_entries {
            if let Some(victim) = eviction::lru_victim(&self.entries) {
                self.evict(&victim);
            }
        }

        // Memory check: free entries in ascending recency order until the
        // new value fits.
        if self.memory_bytes + estimated_size > self.config.max_memory_bytes {
            let needed = self.memory_bytes + estimated_size - self.config.max_memory_bytes;
            for victim in eviction::memory_victims(&self.entries, needed) {
                self.evict(&victim);
            }
        }

        let ttl = ttl.unwrap_or(self.config.default_ttl);
        self.entries
            .insert(key, CacheEntry::new(value, ttl, estimated_size));
        self.memory_bytes += estimated_size;
        if self.config.stats_enabled {
            self.counters.record_set();
        }
    }

    // == Delete ==
    /// Removes an entry by key. Idempotent; returns whether a live entry was
    /// actually removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.memory_bytes = self.memory_bytes.saturating_sub(entry.estimated_size);
                if self.config.stats_enabled {
                    self.counters.record_delete();
                }
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes all entries and resets every counter.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.memory_bytes = 0;
        self.counters = CacheCounters::new();
    }

    // == Cleanup Expired ==
    /// Eagerly removes every currently-expired entry; never touches live
    /// ones. Returns the number removed, so calling it twice with no
    /// intervening inserts returns 0 the second time.
    pub fn cleanup(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            if let Some(entry) = self.entries.remove(&key) {
                self.memory_bytes = self.memory_bytes.saturating_sub(entry.estimated_size);
                if self.config.stats_enabled {
                    self.counters.record_expiration();
                }
            }
        }
        count
    }

    // == Invalidate ==
    /// Removes every entry whose key the matcher accepts; non-matching
    /// entries and the hit/miss counters stay untouched. Removals count as
    /// deletes, not evictions. Returns the number removed.
    pub fn invalidate(&mut self, matcher: &KeyMatcher) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect();

        for key in &matching {
            if let Some(entry) = self.entries.remove(key) {
                self.memory_bytes = self.memory_bytes.saturating_sub(entry.estimated_size);
                if self.config.stats_enabled {
                    self.counters.record_delete();
                }
            }
        }
        matching.len()
    }

    // == Evict Low Value ==
    /// Sheds rarely-read entries until roughly `max_bytes` have been freed.
    /// Janitor hook for the cross-store memory safety net; removals count as
    /// evictions. Returns `(entries_removed, bytes_freed)`.
    pub fn evict_low_value(&mut self, max_bytes: u64) -> (usize, u64) {
        let victims = eviction::low_value_victims(&self.entries, max_bytes);
        let count = victims.len();
        let mut freed = 0u64;
        for key in victims {
            if let Some(entry) = self.entries.remove(&key) {
                freed += entry.estimated_size;
                self.memory_bytes = self.memory_bytes.saturating_sub(entry.estimated_size);
                if self.config.stats_enabled {
                    self.counters.record_eviction();
                }
            }
        }
        if count > 0 {
            debug!(count, freed, "shed low-value entries under memory pressure");
        }
        (count, freed)
    }

    // == Stats ==
    /// Returns a read-only snapshot of counters and derived metrics.
    pub fn stats(&self) -> CacheStats {
        let oldest = self.entries.values().map(|e| e.inserted_at).min();
        let newest = self.entries.values().map(|e| e.inserted_at).max();

        CacheStats {
            entries: self.entries.len(),
            memory_bytes: self.memory_bytes,
            hits: self.counters.hits,
            misses: self.counters.misses,
            sets: self.counters.sets,
            deletes: self.counters.deletes,
            evictions: self.counters.evictions,
            expirations: self.counters.expirations,
            hit_rate: self.counters.hit_rate(),
            oldest_inserted_at: oldest.and_then(ms_to_datetime),
            newest_inserted_at: newest.and_then(ms_to_datetime),
        }
    }

    // == Keys ==
    /// Returns all keys; order is unspecified.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the keys the matcher accepts; order is unspecified.
    pub fn keys_matching(&self, matcher: &KeyMatcher) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the current summed estimated size of live entries.
    pub fn memory_bytes(&self) -> u64 {
        self.memory_bytes
    }

    // == Evict ==
    /// Removes one entry under capacity or memory pressure.
    fn evict(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.memory_bytes = self.memory_bytes.saturating_sub(entry.estimated_size);
            if self.config.stats_enabled {
                self.counters.record_eviction();
            }
            debug!(key = %key, size = entry.estimated_size, "evicted entry");
        }
    }
}
