//! Eviction Policy Module
//!
//! Victim selection for capacity, memory and low-value eviction. Recency is
//! read straight off each entry's `last_accessed_at`; ties are broken by key
//! order so eviction is reproducible.

use std::collections::HashMap;

use crate::cache::entry::CacheEntry;

// == LRU Victim ==
/// Returns the least-recently-used key, or None if the map is empty.
pub fn lru_victim<V>(entries: &HashMap<String, CacheEntry<V>>) -> Option<String> {
    entries
        .iter()
        .min_by(|(ka, ea), (kb, eb)| {
            ea.last_accessed_at
                .cmp(&eb.last_accessed_at)
                .then_with(|| ka.cmp(kb))
        })
        .map(|(key, _)| key.clone())
}

// == Memory Victims ==
/// Returns keys in ascending recency order whose combined estimated size
/// covers `needed_bytes`. May return every key when the store cannot free
/// enough space.
pub fn memory_victims<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    needed_bytes: u64,
) -> Vec<String> {
    let mut by_recency: Vec<(&String, &CacheEntry<V>)> = entries.iter().collect();
    by_recency.sort_by(|(ka, ea), (kb, eb)| {
        ea.last_accessed_at
            .cmp(&eb.last_accessed_at)
            .then_with(|| ka.cmp(kb))
    });

    let mut freed = 0u64;
    let mut victims = Vec::new();
    for (key, entry) in by_recency {
        if freed >= needed_bytes {
            break;
        }
        freed += entry.estimated_size;
        victims.push(key.clone());
    }
    victims
}

// == Low-Value Victims ==
/// Returns keys ordered by ascending `(hit_count, last_accessed_at, key)`
/// whose combined size covers `needed_bytes`. Used by the janitor's
/// memory-pressure pass: rarely-read entries go first regardless of recency.
pub fn low_value_victims<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    needed_bytes: u64,
) -> Vec<String> {
    let mut by_value: Vec<(&String, &CacheEntry<V>)> = entries.iter().collect();
    by_value.sort_by(|(ka, ea), (kb, eb)| {
        ea.hit_count
            .cmp(&eb.hit_count)
            .then_with(|| ea.last_accessed_at.cmp(&eb.last_accessed_at))
            .then_with(|| ka.cmp(kb))
    });

    let mut freed = 0u64;
    let mut victims = Vec::new();
    for (key, entry) in by_value {
        if freed >= needed_bytes {
            break;
        }
        freed += entry.estimated_size;
        victims.push(key.clone());
    }
    victims
}
