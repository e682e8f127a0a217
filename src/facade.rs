//! Cached-Loader Façade
//!
//! [`Cache`] is the shared, clonable handle collaborators hold: a store behind
//! an async lock, plus the `cached()` load-on-miss entry point that most call
//! sites use instead of raw `get`/`set`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::cache::{CacheStats, CacheStore, EstimateSize, KeyMatcher};
use crate::config::CacheConfig;

// == Cache Handle ==
/// Thread-safe handle to one cache store.
///
/// Cloning is cheap and every clone addresses the same store. All methods
/// acquire the store lock only for the duration of the store operation; in
/// particular, `cached()` never holds it across the loader's await.
#[derive(Debug, Clone)]
pub struct Cache<V> {
    /// The store, shared across clones
    store: Arc<RwLock<CacheStore<V>>>,
    /// Per-key in-flight gates for load coalescing
    flights: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(config))),
            flights: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Cached ==
    /// Cache-aside access: returns the stored value on a hit; on a miss runs
    /// `loader`, stores its result under `key` with the default TTL, and
    /// returns it.
    ///
    /// Concurrent misses on the same key are coalesced: one caller runs its
    /// loader while the rest wait and then read the freshly stored value.
    /// A loader failure propagates unchanged, nothing is stored, and the
    /// next caller loads again; failures are never cached.
    pub async fn cached<F, Fut, E>(&self, key: &str, loader: F) -> Result<V, E>
    where
        V: EstimateSize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.cached_with_ttl(key, None, loader).await
    }

    /// Same as [`Cache::cached`] with an explicit TTL override for the
    /// stored result.
    pub async fn cached_with_ttl<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        loader: F,
    ) -> Result<V, E>
    where
        V: EstimateSize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        // Join (or open) this key's in-flight gate so concurrent misses
        // share one loader run.
        let gate = {
            let mut flights = self.flights.lock().await;
            flights
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _in_flight = gate.lock().await;

        // Whoever held the gate before us may have populated the store
        // while we waited. Peek, not get: this caller's miss is already
        // counted.
        if let Some(value) = self.store.write().await.peek(key) {
            return Ok(value);
        }

        // The sole suspension point; no store lock is held here.
        let result = loader().await;

        if let Ok(value) = &result {
            self.store.write().await.set(key, value.clone(), ttl);
        }

        // Retire the gate only after a success is visible in the store, so
        // a late joiner either hits outright or finds the gate still up.
        // After a failure the gate comes down too: the next caller loads
        // fresh, failures are never cached.
        {
            let mut flights = self.flights.lock().await;
            flights.remove(key);
        }

        result
    }

    // == Direct Access ==
    /// Retrieves a value by key; expired entries read as absent.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.store.write().await.get(key)
    }

    /// Inserts or overwrites an entry; `ttl` defaults to the store's default.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>)
    where
        V: EstimateSize,
    {
        self.store.write().await.set(key, value, ttl);
    }

    /// Inserts or overwrites an entry with a caller-supplied size.
    pub async fn set_with_size(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Option<Duration>,
        estimated_size: u64,
    ) {
        self.store
            .write()
            .await
            .set_with_size(key, value, ttl, estimated_size);
    }

    /// Removes an entry by key; idempotent.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    /// Removes all entries and resets counters.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Eagerly removes expired entries; returns the number removed.
    pub async fn cleanup(&self) -> usize {
        self.store.write().await.cleanup()
    }

    /// Removes entries whose keys the matcher accepts; returns the count.
    pub async fn invalidate(&self, matcher: &KeyMatcher) -> usize {
        self.store.write().await.invalidate(matcher)
    }

    /// Sheds rarely-read entries until `max_bytes` are freed; janitor hook.
    pub async fn shed_low_value(&self, max_bytes: u64) -> (usize, u64) {
        self.store.write().await.evict_low_value(max_bytes)
    }

    // == Introspection ==
    /// Read-only stats snapshot.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// All keys; order unspecified.
    pub async fn keys(&self) -> Vec<String> {
        self.store.read().await.keys()
    }

    /// Keys the matcher accepts; order unspecified.
    pub async fn keys_matching(&self, matcher: &KeyMatcher) -> Vec<String> {
        self.store.read().await.keys_matching(matcher)
    }

    /// Current number of live entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// True when the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}
