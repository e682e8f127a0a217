//! Cache Registry Module
//!
//! Owns the named cache tiers and their shared lifecycle. The registry is
//! built once at the application's composition root and injected into
//! collaborators; tiers are fixed after construction. Tiering replaces a
//! single global policy: each tier carries its own size, memory and TTL
//! budget matched to how fast its data goes stale.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::KeyMatcher;
use crate::config::{CacheConfig, JanitorConfig};
use crate::error::{CacheError, Result};
use crate::facade::Cache;
use crate::insights::{analyze, Insight, TierReport};
use crate::tasks::{spawn_janitor, JanitorHandle};

// == Tier Names ==
/// High-churn tier for fast-moving market data.
pub const TIER_SHORT: &str = "short";
/// Default tier for reshaped API responses.
pub const TIER_API: &str = "api";
/// Long-lived tier for slow-moving reference data.
pub const TIER_LONG: &str = "long";

// == Registry Builder ==
/// Builder for [`CacheRegistry`]; registered tiers become immutable at
/// `build()`.
#[derive(Debug)]
pub struct CacheRegistryBuilder<V> {
    tiers: BTreeMap<String, Cache<V>>,
}

impl<V: Clone> CacheRegistryBuilder<V> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            tiers: BTreeMap::new(),
        }
    }

    /// Registers a tier under `name`. Registering the same name twice
    /// replaces the earlier tier.
    pub fn tier(mut self, name: impl Into<String>, config: CacheConfig) -> Self {
        self.tiers.insert(name.into(), Cache::new(config));
        self
    }

    /// Finalizes the tier set.
    pub fn build(self) -> CacheRegistry<V> {
        CacheRegistry {
            tiers: Arc::new(self.tiers),
        }
    }
}

impl<V: Clone> Default for CacheRegistryBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Cache Registry ==
/// The set of named cache tiers. Cloning is cheap; clones share the tiers.
#[derive(Debug, Clone)]
pub struct CacheRegistry<V> {
    tiers: Arc<BTreeMap<String, Cache<V>>>,
}

impl<V: Clone> CacheRegistry<V> {
    /// Starts building a registry.
    pub fn builder() -> CacheRegistryBuilder<V> {
        CacheRegistryBuilder::new()
    }

    /// Builds the dashboard's standard three tiers (short / api / long),
    /// each with `CACHE_{TIER}_*` environment overrides applied.
    pub fn with_default_tiers() -> Self {
        Self::builder()
            .tier(
                TIER_SHORT,
                CacheConfig::short_lived().with_env_overrides("CACHE_SHORT"),
            )
            .tier(
                TIER_API,
                CacheConfig::api_default().with_env_overrides("CACHE_API"),
            )
            .tier(
                TIER_LONG,
                CacheConfig::long_lived().with_env_overrides("CACHE_LONG"),
            )
            .build()
    }

    // == Lookup ==
    /// Returns a handle to the named tier, if registered.
    pub fn tier(&self, name: &str) -> Option<Cache<V>> {
        self.tiers.get(name).cloned()
    }

    /// Iterates over `(name, handle)` pairs in name order.
    pub fn tiers(&self) -> impl Iterator<Item = (&str, &Cache<V>)> {
        self.tiers.iter().map(|(name, cache)| (name.as_str(), cache))
    }

    /// Registered tier names, in order.
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.keys().map(String::as_str).collect()
    }

    // == Invalidation ==
    /// Removes matching entries from every tier; returns the total removed.
    /// Tiers are locked one at a time, never together.
    pub async fn invalidate(&self, matcher: &KeyMatcher) -> usize {
        let mut removed = 0;
        for (_, cache) in self.tiers() {
            removed += cache.invalidate(matcher).await;
        }
        removed
    }

    /// Removes matching entries from one named tier.
    pub async fn invalidate_tier(&self, name: &str, matcher: &KeyMatcher) -> Result<usize> {
        match self.tiers.get(name) {
            Some(cache) => Ok(cache.invalidate(matcher).await),
            None => Err(CacheError::UnknownTier(name.to_string())),
        }
    }

    // == Reporting ==
    /// Snapshots every tier's stats, one lock at a time.
    pub async fn reports(&self) -> Vec<TierReport> {
        let mut reports = Vec::with_capacity(self.tiers.len());
        for (name, cache) in self.tiers() {
            reports.push(TierReport {
                tier: name.to_string(),
                stats: cache.stats().await,
            });
        }
        reports
    }

    /// Runs the advisory rules over the current tier reports.
    pub async fn insights(&self) -> Vec<Insight> {
        analyze(&self.reports().await)
    }

    // == Janitor ==
    /// Spawns the background janitor over this registry's tiers. The caller
    /// owns the returned handle and shuts it down when the application
    /// stops.
    pub fn start_janitor(&self, config: JanitorConfig) -> JanitorHandle
    where
        V: Send + Sync + 'static,
    {
        spawn_janitor(self.clone(), config)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CacheRegistry<String> {
        CacheRegistry::with_default_tiers()
    }

    #[tokio::test]
    async fn test_default_tiers_registered() {
        let registry = registry();
        assert_eq!(registry.tier_names(), vec![TIER_API, TIER_LONG, TIER_SHORT]);
        assert!(registry.tier(TIER_API).is_some());
        assert!(registry.tier("bogus").is_none());
    }

    #[tokio::test]
    async fn test_tiers_are_independent() {
        let registry = registry();
        let short = registry.tier(TIER_SHORT).unwrap();
        let api = registry.tier(TIER_API).unwrap();

        short.set("k", "short".to_string(), None).await;
        api.set("k", "api".to_string(), None).await;

        assert_eq!(short.get("k").await, Some("short".to_string()));
        assert_eq!(api.get("k").await, Some("api".to_string()));

        short.delete("k").await;
        assert_eq!(api.get("k").await, Some("api".to_string()));
    }

    #[tokio::test]
    async fn test_invalidate_fans_out() {
        let registry = registry();
        registry
            .tier(TIER_SHORT)
            .unwrap()
            .set("price:btc:1h:1", "a".to_string(), None)
            .await;
        registry
            .tier(TIER_API)
            .unwrap()
            .set("price:btc:24h:1", "b".to_string(), None)
            .await;
        registry
            .tier(TIER_LONG)
            .unwrap()
            .set("meta:eth", "c".to_string(), None)
            .await;

        let removed = registry.invalidate(&KeyMatcher::substring("btc")).await;
        assert_eq!(removed, 2);
        assert_eq!(
            registry.tier(TIER_LONG).unwrap().get("meta:eth").await,
            Some("c".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalidate_tier_scoped() {
        let registry = registry();
        registry
            .tier(TIER_SHORT)
            .unwrap()
            .set("price:btc:1h:1", "a".to_string(), None)
            .await;
        registry
            .tier(TIER_API)
            .unwrap()
            .set("price:btc:24h:1", "b".to_string(), None)
            .await;

        let removed = registry
            .invalidate_tier(TIER_SHORT, &KeyMatcher::substring("btc"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(registry
            .tier(TIER_API)
            .unwrap()
            .get("price:btc:24h:1")
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_invalidate_unknown_tier_errors() {
        let registry = registry();
        let result = registry
            .invalidate_tier("bogus", &KeyMatcher::substring("x"))
            .await;
        assert!(matches!(result, Err(CacheError::UnknownTier(_))));
    }

    #[tokio::test]
    async fn test_reports_cover_all_tiers() {
        let registry = registry();
        registry
            .tier(TIER_API)
            .unwrap()
            .set("k", "v".to_string(), None)
            .await;

        let reports = registry.reports().await;
        assert_eq!(reports.len(), 3);
        let api = reports.iter().find(|r| r.tier == TIER_API).unwrap();
        assert_eq!(api.stats.entries, 1);
    }
}
