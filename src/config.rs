//! Configuration Module
//!
//! Handles per-store and janitor configuration, with environment-variable
//! overrides loaded at the composition root.

use std::env;
use std::time::Duration;

// == Cache Config ==
/// Configuration for a single cache store.
///
/// Each store (tier) is configured independently; the presets below mirror the
/// dashboard's three tiers: a short-TTL high-churn tier for fast-moving market
/// data, a default tier for API responses, and a long-TTL tier for slow-moving
/// reference data.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the store can hold
    pub max_entries: usize,
    /// Maximum summed estimated size of all live entries, in bytes
    pub max_memory_bytes: u64,
    /// TTL applied to entries inserted without an explicit TTL
    pub default_ttl: Duration,
    /// Whether hit/miss/eviction counters are recorded
    pub stats_enabled: bool,
    /// Reserved for a future compressed-value path; accepted but currently
    /// inert. Nothing in the storage or eviction path reads it.
    pub compression_threshold: Option<u64>,
}

impl CacheConfig {
    /// Preset for fast-moving data (prices, trending lists): 30s TTL.
    pub fn short_lived() -> Self {
        Self {
            max_entries: 500,
            max_memory_bytes: 5 * 1024 * 1024,
            default_ttl: Duration::from_secs(30),
            stats_enabled: true,
            compression_threshold: None,
        }
    }

    /// Preset for general API responses: 5 minute TTL.
    pub fn api_default() -> Self {
        Self {
            max_entries: 1000,
            max_memory_bytes: 25 * 1024 * 1024,
            default_ttl: Duration::from_secs(300),
            stats_enabled: true,
            compression_threshold: None,
        }
    }

    /// Preset for slow-moving reference data (token metadata, historical
    /// ranges): 1 hour TTL.
    pub fn long_lived() -> Self {
        Self {
            max_entries: 2000,
            max_memory_bytes: 50 * 1024 * 1024,
            default_ttl: Duration::from_secs(3600),
            stats_enabled: true,
            compression_threshold: None,
        }
    }

    /// Applies environment-variable overrides on top of `self`.
    ///
    /// Variables are read as `{prefix}_MAX_ENTRIES`, `{prefix}_MAX_MEMORY_BYTES`,
    /// `{prefix}_DEFAULT_TTL_SECS` and `{prefix}_STATS_ENABLED`; unset or
    /// unparseable values leave the current setting in place.
    pub fn with_env_overrides(mut self, prefix: &str) -> Self {
        if let Some(v) = read_env(prefix, "MAX_ENTRIES") {
            self.max_entries = v;
        }
        if let Some(v) = read_env(prefix, "MAX_MEMORY_BYTES") {
            self.max_memory_bytes = v;
        }
        if let Some(v) = read_env(prefix, "DEFAULT_TTL_SECS") {
            self.default_ttl = Duration::from_secs(v);
        }
        if let Some(v) = read_env::<bool>(prefix, "STATS_ENABLED") {
            self.stats_enabled = v;
        }
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::api_default()
    }
}

// == Janitor Config ==
/// Configuration for the background janitor task.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// Interval between expiration sweeps
    pub sweep_interval: Duration,
    /// Memory-pressure evaluation runs every Nth sweep tick
    pub memory_check_every: u64,
    /// Soft limit on aggregate memory across all stores, in bytes.
    ///
    /// A safety net layered on top of each store's own `max_memory_bytes`:
    /// when the sum of all stores' memory exceeds it, low-hit-count entries
    /// are shed until the aggregate fits again.
    pub memory_soft_limit_bytes: u64,
}

impl JanitorConfig {
    /// Creates a JanitorConfig from environment variables with defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_MEMORY_CHECK_EVERY` - Memory pass every Nth tick (default: 5)
    /// - `CACHE_MEMORY_SOFT_LIMIT_BYTES` - Aggregate soft limit (default: 100 MB)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_interval: read_env("CACHE", "SWEEP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            memory_check_every: read_env("CACHE", "MEMORY_CHECK_EVERY")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.memory_check_every),
            memory_soft_limit_bytes: read_env("CACHE", "MEMORY_SOFT_LIMIT_BYTES")
                .unwrap_or(defaults.memory_soft_limit_bytes),
        }
    }
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            memory_check_every: 5,
            memory_soft_limit_bytes: 100 * 1024 * 1024,
        }
    }
}

fn read_env<T: std::str::FromStr>(prefix: &str, name: &str) -> Option<T> {
    env::var(format!("{}_{}", prefix, name))
        .ok()
        .and_then(|v| v.parse().ok())
}
