//! Market Cache - bounded in-memory cache tiers for market-data APIs
//!
//! The caching layer behind the analytics dashboard's API: independently
//! configured TTL/LRU stores (short-lived, api-default, long-lived), a
//! cache-aside `cached()` façade with per-key load coalescing, time-bucketed
//! key construction, pattern-based invalidation, per-tier statistics with
//! advisory insights, and a background janitor.

pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod insights;
pub mod keys;
pub mod registry;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, CacheStore, EstimateSize, KeyMatcher};
pub use config::{CacheConfig, JanitorConfig};
pub use error::{CacheError, Result};
pub use facade::Cache;
pub use insights::{analyze, Insight, Severity, TierReport};
pub use keys::{build_key, build_key_at, TimeRange};
pub use registry::{CacheRegistry, CacheRegistryBuilder, TIER_API, TIER_LONG, TIER_SHORT};
pub use tasks::{spawn_janitor, JanitorHandle};
