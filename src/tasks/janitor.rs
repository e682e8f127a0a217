//! Cache Janitor Task
//!
//! A single background task per process that periodically sweeps expired
//! entries out of every registered tier and, every Nth tick, evaluates
//! aggregate memory pressure across tiers.
//!
//! The janitor takes one store lock at a time, for the duration of one sweep
//! or snapshot, and never two tier locks simultaneously.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::JanitorConfig;
use crate::registry::CacheRegistry;

// == Janitor Handle ==
/// Handle to a running janitor. Owned by whoever built the registry;
/// dropping it does NOT stop the task. Call [`JanitorHandle::shutdown`]
/// during application shutdown.
#[derive(Debug)]
pub struct JanitorHandle {
    handle: JoinHandle<()>,
}

impl JanitorHandle {
    /// Stops the janitor task.
    pub fn shutdown(self) {
        self.handle.abort();
        info!("cache janitor stopped");
    }

    /// True once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// == Spawn Janitor ==
/// Spawns the janitor over the registry's tiers.
///
/// Every tick the janitor calls `cleanup()` on each tier in turn. Every
/// `memory_check_every` ticks it additionally sums memory across tiers and,
/// when the aggregate exceeds the configured soft limit, sheds low-hit-count
/// entries tier by tier until the excess is covered. This is a cross-tier
/// safety net on top of each store's own memory bound.
pub fn spawn_janitor<V>(registry: CacheRegistry<V>, config: JanitorConfig) -> JanitorHandle
where
    V: Clone + Send + Sync + 'static,
{
    let handle = tokio::spawn(async move {
        info!(
            interval_secs = config.sweep_interval.as_secs_f64(),
            memory_check_every = config.memory_check_every,
            "starting cache janitor"
        );

        let mut tick: u64 = 0;
        loop {
            tokio::time::sleep(config.sweep_interval).await;
            tick += 1;

            for (tier, cache) in registry.tiers() {
                let removed = cache.cleanup().await;
                if removed > 0 {
                    info!(tier, removed, "swept expired entries");
                } else {
                    debug!(tier, "no expired entries");
                }
            }

            if tick % config.memory_check_every == 0 {
                relieve_memory_pressure(&registry, config.memory_soft_limit_bytes).await;
            }
        }
    });

    JanitorHandle { handle }
}

// == Memory Pressure ==
/// Sheds low-value entries until aggregate memory fits under `soft_limit`.
async fn relieve_memory_pressure<V: Clone>(registry: &CacheRegistry<V>, soft_limit: u64) {
    let mut total: u64 = 0;
    for (_, cache) in registry.tiers() {
        total += cache.stats().await.memory_bytes;
    }

    if total <= soft_limit {
        debug!(total, soft_limit, "aggregate cache memory within soft limit");
        return;
    }

    warn!(total, soft_limit, "aggregate cache memory above soft limit");
    let mut excess = total - soft_limit;
    for (tier, cache) in registry.tiers() {
        if excess == 0 {
            break;
        }
        let (count, freed) = cache.shed_low_value(excess).await;
        if count > 0 {
            info!(tier, count, freed, "shed low-value entries");
        }
        excess = excess.saturating_sub(freed);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::CacheConfig;

    fn tiny_registry(default_ttl: Duration) -> CacheRegistry<String> {
        CacheRegistry::builder()
            .tier(
                "only",
                CacheConfig {
                    max_entries: 100,
                    max_memory_bytes: 1024 * 1024,
                    default_ttl,
                    stats_enabled: true,
                    compression_threshold: None,
                },
            )
            .build()
    }

    #[tokio::test]
    async fn test_janitor_sweeps_expired_entries() {
        let registry = tiny_registry(Duration::from_millis(30));
        let cache = registry.tier("only").unwrap();
        cache.set("doomed", "v".to_string(), None).await;

        let handle = registry.start_janitor(JanitorConfig {
            sweep_interval: Duration::from_millis(20),
            memory_check_every: 1000,
            memory_soft_limit_bytes: u64::MAX,
        });

        tokio::time::sleep(Duration::from_millis(120)).await;

        // Swept eagerly: gone from keys(), not just unreadable
        assert!(cache.keys().await.is_empty());
        assert_eq!(cache.stats().await.expirations, 1);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_janitor_preserves_live_entries() {
        let registry = tiny_registry(Duration::from_secs(3600));
        let cache = registry.tier("only").unwrap();
        cache.set("kept", "v".to_string(), None).await;

        let handle = registry.start_janitor(JanitorConfig {
            sweep_interval: Duration::from_millis(20),
            memory_check_every: 1000,
            memory_soft_limit_bytes: u64::MAX,
        });

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get("kept").await, Some("v".to_string()));
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_janitor_relieves_memory_pressure() {
        let registry = tiny_registry(Duration::from_secs(3600));
        let cache = registry.tier("only").unwrap();

        // ~4000 bytes of never-read entries against a 1000-byte soft limit
        for i in 0..40 {
            cache
                .set_with_size(format!("k{}", i), "v".to_string(), None, 100)
                .await;
        }

        let handle = registry.start_janitor(JanitorConfig {
            sweep_interval: Duration::from_millis(20),
            memory_check_every: 1,
            memory_soft_limit_bytes: 1000,
        });

        tokio::time::sleep(Duration::from_millis(120)).await;

        let stats = cache.stats().await;
        assert!(
            stats.memory_bytes <= 1000,
            "memory {} should be shed to the soft limit",
            stats.memory_bytes
        );
        assert!(stats.evictions > 0);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_janitor_shutdown_stops_task() {
        let registry = tiny_registry(Duration::from_secs(3600));
        let handle = registry.start_janitor(JanitorConfig::default());

        assert!(!handle.is_finished());
        handle.shutdown();
    }
}
