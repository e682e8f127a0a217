//! Cache Insights Module
//!
//! Advisory rule engine over per-tier stats snapshots. Purely observational:
//! analysis consumes snapshots that were already taken and never touches the
//! stores themselves.

use serde::Serialize;

use crate::cache::CacheStats;

// == Thresholds ==
/// Hit rate below which a tier is flagged as underperforming.
pub const LOW_HIT_RATE_THRESHOLD: f64 = 0.4;

/// Hit rate above which a tier is noted as healthy.
pub const HIGH_HIT_RATE_THRESHOLD: f64 = 0.85;

/// Aggregate memory across all tiers above which a warning is raised.
pub const AGGREGATE_MEMORY_WARN_BYTES: u64 = 100 * 1024 * 1024;

/// Minimum number of requests before a tier's hit rate is judged at all;
/// a cold tier's first few misses are not a signal.
pub const MIN_REQUEST_SAMPLE: u64 = 100;

// == Tier Report ==
/// A named tier's stats snapshot, the unit the rule engine consumes.
#[derive(Debug, Clone, Serialize)]
pub struct TierReport {
    /// Tier name as registered
    pub tier: String,
    /// Snapshot taken from that tier's store
    pub stats: CacheStats,
}

// == Insight ==
/// How urgent an insight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// One advisory finding about a tier or the whole subsystem.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    /// Tier the finding is about, or None for aggregate findings
    pub tier: Option<String>,
    pub severity: Severity,
    /// Human-readable summary, suitable for a log line or dashboard row
    pub summary: String,
}

// == Analyze ==
/// Runs the advisory rules over a set of tier reports.
///
/// Per tier (only once `MIN_REQUEST_SAMPLE` requests have been seen): a
/// warning below [`LOW_HIT_RATE_THRESHOLD`], an info note above
/// [`HIGH_HIT_RATE_THRESHOLD`]. Across tiers: a warning when summed memory
/// exceeds [`AGGREGATE_MEMORY_WARN_BYTES`].
pub fn analyze(reports: &[TierReport]) -> Vec<Insight> {
    let mut insights = Vec::new();

    for report in reports {
        let requests = report.stats.hits + report.stats.misses;
        if requests < MIN_REQUEST_SAMPLE {
            continue;
        }

        if report.stats.hit_rate < LOW_HIT_RATE_THRESHOLD {
            insights.push(Insight {
                tier: Some(report.tier.clone()),
                severity: Severity::Warning,
                summary: format!(
                    "hit rate {:.1}% over {} requests; consider longer TTLs or coarser key buckets",
                    report.stats.hit_rate * 100.0,
                    requests
                ),
            });
        } else if report.stats.hit_rate > HIGH_HIT_RATE_THRESHOLD {
            insights.push(Insight {
                tier: Some(report.tier.clone()),
                severity: Severity::Info,
                summary: format!(
                    "hit rate {:.1}% over {} requests",
                    report.stats.hit_rate * 100.0,
                    requests
                ),
            });
        }
    }

    let total_memory: u64 = reports.iter().map(|r| r.stats.memory_bytes).sum();
    if total_memory > AGGREGATE_MEMORY_WARN_BYTES {
        insights.push(Insight {
            tier: None,
            severity: Severity::Warning,
            summary: format!(
                "aggregate cache memory {} bytes exceeds {} bytes",
                total_memory, AGGREGATE_MEMORY_WARN_BYTES
            ),
        });
    }

    insights
}
