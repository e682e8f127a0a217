//! Key Builder Module
//!
//! Deterministic cache-key construction with an embedded coarse time bucket.
//!
//! Rather than actively invalidating keys when upstream data changes, keys
//! carry a bucket index derived from the wall clock: once the clock rolls
//! into the next bucket, callers start asking for a fresh key and the old
//! entry simply ages out via TTL and eviction. Bucket widths are fixed per
//! freshness domain:
//!
//! | range | bucket width |
//! |-------|--------------|
//! | 1h    | 60 s         |
//! | 24h   | 300 s        |
//! | 7d    | 1800 s       |
//! | 30d   | 3600 s       |
//! | max   | 21600 s      |
//!
//! Fast-moving ranges get fine buckets; slow-moving ranges tolerate coarser
//! ones. Keys look like `price:btc:24h:5738294`.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;

use crate::error::CacheError;

// == Time Range ==
/// Logical staleness tolerance of the data behind a key.
///
/// The label names the span the caller is asking for ("last 24 hours"); the
/// associated bucket width says how often that answer is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    /// Last hour, changes minute to minute
    Hour1,
    /// Last 24 hours
    Hour24,
    /// Last 7 days
    Day7,
    /// Last 30 days
    Day30,
    /// Full history
    Max,
}

impl TimeRange {
    /// Width of the freshness bucket embedded in keys for this range.
    pub fn bucket(&self) -> Duration {
        match self {
            Self::Hour1 => Duration::from_secs(60),
            Self::Hour24 => Duration::from_secs(300),
            Self::Day7 => Duration::from_secs(1800),
            Self::Day30 => Duration::from_secs(3600),
            Self::Max => Duration::from_secs(21600),
        }
    }

    /// Label used inside keys and accepted by `FromStr`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour1 => "1h",
            Self::Hour24 => "24h",
            Self::Day7 => "7d",
            Self::Day30 => "30d",
            Self::Max => "max",
        }
    }
}

impl FromStr for TimeRange {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Self::Hour1),
            "24h" => Ok(Self::Hour24),
            "7d" => Ok(Self::Day7),
            "30d" => Ok(Self::Day30),
            "max" => Ok(Self::Max),
            other => Err(CacheError::UnknownTimeRange(other.to_string())),
        }
    }
}

// == Build Key ==
/// Builds a cache key for `domain` (e.g. `price`, `social`), `subject`
/// (e.g. a coin id) and `range`, stable within the range's freshness bucket.
///
/// Two calls inside the same bucket return the identical key; calls in
/// different buckets differ, which is what retires stale entries without any
/// explicit invalidation.
pub fn build_key(domain: &str, subject: &str, range: TimeRange) -> String {
    build_key_at(domain, subject, range, Utc::now().timestamp() as u64)
}

/// Timestamp-parameterized variant of [`build_key`]; `now_secs` is Unix
/// seconds. Lets callers and tests pin the bucket deterministically.
pub fn build_key_at(domain: &str, subject: &str, range: TimeRange, now_secs: u64) -> String {
    let bucket_index = now_secs / range.bucket().as_secs();
    format!("{}:{}:{}:{}", domain, subject, range.as_str(), bucket_index)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stable_within_bucket() {
        // 24h range -> 300s buckets; both instants land in the same bucket
        let base = 1_700_000_100; // 1_700_000_100 / 300 == 5_666_667
        let k1 = build_key_at("price", "btc", TimeRange::Hour24, base);
        let k2 = build_key_at("price", "btc", TimeRange::Hour24, base + 120);
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_key_changes_across_buckets() {
        let base = 1_700_000_100;
        let k1 = build_key_at("price", "btc", TimeRange::Hour24, base);
        let k2 = build_key_at("price", "btc", TimeRange::Hour24, base + 600);
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_key_varies_by_domain_subject_range() {
        let now = 1_700_000_000;
        let price = build_key_at("price", "btc", TimeRange::Hour24, now);
        let social = build_key_at("social", "btc", TimeRange::Hour24, now);
        let eth = build_key_at("price", "eth", TimeRange::Hour24, now);
        let weekly = build_key_at("price", "btc", TimeRange::Day7, now);

        assert_ne!(price, social);
        assert_ne!(price, eth);
        assert_ne!(price, weekly);
    }

    #[test]
    fn test_key_shape() {
        let key = build_key_at("price", "btc", TimeRange::Hour1, 6000);
        // 6000 / 60 == 100
        assert_eq!(key, "price:btc:1h:100");
    }

    #[test]
    fn test_finer_buckets_for_faster_ranges() {
        assert!(TimeRange::Hour1.bucket() < TimeRange::Hour24.bucket());
        assert!(TimeRange::Hour24.bucket() < TimeRange::Day7.bucket());
        assert!(TimeRange::Day30.bucket() < TimeRange::Max.bucket());
    }

    #[test]
    fn test_range_label_roundtrip() {
        for range in [
            TimeRange::Hour1,
            TimeRange::Hour24,
            TimeRange::Day7,
            TimeRange::Day30,
            TimeRange::Max,
        ] {
            assert_eq!(range.as_str().parse::<TimeRange>().unwrap(), range);
        }
    }

    #[test]
    fn test_unknown_range_label_is_an_error() {
        let result = "90d".parse::<TimeRange>();
        assert!(matches!(result, Err(CacheError::UnknownTimeRange(_))));
    }

    #[test]
    fn test_wall_clock_variant_matches_pinned() {
        let now = Utc::now().timestamp() as u64;
        let live = build_key("price", "btc", TimeRange::Max);
        let pinned = build_key_at("price", "btc", TimeRange::Max, now);
        // 21600s buckets make a mid-test rollover vanishingly unlikely
        assert_eq!(live, pinned);
    }
}
