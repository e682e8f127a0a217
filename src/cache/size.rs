//! Size Estimation Module
//!
//! Approximate memory accounting for cached values. Sizes are computed once at
//! insertion by walking the value's structure, not by serializing it; callers
//! that know the exact payload size can bypass estimation entirely via
//! `CacheStore::set_with_size`.

/// Fallback size in bytes for values whose structure gives no better signal.
pub const DEFAULT_ENTRY_SIZE: u64 = 1024;

/// Rough per-allocation bookkeeping overhead (pointer + capacity + length).
const ALLOC_OVERHEAD: u64 = 24;

// == Estimate Size ==
/// Approximate in-memory size of a value, in bytes.
///
/// Estimates are deliberately cheap and conservative; they feed the store's
/// memory bound, not an allocator. Implementations must be pure: the store
/// computes the size once at insertion and never re-asks.
pub trait EstimateSize {
    /// Estimated size of `self` in bytes.
    ///
    /// The default falls back to [`DEFAULT_ENTRY_SIZE`], so an opaque
    /// payload type can opt in with an empty impl and still be accounted
    /// for, just coarsely.
    fn estimated_size(&self) -> u64 {
        DEFAULT_ENTRY_SIZE
    }
}

impl EstimateSize for String {
    fn estimated_size(&self) -> u64 {
        self.len() as u64 + ALLOC_OVERHEAD
    }
}

impl EstimateSize for Vec<u8> {
    fn estimated_size(&self) -> u64 {
        self.len() as u64 + ALLOC_OVERHEAD
    }
}

impl EstimateSize for serde_json::Value {
    /// Recursive structural walk; the dashboard caches reshaped provider
    /// responses as JSON values, so this is the impl that matters most.
    fn estimated_size(&self) -> u64 {
        use serde_json::Value;
        match self {
            Value::Null => 8,
            Value::Bool(_) => 8,
            Value::Number(_) => 16,
            Value::String(s) => s.len() as u64 + ALLOC_OVERHEAD,
            Value::Array(items) => {
                ALLOC_OVERHEAD + items.iter().map(EstimateSize::estimated_size).sum::<u64>()
            }
            Value::Object(map) => {
                ALLOC_OVERHEAD
                    + map
                        .iter()
                        .map(|(k, v)| k.len() as u64 + ALLOC_OVERHEAD + v.estimated_size())
                        .sum::<u64>()
            }
        }
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimated_size(&self) -> u64 {
        match self {
            Some(v) => v.estimated_size(),
            None => 8,
        }
    }
}

impl<T: EstimateSize> EstimateSize for Vec<T> {
    fn estimated_size(&self) -> u64 {
        ALLOC_OVERHEAD + self.iter().map(EstimateSize::estimated_size).sum::<u64>()
    }
}

macro_rules! impl_estimate_size_fixed {
    ($($ty:ty),*) => {
        $(impl EstimateSize for $ty {
            fn estimated_size(&self) -> u64 {
                std::mem::size_of::<$ty>() as u64
            }
        })*
    };
}

impl_estimate_size_fixed!(bool, i32, i64, u32, u64, f32, f64);

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_size_scales_with_length() {
        let short = "ab".to_string().estimated_size();
        let long = "a".repeat(1000).estimated_size();
        assert_eq!(short, 2 + ALLOC_OVERHEAD);
        assert_eq!(long, 1000 + ALLOC_OVERHEAD);
    }

    #[test]
    fn test_json_object_size_counts_keys_and_values() {
        let flat = json!({"price": 1.23});
        let nested = json!({
            "price": 1.23,
            "history": [1.0, 2.0, 3.0, 4.0],
            "symbol": "BTCUSD"
        });
        assert!(nested.estimated_size() > flat.estimated_size());
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(json!(null).estimated_size(), 8);
        assert_eq!(json!(true).estimated_size(), 8);
        assert_eq!(json!(42).estimated_size(), 16);
    }

    #[test]
    fn test_vec_of_values() {
        let v: Vec<u64> = vec![1, 2, 3];
        assert_eq!(v.estimated_size(), ALLOC_OVERHEAD + 3 * 8);
    }

    #[test]
    fn test_option_none_is_small() {
        let none: Option<String> = None;
        assert_eq!(none.estimated_size(), 8);
    }

    #[test]
    fn test_opaque_type_falls_back_to_default() {
        struct Opaque;
        impl EstimateSize for Opaque {}

        assert_eq!(Opaque.estimated_size(), DEFAULT_ENTRY_SIZE);
    }
}
