//! Error types for the cache subsystem
//!
//! Provides unified error handling using thiserror.
//!
//! Normal cache traffic never produces errors: `get` on a missing or expired
//! key returns `None`, `delete` on a missing key returns `false`. The variants
//! here cover caller mistakes at the edges of the API (malformed invalidation
//! patterns, unknown labels).

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache subsystem.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalidation pattern failed to compile as a regular expression
    #[error("invalid key pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern as supplied by the caller
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Unrecognized time-range label passed to the key builder
    #[error("unknown time range: {0:?}")]
    UnknownTimeRange(String),

    /// Referenced cache tier is not registered
    #[error("unknown cache tier: {0:?}")]
    UnknownTier(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache subsystem.
pub type Result<T> = std::result::Result<T, CacheError>;
