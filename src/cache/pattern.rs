//! Key Matching Module
//!
//! Match modes for bulk invalidation and key listing: exact key sets,
//! substring containment, or a compiled regular expression.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{CacheError, Result};

// == Key Matcher ==
/// A predicate over cache keys.
///
/// Construction is the only fallible step (regex compilation); matching is
/// infallible and cheap enough to run under the store lock.
#[derive(Debug, Clone)]
pub enum KeyMatcher {
    /// Matches keys contained in an exact set
    Exact(HashSet<String>),
    /// Matches keys containing the given substring
    Substring(String),
    /// Matches keys accepted by a compiled regular expression
    Pattern(Regex),
}

impl KeyMatcher {
    /// Matcher for an explicit list of keys.
    pub fn exact<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exact(keys.into_iter().map(Into::into).collect())
    }

    /// Matcher for keys containing `needle`.
    pub fn substring(needle: impl Into<String>) -> Self {
        Self::Substring(needle.into())
    }

    /// Matcher for keys accepted by `pattern`.
    ///
    /// A malformed pattern is a caller error and surfaces immediately rather
    /// than being swallowed at match time.
    pub fn regex(pattern: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self::Pattern(compiled))
    }

    // == Matches ==
    /// Tests a single key against the matcher.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(keys) => keys.contains(key),
            Self::Substring(needle) => key.contains(needle.as_str()),
            Self::Pattern(regex) => regex.is_match(key),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let matcher = KeyMatcher::exact(["price:btc:24h:1", "price:eth:24h:1"]);
        assert!(matcher.matches("price:btc:24h:1"));
        assert!(!matcher.matches("price:sol:24h:1"));
    }

    #[test]
    fn test_substring_match() {
        let matcher = KeyMatcher::substring("btc");
        assert!(matcher.matches("price:btc:24h:1"));
        assert!(matcher.matches("social:btc:7d:9"));
        assert!(!matcher.matches("price:eth:24h:1"));
    }

    #[test]
    fn test_regex_match() {
        let matcher = KeyMatcher::regex(r"^price:[a-z]+:1h:\d+$").unwrap();
        assert!(matcher.matches("price:btc:1h:123"));
        assert!(!matcher.matches("social:btc:1h:123"));
        assert!(!matcher.matches("price:btc:24h:123"));
    }

    #[test]
    fn test_malformed_regex_surfaces_error() {
        let result = KeyMatcher::regex("price:(unclosed");
        assert!(matches!(result, Err(CacheError::InvalidPattern { .. })));
    }
}
