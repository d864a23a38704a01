//! Error types for the arckit library.
//!
//! Cache operations themselves are total: absence and zero-capacity
//! degradation are reported through `Option`/`bool` returns, never through
//! errors. The types here cover the two places errors can genuinely arise:
//!
//! - [`ConfigError`]: invalid construction parameters, returned by
//!   fallible builders such as
//!   [`AdaptiveCacheBuilder::try_build`](crate::builder::AdaptiveCacheBuilder::try_build).
//! - [`InvariantError`]: internal-consistency violations, returned by the
//!   debug-build `check_invariants` method on
//!   [`AdaptiveCache`](crate::policy::adaptive::AdaptiveCache).

use std::fmt;

/// Error returned when cache construction parameters are invalid.
///
/// # Example
///
/// ```
/// use arckit::builder::AdaptiveCacheBuilder;
///
/// let err = AdaptiveCacheBuilder::new(16)
///     .promotion_threshold(0)
///     .try_build::<u64, String>()
///     .unwrap_err();
/// assert!(err.to_string().contains("promotion threshold"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Error returned when an internal cache invariant is violated.
///
/// Carries a human-readable description of which invariant failed. Only
/// produced by debug/test-build consistency checks; release-path operations
/// never construct it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_display_and_accessor() {
        let err = ConfigError::new("capacity out of range");
        assert_eq!(err.to_string(), "capacity out of range");
        assert_eq!(err.message(), "capacity out of range");
    }

    #[test]
    fn invariant_display_and_accessor() {
        let err = InvariantError::new("partition over capacity");
        assert_eq!(err.to_string(), "partition over capacity");
        assert_eq!(err.message(), "partition over capacity");
    }

    #[test]
    fn both_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<InvariantError>();
    }

    #[test]
    fn clone_and_eq() {
        let a = ConfigError::new("x");
        assert_eq!(a.clone(), a);
        let b = InvariantError::new("y");
        assert_eq!(b.clone(), b);
    }
}
