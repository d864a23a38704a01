//! Builder for the adaptive cache.
//!
//! Construction needs only a capacity; the promotion threshold defaults to
//! [`DEFAULT_PROMOTION_THRESHOLD`] and can be overridden before building.
//!
//! ## Example
//!
//! ```rust
//! use arckit::builder::AdaptiveCacheBuilder;
//!
//! let cache = AdaptiveCacheBuilder::new(100)
//!     .promotion_threshold(2)
//!     .build::<u64, String>();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::adaptive::{AdaptiveCache, DEFAULT_PROMOTION_THRESHOLD};

/// Builder for [`AdaptiveCache`] instances.
#[derive(Debug, Clone)]
pub struct AdaptiveCacheBuilder {
    capacity: usize,
    promotion_threshold: usize,
}

impl AdaptiveCacheBuilder {
    /// Starts a builder for a cache whose partitions each hold `capacity`
    /// entries of main store.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
        }
    }

    /// Overrides the access count at which recency-resident keys are
    /// promoted into the frequency partition.
    pub fn promotion_threshold(mut self, threshold: usize) -> Self {
        self.promotion_threshold = threshold;
        self
    }

    /// Builds the cache.
    ///
    /// Accepts any parameter combination; a capacity of 0 yields an inert
    /// cache whose `put` is a no-op.
    pub fn build<K, V>(self) -> AdaptiveCache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        AdaptiveCache::with_threshold(self.capacity, self.promotion_threshold)
    }

    /// Builds the cache, rejecting parameter combinations that make the
    /// promotion machinery degenerate.
    ///
    /// A threshold of 0 is refused: every access count satisfies it, so
    /// each `get` would re-copy the entry into the frequency partition.
    ///
    /// # Example
    ///
    /// ```
    /// use arckit::builder::AdaptiveCacheBuilder;
    ///
    /// let cache = AdaptiveCacheBuilder::new(100).try_build::<u64, i32>();
    /// assert!(cache.is_ok());
    ///
    /// let bad = AdaptiveCacheBuilder::new(100)
    ///     .promotion_threshold(0)
    ///     .try_build::<u64, i32>();
    /// assert!(bad.is_err());
    /// ```
    pub fn try_build<K, V>(self) -> Result<AdaptiveCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        if self.promotion_threshold == 0 {
            return Err(ConfigError::new("promotion threshold must be at least 1"));
        }
        Ok(self.build())
    }
}
