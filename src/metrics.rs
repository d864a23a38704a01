//! Operation counters for the adaptive engine.
//!
//! The orchestrator holds no lock of its own, so the counters are relaxed
//! atomics rather than lock-protected cells. They are observational only:
//! nothing in the replacement policy reads them back.
//!
//! ## Key Components
//!
//! - [`MetricsRecorder`]: internal counter block owned by the cache.
//! - [`AdaptiveMetricsSnapshot`]: plain-data copy returned to callers,
//!   with store-occupancy gauges captured at snapshot time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Relaxed-atomic counter block for one adaptive cache.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    get_calls: AtomicU64,
    get_hits: AtomicU64,
    get_misses: AtomicU64,
    put_calls: AtomicU64,
    ghost_hits: AtomicU64,
    capacity_transfers: AtomicU64,
    promotions: AtomicU64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_get(&self, hit: bool) {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.get_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.get_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_put(&self) {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_ghost_hit(&self) {
        self.ghost_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_capacity_transfer(&self) {
        self.capacity_transfers.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters into a snapshot; the caller fills in gauges.
    pub fn snapshot(&self) -> AdaptiveMetricsSnapshot {
        AdaptiveMetricsSnapshot {
            get_calls: self.get_calls.load(Ordering::Relaxed),
            get_hits: self.get_hits.load(Ordering::Relaxed),
            get_misses: self.get_misses.load(Ordering::Relaxed),
            put_calls: self.put_calls.load(Ordering::Relaxed),
            ghost_hits: self.ghost_hits.load(Ordering::Relaxed),
            capacity_transfers: self.capacity_transfers.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            recency_len: 0,
            frequency_len: 0,
            recency_capacity: 0,
            frequency_capacity: 0,
        }
    }
}

/// Point-in-time view of an adaptive cache's counters and occupancy.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptiveMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub put_calls: u64,

    /// Repeat accesses detected through either ghost history.
    pub ghost_hits: u64,
    /// Ghost hits that actually moved a unit of capacity.
    pub capacity_transfers: u64,
    /// Copies of recency-resident keys into the frequency partition.
    pub promotions: u64,

    // gauges captured at snapshot time
    pub recency_len: usize,
    pub frequency_len: usize,
    pub recency_capacity: usize,
    pub frequency_capacity: usize,
}

impl AdaptiveMetricsSnapshot {
    /// Fraction of `get` calls that found a resident value, in `[0, 1]`.
    ///
    /// Returns 0.0 before any `get` has been recorded.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
