pub use crate::builder::AdaptiveCacheBuilder;
pub use crate::ds::{GhostStore, NodeArena, NodeId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::AdaptiveMetricsSnapshot;
pub use crate::policy::{AdaptiveCache, DEFAULT_PROMOTION_THRESHOLD, FrequencyPartition, RecencyPartition};
pub use crate::traits::{CachePartition, ReadOnlyPartition};
