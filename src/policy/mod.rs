pub mod adaptive;
pub mod frequency;
pub mod recency;

pub use adaptive::{AdaptiveCache, DEFAULT_PROMOTION_THRESHOLD};
pub use frequency::FrequencyPartition;
pub use recency::RecencyPartition;
