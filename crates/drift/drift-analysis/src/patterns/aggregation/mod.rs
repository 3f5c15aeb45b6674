//! Match aggregation: per-file `PatternMatchResult`s rolled up into
//! per-pattern statistics, scorer inputs and location/outlier lists.

pub mod grouper;
pub mod similarity;

pub use grouper::{MatchAggregator, PatternStats};
pub use similarity::jaccard_similarity;
