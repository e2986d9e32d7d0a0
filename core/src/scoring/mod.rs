pub mod metrics;
pub mod normalize;
pub mod ranking;

pub use metrics::{MetricSet, MetricsCalculator};
pub use normalize::{best_tolerance, BestValues, MetricsNormalizer};
pub use ranking::RankingComparator;
