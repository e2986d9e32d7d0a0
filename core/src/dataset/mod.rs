pub mod document;
pub mod model;
pub mod series;

pub use document::{
    ConsistencyReport, Dataset, DatasetDocument, DatasetInfo, Discrepancy, MetricSource,
    ScoringOptions,
};
pub use model::{Model, ModelProfile, ModelRecord};
pub use series::{ActualSeries, TimePoint};
