//! Core scoring and view-synchronization pipeline for the forecast workbench.
//!
//! Prediction series are aligned to the actual series, scored once per model,
//! normalized across models, and projected into trend, comparative and table
//! view models whenever the selection or sort state changes.

pub mod dataset;
pub mod math;
pub mod prelude;
pub mod scoring;
pub mod state;
pub mod telemetry;
pub mod views;

pub use dataset::{Dataset, DatasetDocument};
pub use prelude::{CoreError, CoreResult, MetricFamily, MetricKey, ViewSink};
pub use views::{Dashboard, ViewSnapshot};
