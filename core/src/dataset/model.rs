use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::series::TimePoint;
use crate::prelude::{MetricKey, ModelId};
use crate::scoring::metrics::MetricSet;

/// Model entry as it appears in a dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: ModelId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, alias = "description")]
    pub technique: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub best_for: Option<String>,
    #[serde(default)]
    pub watch_out: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub predictions: Vec<TimePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<MetricKey, f64>>,
}

/// Descriptive text carried through to profile cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub summary: Option<String>,
    pub best_for: Option<String>,
    pub watch_out: Option<String>,
    pub features: Vec<String>,
}

/// Validated model with its predictions aligned to the actual series.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    pub color: String,
    pub technique: String,
    pub profile: ModelProfile,
    pub predictions: Vec<TimePoint>,
    /// One entry per actual timestamp; `None` marks a gap.
    pub aligned: Vec<Option<f64>>,
    /// Metrics shown to the user, resolved from the configured source.
    pub metrics: MetricSet,
}

impl Model {
    pub fn metric(&self, key: MetricKey) -> Option<f64> {
        self.metrics.get(key)
    }
}
