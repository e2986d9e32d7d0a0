use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::views::model::{ComparativeView, TableView, TrendView};

/// Identifier of a model as supplied by the dataset.
pub type ModelId = String;

/// Accuracy metrics understood by the scoring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "MAE")]
    Mae,
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "MAPE")]
    Mape,
    #[serde(rename = "R2")]
    R2,
    #[serde(rename = "DirectionalAccuracy")]
    DirectionalAccuracy,
}

/// Which end of a metric's scale is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricDirection {
    Min,
    Max,
}

impl MetricKey {
    pub const ALL: [MetricKey; 5] = [
        MetricKey::Mae,
        MetricKey::Rmse,
        MetricKey::Mape,
        MetricKey::R2,
        MetricKey::DirectionalAccuracy,
    ];

    pub fn direction(self) -> MetricDirection {
        match self {
            MetricKey::Mae | MetricKey::Rmse | MetricKey::Mape => MetricDirection::Min,
            MetricKey::R2 | MetricKey::DirectionalAccuracy => MetricDirection::Max,
        }
    }

    /// Short identifier used on the wire and in reports.
    pub fn code(self) -> &'static str {
        match self {
            MetricKey::Mae => "MAE",
            MetricKey::Rmse => "RMSE",
            MetricKey::Mape => "MAPE",
            MetricKey::R2 => "R2",
            MetricKey::DirectionalAccuracy => "DirectionalAccuracy",
        }
    }

    /// Column/axis label with the preferred direction marker.
    pub fn label(self) -> &'static str {
        match self {
            MetricKey::Mae => "MAE ↓",
            MetricKey::Rmse => "RMSE ↓",
            MetricKey::Mape => "MAPE ↓",
            MetricKey::R2 => "R² ↑",
            MetricKey::DirectionalAccuracy => "Directional ↑",
        }
    }

    /// Metrics confined to [0, 1].
    pub fn is_bounded(self) -> bool {
        matches!(self, MetricKey::R2 | MetricKey::DirectionalAccuracy)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MetricKey {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mae" => Ok(MetricKey::Mae),
            "rmse" => Ok(MetricKey::Rmse),
            "mape" => Ok(MetricKey::Mape),
            "r2" | "r²" => Ok(MetricKey::R2),
            "directionalaccuracy" | "directional_accuracy" | "directional" | "da" => {
                Ok(MetricKey::DirectionalAccuracy)
            }
            other => Err(CoreError::UnknownMetric(other.to_string())),
        }
    }
}

/// The metric set a deployment scores with. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricFamily {
    #[default]
    Regression,
    Directional,
}

impl MetricFamily {
    /// Fixed axis/column order for the family.
    pub fn keys(self) -> [MetricKey; 4] {
        match self {
            MetricFamily::Regression => [
                MetricKey::Mae,
                MetricKey::Rmse,
                MetricKey::Mape,
                MetricKey::R2,
            ],
            MetricFamily::Directional => [
                MetricKey::Mae,
                MetricKey::Rmse,
                MetricKey::Mape,
                MetricKey::DirectionalAccuracy,
            ],
        }
    }

    pub fn contains(self, key: MetricKey) -> bool {
        self.keys().contains(&key)
    }

    /// The family-specific fourth axis, also the default sort key.
    pub fn headline(self) -> MetricKey {
        self.keys()[3]
    }
}

impl FromStr for MetricFamily {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regression" | "r2" => Ok(MetricFamily::Regression),
            "directional" | "direction" => Ok(MetricFamily::Directional),
            other => Err(CoreError::InvalidInput(format!(
                "unknown metric family `{other}`"
            ))),
        }
    }
}

/// Common error type for the scoring and state pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown model id: {0}")]
    InvalidModelId(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("length mismatch: {actual} actual values vs {predicted} predictions")]
    LengthMismatch { actual: usize, predicted: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Rendering collaborator that receives synchronized views.
///
/// Views arrive in a fixed order per synchronization: trend, comparative,
/// then table.
pub trait ViewSink: Send + Sync {
    fn publish_trend(&mut self, view: &TrendView);
    fn publish_comparative(&mut self, view: &ComparativeView);
    fn publish_table(&mut self, view: &TableView);
}
