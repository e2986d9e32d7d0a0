use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::prelude::{MetricKey, ModelId};
use crate::state::sort::{SortDirection, SortState};

/// One line of the trend chart. `None` points are gaps, not zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDataset {
    pub label: String,
    /// `None` for the actual series.
    pub model_id: Option<ModelId>,
    pub color: String,
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendView {
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<TrendDataset>,
}

/// Radar/bar entry for one selected model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeDataset {
    pub model_id: ModelId,
    pub label: String,
    pub color: String,
    /// Goodness scores in [0, 1], one per axis.
    pub normalized_vector: Vec<f64>,
    /// Raw metric values per axis, for tooltips.
    pub raw_values: Vec<Option<f64>>,
}

/// Comparative chart contents; an empty selection is its own state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ComparativeView {
    #[default]
    Empty,
    Populated {
        axes: Vec<MetricKey>,
        datasets: Vec<ComparativeDataset>,
    },
}

impl ComparativeView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ComparativeView::Empty)
    }

    pub fn datasets(&self) -> &[ComparativeDataset] {
        match self {
            ComparativeView::Empty => &[],
            ComparativeView::Populated { datasets, .. } => datasets,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortIndicator {
    None,
    Ascending,
    Descending,
}

impl SortIndicator {
    pub fn for_column(key: MetricKey, sort: &SortState) -> Self {
        if key != sort.key {
            return SortIndicator::None;
        }
        match sort.direction {
            SortDirection::Asc => SortIndicator::Ascending,
            SortDirection::Desc => SortIndicator::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub key: MetricKey,
    pub label: String,
    pub sort: SortIndicator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub metric_key: MetricKey,
    pub value: Option<f64>,
    pub display_value: String,
    pub is_best: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub model_id: ModelId,
    pub name: String,
    pub color: String,
    pub is_active: bool,
    pub cells: Vec<TableCell>,
    /// Column and direction this row was ordered by.
    pub sort_indicator: SortState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<TableRow>,
}

/// The three views produced by one synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub trend: TrendView,
    pub comparative: ComparativeView,
    pub table: TableView,
}

/// Descriptive card for one model, with the same best flags as the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCard {
    pub model_id: ModelId,
    pub name: String,
    pub color: String,
    pub technique: String,
    pub summary: Option<String>,
    pub best_for: Option<String>,
    pub watch_out: Option<String>,
    pub features: Vec<String>,
    pub metrics: Vec<TableCell>,
}
