use forecastcore::views::{ComparativeView, TableView, TrendView};
use serde::{Deserialize, Serialize};

/// Latest views as published to the bridge. `revision` advances once per
/// completed synchronization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub revision: u64,
    pub trend: TrendView,
    pub comparative: ComparativeView,
    pub table: TableView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub model_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    pub model_id: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortRequest {
    pub key: String,
}

/// User events accepted by the bridge, one per POST route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Toggle { model_id: String },
    Select { model_id: String, active: bool },
    Sort { key: String },
    ToggleAll,
    SelectAll,
    SelectNone,
    Reset,
}
