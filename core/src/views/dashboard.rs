use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::prelude::{CoreError, CoreResult, MetricKey, ViewSink};
use crate::state::selection::{SelectionState, SelectionStore};
use crate::state::sort::SortState;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{SyncCounters, SyncRecorder};
use crate::views::model::{
    ComparativeView, ProfileCard, TableRow, TrendDataset, ViewSnapshot,
};
use crate::views::sync::ViewSynchronizer;

/// The mutable half of a session: which models are on and how the table sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub selection: SelectionState,
    pub sort: SortState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    /// Number of leading models selected initially and on reset.
    pub default_selection: usize,
    /// Initial sort column; the family headline metric when unset.
    pub initial_sort: Option<MetricKey>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            default_selection: 3,
            initial_sort: None,
        }
    }
}

/// Orchestrator owning the only mutable view state.
///
/// Each accepted event replaces the state and triggers exactly one
/// synchronization; rejected events leave state and views untouched.
pub struct Dashboard {
    dataset: Dataset,
    store: SelectionStore,
    synchronizer: ViewSynchronizer,
    state: ViewState,
    snapshot: ViewSnapshot,
    sinks: Vec<Box<dyn ViewSink>>,
    recorder: SyncRecorder,
    logger: LogManager,
}

impl Dashboard {
    pub fn new(dataset: Dataset, options: DashboardOptions) -> CoreResult<Self> {
        let family = dataset.family();
        let sort = match options.initial_sort {
            Some(key) if !family.contains(key) => {
                return Err(CoreError::UnknownMetric(key.to_string()))
            }
            Some(key) => SortState::for_key(key),
            None => SortState::initial(family),
        };

        let store = SelectionStore::new(dataset.model_ids(), options.default_selection);
        let synchronizer = ViewSynchronizer::new(&dataset);
        let state = ViewState {
            selection: store.initial(),
            sort,
        };
        let snapshot = synchronizer.synchronize(&dataset, &state.selection, &state.sort, &mut []);
        let recorder = SyncRecorder::new();
        recorder.record_sync();

        Ok(Self {
            dataset,
            store,
            synchronizer,
            state,
            snapshot,
            sinks: Vec::new(),
            recorder,
            logger: LogManager::new("dashboard"),
        })
    }

    /// Registers a sink and replays the current views to it.
    pub fn attach(&mut self, mut sink: Box<dyn ViewSink>) {
        sink.publish_trend(&self.snapshot.trend);
        sink.publish_comparative(&self.snapshot.comparative);
        sink.publish_table(&self.snapshot.table);
        self.sinks.push(sink);
    }

    pub fn toggle(&mut self, id: &str) -> CoreResult<&ViewSnapshot> {
        let next = self.store.toggle(&self.state.selection, id);
        self.apply_selection("toggle", next)
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> CoreResult<&ViewSnapshot> {
        let next = self.store.set_active(&self.state.selection, id, active);
        self.apply_selection("set_active", next)
    }

    pub fn select_all(&mut self) -> &ViewSnapshot {
        let next = self.store.select_all();
        self.commit_selection("select_all", next)
    }

    pub fn select_none(&mut self) -> &ViewSnapshot {
        let next = self.store.select_none();
        self.commit_selection("select_none", next)
    }

    pub fn toggle_all(&mut self) -> &ViewSnapshot {
        let next = self.store.toggle_all(&self.state.selection);
        self.commit_selection("toggle_all", next)
    }

    pub fn reset(&mut self) -> &ViewSnapshot {
        let next = self.store.reset();
        self.commit_selection("reset", next)
    }

    pub fn click_sort(&mut self, key: MetricKey) -> CoreResult<&ViewSnapshot> {
        match self.state.sort.click(key, self.dataset.family()) {
            Ok(sort) => {
                self.logger
                    .detail(&format!("sort -> {} {:?}", sort.key, sort.direction));
                self.state.sort = sort;
                self.resync();
                Ok(&self.snapshot)
            }
            Err(err) => Err(self.reject("click_sort", err)),
        }
    }

    /// Header click by wire code (`"MAE"`, `"r2"`, ...). An unparseable code
    /// is rejected like any other invalid event.
    pub fn click_sort_code(&mut self, code: &str) -> CoreResult<&ViewSnapshot> {
        match code.parse::<MetricKey>() {
            Ok(key) => self.click_sort(key),
            Err(err) => Err(self.reject("click_sort", err)),
        }
    }

    pub fn trend_datasets(&self) -> &[TrendDataset] {
        &self.snapshot.trend.datasets
    }

    pub fn comparative_datasets(&self) -> &ComparativeView {
        &self.snapshot.comparative
    }

    pub fn table_rows(&self) -> &[TableRow] {
        &self.snapshot.table.rows
    }

    pub fn snapshot(&self) -> &ViewSnapshot {
        &self.snapshot
    }

    pub fn profile_cards(&self) -> Vec<ProfileCard> {
        self.synchronizer.profile_cards(&self.dataset)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn counters(&self) -> SyncCounters {
        self.recorder.snapshot()
    }

    fn apply_selection(
        &mut self,
        event: &str,
        next: CoreResult<SelectionState>,
    ) -> CoreResult<&ViewSnapshot> {
        match next {
            Ok(selection) => Ok(self.commit_selection(event, selection)),
            Err(err) => Err(self.reject(event, err)),
        }
    }

    fn commit_selection(&mut self, event: &str, selection: SelectionState) -> &ViewSnapshot {
        self.logger.detail(&format!(
            "{event}: {} of {} models active",
            selection.len(),
            self.store.known().len()
        ));
        self.state.selection = selection;
        self.resync();
        &self.snapshot
    }

    fn resync(&mut self) {
        self.snapshot = self.synchronizer.synchronize(
            &self.dataset,
            &self.state.selection,
            &self.state.sort,
            &mut self.sinks,
        );
        self.recorder.record_sync();
    }

    fn reject(&self, event: &str, err: CoreError) -> CoreError {
        self.recorder.record_rejected();
        self.logger.caution(&format!("{event} rejected: {err}"));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetDocument, DatasetInfo, ModelRecord, ScoringOptions, TimePoint};
    use crate::views::model::{TableView, TrendView};
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn model(id: &str, values: &[f64]) -> ModelRecord {
        ModelRecord {
            id: id.into(),
            name: id.to_uppercase(),
            color: "#a855f7".into(),
            technique: String::new(),
            summary: None,
            best_for: None,
            watch_out: None,
            features: Vec::new(),
            predictions: values
                .iter()
                .enumerate()
                .map(|(i, &v)| TimePoint::new(day(i as u32 + 1), v))
                .collect(),
            metrics: None,
        }
    }

    fn dashboard() -> Dashboard {
        let document = DatasetDocument {
            info: DatasetInfo::default(),
            actual: [150.0, 153.0, 148.0, 160.0]
                .iter()
                .enumerate()
                .map(|(i, &v)| TimePoint::new(day(i as u32 + 1), v))
                .collect(),
            models: vec![
                model("lr", &[149.0, 154.0, 150.0, 158.0]),
                model("rf", &[151.0, 152.0, 149.0, 162.0]),
                // Same absolute errors as `lr`, so MAE ties.
                model("twin", &[151.0, 152.0, 146.0, 162.0]),
                model("gappy", &[150.0, 153.0]),
            ],
            analyst_insights: Vec::new(),
        };
        let dataset = Dataset::from_document(document, ScoringOptions::default()).unwrap();
        Dashboard::new(dataset, DashboardOptions::default()).unwrap()
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        events: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ViewSink for RecordingSink {
        fn publish_trend(&mut self, _view: &TrendView) {
            self.events.lock().unwrap().push("trend");
        }

        fn publish_comparative(&mut self, _view: &ComparativeView) {
            self.events.lock().unwrap().push("comparative");
        }

        fn publish_table(&mut self, _view: &TableView) {
            self.events.lock().unwrap().push("table");
        }
    }

    #[test]
    fn initial_views_show_default_selection() {
        let dash = dashboard();
        let labels: Vec<&str> = dash
            .trend_datasets()
            .iter()
            .map(|d| d.label.as_str())
            .collect();
        assert_eq!(labels, ["Actual Price", "LR", "RF", "TWIN"]);
        assert_eq!(dash.comparative_datasets().datasets().len(), 3);
        assert_eq!(dash.table_rows().len(), 4);
        assert_eq!(dash.counters().syncs, 1);
    }

    #[test]
    fn empty_selection_yields_empty_marker_and_actual_only() {
        let mut dash = dashboard();
        dash.select_none();
        assert!(dash.comparative_datasets().is_empty());
        assert_eq!(dash.trend_datasets().len(), 1);
        assert!(dash.trend_datasets()[0].model_id.is_none());
        // The table never filters by selection.
        assert_eq!(dash.table_rows().len(), 4);
        assert!(dash.table_rows().iter().all(|row| !row.is_active));
    }

    #[test]
    fn trend_keeps_input_order_and_gaps() {
        let mut dash = dashboard();
        dash.select_all();
        let gappy = dash.trend_datasets().last().unwrap();
        assert_eq!(gappy.model_id.as_deref(), Some("gappy"));
        assert_eq!(gappy.points, vec![Some(150.0), Some(153.0), None, None]);
    }

    #[test]
    fn each_accepted_event_syncs_once_and_rejections_do_not() {
        let mut dash = dashboard();
        dash.toggle("lr").unwrap();
        dash.toggle_all();
        dash.reset();
        dash.click_sort(MetricKey::Mae).unwrap();
        assert_eq!(dash.counters().syncs, 5);

        let before = dash.snapshot().clone();
        assert_eq!(
            dash.toggle("arima").unwrap_err(),
            CoreError::InvalidModelId("arima".into())
        );
        assert!(dash.click_sort(MetricKey::DirectionalAccuracy).is_err());
        assert_eq!(dash.counters().syncs, 5);
        assert_eq!(dash.counters().rejected, 2);
        assert_eq!(dash.snapshot(), &before);
    }

    #[test]
    fn sinks_receive_views_in_fixed_order() {
        let mut dash = dashboard();
        let sink = RecordingSink::default();
        let events = sink.events.clone();
        dash.attach(Box::new(sink));
        dash.toggle("rf").unwrap();
        assert_eq!(
            *events.lock().unwrap(),
            ["trend", "comparative", "table", "trend", "comparative", "table"]
        );
    }

    #[test]
    fn tied_mae_rows_keep_input_order() {
        let mut dash = dashboard();
        dash.click_sort(MetricKey::Mae).unwrap();
        let order: Vec<&str> = dash
            .table_rows()
            .iter()
            .map(|row| row.model_id.as_str())
            .collect();
        let lr = order.iter().position(|id| *id == "lr").unwrap();
        let twin = order.iter().position(|id| *id == "twin").unwrap();
        assert!(lr < twin);
        assert_eq!(dash.table_rows()[0].sort_indicator, dash.state().sort);
    }

    #[test]
    fn synchronization_is_idempotent() {
        let mut dash = dashboard();
        let first = dash.toggle_all().clone();
        let second = dash.toggle_all().clone();
        let third = dash.toggle_all().clone();
        assert_ne!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn best_cells_are_flagged_per_column() {
        let dash = dashboard();
        for (column, header) in dash.snapshot().table.columns.iter().enumerate() {
            let flagged = dash
                .table_rows()
                .iter()
                .filter(|row| row.cells[column].is_best)
                .count();
            assert!(flagged >= 1, "no best cell for {}", header.key);
        }
    }

    #[test]
    fn unparseable_sort_code_is_counted_as_rejected() {
        let mut dash = dashboard();
        assert_eq!(
            dash.click_sort_code("sharpe").unwrap_err(),
            CoreError::UnknownMetric("sharpe".into())
        );
        assert_eq!(dash.counters().rejected, 1);
        assert_eq!(dash.counters().syncs, 1);

        dash.click_sort_code("mae").unwrap();
        assert_eq!(dash.state().sort.key, MetricKey::Mae);
        assert_eq!(dash.counters().syncs, 2);
    }

    #[test]
    fn profile_cards_share_best_flags_with_table() {
        let mut dash = dashboard();
        dash.click_sort(MetricKey::Mae).unwrap();
        let cards = dash.profile_cards();
        let ids: Vec<&str> = cards.iter().map(|card| card.model_id.as_str()).collect();
        assert_eq!(ids, vec!["lr", "rf", "twin", "gappy"]);

        for card in &cards {
            let row = dash
                .table_rows()
                .iter()
                .find(|row| row.model_id == card.model_id)
                .unwrap();
            assert_eq!(card.metrics, row.cells, "cells differ for {}", card.model_id);
        }
        assert!(cards
            .iter()
            .any(|card| card.metrics.iter().any(|cell| cell.is_best)));
    }

    #[test]
    fn unknown_initial_sort_is_rejected() {
        let document = DatasetDocument {
            info: DatasetInfo::default(),
            actual: vec![TimePoint::new(day(1), 1.0)],
            models: vec![model("a", &[1.0])],
            analyst_insights: Vec::new(),
        };
        let dataset = Dataset::from_document(document, ScoringOptions::default()).unwrap();
        let options = DashboardOptions {
            default_selection: 1,
            initial_sort: Some(MetricKey::DirectionalAccuracy),
        };
        assert!(Dashboard::new(dataset, options).is_err());
    }
}
