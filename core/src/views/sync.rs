use ndarray::Array2;

use crate::dataset::model::Model;
use crate::dataset::Dataset;
use crate::prelude::{MetricFamily, ViewSink};
use crate::scoring::normalize::{BestValues, MetricsNormalizer};
use crate::scoring::ranking::RankingComparator;
use crate::state::selection::SelectionState;
use crate::state::sort::SortState;
use crate::telemetry::log::LogManager;
use crate::views::format::format_metric;
use crate::views::model::{
    ColumnHeader, ComparativeDataset, ComparativeView, ProfileCard, SortIndicator, TableCell,
    TableRow, TableView, TrendDataset, TrendView, ViewSnapshot,
};

const ACTUAL_LABEL: &str = "Actual Price";
const ACTUAL_COLOR: &str = "#f8fafc";

/// Projects a dataset plus the current selection/sort into view models.
///
/// Normalized scores and best values depend only on the dataset, so they are
/// computed once here and reused by every synchronization.
pub struct ViewSynchronizer {
    family: MetricFamily,
    normalized: Array2<f64>,
    bests: BestValues,
    logger: LogManager,
}

impl ViewSynchronizer {
    pub fn new(dataset: &Dataset) -> Self {
        let family = dataset.family();
        Self {
            family,
            normalized: MetricsNormalizer::normalize_matrix(dataset.models(), family),
            bests: BestValues::from_models(dataset.models(), family),
            logger: LogManager::new("views"),
        }
    }

    /// Rebuilds all views in trend, comparative, table order and hands each
    /// to every sink as soon as it is built.
    pub fn synchronize(
        &self,
        dataset: &Dataset,
        selection: &SelectionState,
        sort: &SortState,
        sinks: &mut [Box<dyn ViewSink>],
    ) -> ViewSnapshot {
        let trend = self.trend_view(dataset, selection);
        for sink in sinks.iter_mut() {
            sink.publish_trend(&trend);
        }

        let comparative = self.comparative_view(dataset, selection);
        for sink in sinks.iter_mut() {
            sink.publish_comparative(&comparative);
        }

        let table = self.table_view(dataset, selection, sort);
        for sink in sinks.iter_mut() {
            sink.publish_table(&table);
        }

        self.logger.detail(&format!(
            "synchronized {} trend series, {} comparative entries, {} rows sorted by {} {:?}",
            trend.datasets.len(),
            comparative.datasets().len(),
            table.rows.len(),
            sort.key,
            sort.direction
        ));

        ViewSnapshot {
            trend,
            comparative,
            table,
        }
    }

    /// Actual series first, then selected models in input order.
    pub fn trend_view(&self, dataset: &Dataset, selection: &SelectionState) -> TrendView {
        let actual = dataset.actual();
        let mut datasets = Vec::with_capacity(selection.len() + 1);
        datasets.push(TrendDataset {
            label: ACTUAL_LABEL.to_string(),
            model_id: None,
            color: ACTUAL_COLOR.to_string(),
            points: actual.values().into_iter().map(Some).collect(),
        });
        datasets.extend(selected(dataset, selection).map(|(_, model)| TrendDataset {
            label: model.name.clone(),
            model_id: Some(model.id.clone()),
            color: model.color.clone(),
            points: model.aligned.clone(),
        }));

        TrendView {
            labels: actual.timestamps(),
            datasets,
        }
    }

    pub fn comparative_view(&self, dataset: &Dataset, selection: &SelectionState) -> ComparativeView {
        if selection.is_empty() {
            return ComparativeView::Empty;
        }
        let axes = self.family.keys().to_vec();
        let datasets = selected(dataset, selection)
            .map(|(row, model)| ComparativeDataset {
                model_id: model.id.clone(),
                label: model.name.clone(),
                color: model.color.clone(),
                normalized_vector: self.normalized.row(row).to_vec(),
                raw_values: axes.iter().map(|key| model.metric(*key)).collect(),
            })
            .collect();
        ComparativeView::Populated { axes, datasets }
    }

    /// Every model, ordered by the sort state; selection only marks rows.
    pub fn table_view(
        &self,
        dataset: &Dataset,
        selection: &SelectionState,
        sort: &SortState,
    ) -> TableView {
        let columns = self
            .family
            .keys()
            .into_iter()
            .map(|key| ColumnHeader {
                key,
                label: key.label().to_string(),
                sort: SortIndicator::for_column(key, sort),
            })
            .collect();

        let rows = RankingComparator::sorted(dataset.models(), sort)
            .into_iter()
            .map(|model| TableRow {
                model_id: model.id.clone(),
                name: model.name.clone(),
                color: model.color.clone(),
                is_active: selection.contains(&model.id),
                cells: self.cells(model),
                sort_indicator: *sort,
            })
            .collect();

        TableView { columns, rows }
    }

    pub fn profile_cards(&self, dataset: &Dataset) -> Vec<ProfileCard> {
        dataset
            .models()
            .iter()
            .map(|model| ProfileCard {
                model_id: model.id.clone(),
                name: model.name.clone(),
                color: model.color.clone(),
                technique: model.technique.clone(),
                summary: model.profile.summary.clone(),
                best_for: model.profile.best_for.clone(),
                watch_out: model.profile.watch_out.clone(),
                features: model.profile.features.clone(),
                metrics: self.cells(model),
            })
            .collect()
    }

    fn cells(&self, model: &Model) -> Vec<TableCell> {
        self.family
            .keys()
            .into_iter()
            .map(|key| {
                let value = model.metric(key);
                TableCell {
                    metric_key: key,
                    value,
                    display_value: format_metric(key, value),
                    is_best: self.bests.is_best(key, value),
                }
            })
            .collect()
    }
}

/// Selected models with their input-order row index.
fn selected<'a>(
    dataset: &'a Dataset,
    selection: &'a SelectionState,
) -> impl Iterator<Item = (usize, &'a Model)> + 'a {
    dataset
        .models()
        .iter()
        .enumerate()
        .filter(move |(_, model)| selection.contains(&model.id))
}
