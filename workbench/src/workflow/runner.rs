use crate::workflow::config::WorkbenchConfig;
use anyhow::Context;
use forecastcore::dataset::{ConsistencyReport, Dataset, DatasetDocument};
use forecastcore::views::{ColumnHeader, Dashboard, SortIndicator, TableView, ViewSnapshot};
use std::fmt::Write as _;

pub struct ComparisonResult {
    pub snapshot: ViewSnapshot,
    pub consistency: ConsistencyReport,
    pub model_count: usize,
    pub point_count: usize,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkbenchConfig,
}

impl Runner {
    pub fn new(config: WorkbenchConfig) -> Self {
        Self { config }
    }

    /// Validates the document and builds a dashboard in its initial state.
    pub fn prepare(&self, document: DatasetDocument) -> anyhow::Result<Dashboard> {
        let dataset = Dataset::from_document(document, self.config.scoring_options())
            .context("validating dataset")?;
        Dashboard::new(dataset, self.config.dashboard_options()).context("building dashboard")
    }

    pub fn execute(&self, document: DatasetDocument) -> anyhow::Result<ComparisonResult> {
        let dashboard = self.prepare(document)?;
        let dataset = dashboard.dataset();
        Ok(ComparisonResult {
            snapshot: dashboard.snapshot().clone(),
            consistency: dataset.consistency().clone(),
            model_count: dataset.models().len(),
            point_count: dataset.actual().len(),
        })
    }
}

/// Plain-text rendering of the metrics table. `>` marks active rows and `*`
/// marks best cells.
pub fn render_table(table: &TableView) -> String {
    let mut out = String::new();
    let _ = write!(out, "  {:<22}", "Model");
    for column in &table.columns {
        let _ = write!(out, "{:>16}", column_title(column));
    }
    out.push('\n');

    for row in &table.rows {
        let marker = if row.is_active { '>' } else { ' ' };
        let _ = write!(out, "{marker} {:<22}", row.name);
        for cell in &row.cells {
            let best = if cell.is_best { "*" } else { " " };
            let _ = write!(out, "{:>15}{best}", cell.display_value);
        }
        out.push('\n');
    }
    out
}

fn column_title(column: &ColumnHeader) -> String {
    match column.sort {
        SortIndicator::None => column.label.clone(),
        SortIndicator::Ascending => format!("{} (asc)", column.key),
        SortIndicator::Descending => format!("{} (desc)", column.key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_document, GeneratorConfig};
    use forecastcore::prelude::MetricFamily;

    #[test]
    fn runner_scores_synthetic_dataset() {
        let cfg = WorkbenchConfig::from_args(MetricFamily::Regression, 3);
        let runner = Runner::new(cfg);
        let document = build_document(&GeneratorConfig::default()).unwrap();
        let result = runner.execute(document).unwrap();
        assert_eq!(result.model_count, 5);
        assert_eq!(result.point_count, 30);
        assert_eq!(result.snapshot.table.rows.len(), 5);
        // Actual series plus the three default selections.
        assert_eq!(result.snapshot.trend.datasets.len(), 4);
    }

    #[test]
    fn rendered_table_lists_every_model() {
        let runner = Runner::new(WorkbenchConfig::default());
        let document = build_document(&GeneratorConfig::default()).unwrap();
        let result = runner.execute(document).unwrap();
        let text = render_table(&result.snapshot.table);
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("R2 (desc)"));
        assert!(text.contains('*'));
    }
}
