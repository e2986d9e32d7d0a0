use anyhow::Context;
use forecastcore::dataset::{DatasetDocument, MetricSource, ScoringOptions};
use forecastcore::prelude::{MetricFamily, MetricKey};
use forecastcore::views::DashboardOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::profile::GeneratorConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub family: MetricFamily,
    pub metric_source: MetricSource,
    pub default_selection: usize,
    pub initial_sort: Option<MetricKey>,
    pub port: u16,
    pub dataset: Option<PathBuf>,
    pub generator: GeneratorConfig,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            family: MetricFamily::default(),
            metric_source: MetricSource::default(),
            default_selection: 3,
            initial_sort: None,
            port: 9000,
            dataset: None,
            generator: GeneratorConfig::default(),
        }
    }
}

impl WorkbenchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workbench config {}", path_ref.display()))?;
        let config: WorkbenchConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workbench config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(family: MetricFamily, default_selection: usize) -> Self {
        Self {
            family,
            default_selection,
            ..Default::default()
        }
    }

    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions {
            family: self.family,
            source: self.metric_source,
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            default_selection: self.default_selection,
            initial_sort: self.initial_sort,
        }
    }
}

/// Reads a dataset document; `.yaml`/`.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> anyhow::Result<DatasetDocument> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading dataset {}", path_ref.display()))?;
    let is_yaml = matches!(
        path_ref.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing dataset {}", path_ref.display()))
    } else {
        DatasetDocument::from_json_str(&contents)
            .with_context(|| format!("parsing dataset {}", path_ref.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn config_from_args_produces_options() {
        let cfg = WorkbenchConfig::from_args(MetricFamily::Directional, 2);
        assert_eq!(cfg.scoring_options().family, MetricFamily::Directional);
        assert_eq!(cfg.dashboard_options().default_selection, 2);
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"family: directional\nmetric_source: supplied\ninitial_sort: MAE\ngenerator:\n  points: 12\n  seed: 7\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkbenchConfig::load(&path).unwrap();
        assert_eq!(cfg.family, MetricFamily::Directional);
        assert_eq!(cfg.metric_source, MetricSource::Supplied);
        assert_eq!(cfg.initial_sort, Some(MetricKey::Mae));
        assert_eq!(cfg.generator.points, 12);
        assert_eq!(cfg.default_selection, 3);
    }

    #[test]
    fn dataset_loader_picks_parser_by_extension() {
        let mut temp = Builder::new().suffix(".yaml").tempfile().unwrap();
        temp.write_all(
            b"actual:\n  - { date: 2023-01-01, price: 150 }\nmodels:\n  - id: lr\n    name: Linear Regression\n    predictions:\n      - { date: 2023-01-01, price: 149 }\n",
        )
        .unwrap();
        let document = load_dataset(temp.path()).unwrap();
        assert_eq!(document.models[0].id, "lr");
        assert_eq!(document.actual[0].value, 150.0);
    }

    #[test]
    fn dataset_loader_reports_path_on_failure() {
        let mut temp = Builder::new().suffix(".json").tempfile().unwrap();
        temp.write_all(b"{ not json").unwrap();
        let err = load_dataset(temp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing dataset"));
    }
}
