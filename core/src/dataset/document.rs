use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dataset::model::{Model, ModelProfile, ModelRecord};
use crate::dataset::series::{ensure_well_formed, ActualSeries, TimePoint};
use crate::math::align::SeriesAligner;
use crate::prelude::{CoreError, CoreResult, MetricFamily, MetricKey, ModelId};
use crate::scoring::metrics::{MetricSet, MetricsCalculator};
use crate::scoring::normalize::best_tolerance;
use crate::telemetry::log::LogManager;

/// Which metric set is displayed; the other one is only cross-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricSource {
    #[default]
    Computed,
    Supplied,
}

/// Per-deployment scoring choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    pub family: MetricFamily,
    pub source: MetricSource,
}

/// Free-form dataset description passed through to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetInfo {
    pub name: Option<String>,
    pub period: Option<String>,
    pub horizon: Option<String>,
    pub frequency: Option<String>,
    pub feature_stack: Vec<String>,
    pub workflow: Vec<String>,
    pub insight_summary: Vec<String>,
    pub analyst_insights: Vec<String>,
}

/// Raw, unvalidated dataset as read from disk or generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(default, alias = "dataset")]
    pub info: DatasetInfo,
    pub actual: Vec<TimePoint>,
    pub models: Vec<ModelRecord>,
    /// Insights listed beside `dataset` rather than inside it; merged into
    /// `DatasetInfo::analyst_insights` when the dataset is built.
    #[serde(default, rename = "analystInsights", skip_serializing_if = "Vec::is_empty")]
    pub analyst_insights: Vec<String>,
}

impl DatasetDocument {
    pub fn from_json_str(contents: &str) -> CoreResult<Self> {
        serde_json::from_str(contents)
            .map_err(|err| CoreError::InvalidInput(format!("dataset document: {err}")))
    }
}

/// A displayed metric that disagrees with its cross-check value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub model_id: ModelId,
    pub key: MetricKey,
    pub shown: f64,
    pub reference: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub source: MetricSource,
    pub discrepancies: Vec<Discrepancy>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Validated dataset: immutable for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct Dataset {
    info: DatasetInfo,
    actual: ActualSeries,
    models: Vec<Model>,
    family: MetricFamily,
    consistency: ConsistencyReport,
}

impl Dataset {
    pub fn from_document(document: DatasetDocument, options: ScoringOptions) -> CoreResult<Self> {
        let logger = LogManager::new("dataset");
        let actual = ActualSeries::new(document.actual)?;
        if document.models.is_empty() {
            return Err(CoreError::InvalidInput("dataset contains no models".into()));
        }

        let mut seen = HashSet::new();
        let mut models = Vec::with_capacity(document.models.len());
        let mut discrepancies = Vec::new();

        for record in document.models {
            if record.id.trim().is_empty() {
                return Err(CoreError::InvalidInput("model with empty id".into()));
            }
            if !seen.insert(record.id.clone()) {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate model id `{}`",
                    record.id
                )));
            }
            ensure_well_formed(&record.predictions, &format!("model `{}`", record.id))?;

            let aligned = SeriesAligner::align(&record.predictions, actual.points());
            let (actual_values, predicted_values) = SeriesAligner::paired(&aligned, actual.points());
            if actual_values.is_empty() {
                return Err(CoreError::InvalidInput(format!(
                    "model `{}` shares no timestamps with the actual series",
                    record.id
                )));
            }

            let computed =
                MetricsCalculator::compute(&actual_values, &predicted_values, options.family)?;
            let supplied = match record.metrics.as_ref() {
                Some(values) => Some(MetricSet::from_supplied(values, options.family).map_err(
                    |err| CoreError::InvalidInput(format!("model `{}`: {err}", record.id)),
                )?),
                None => None,
            };

            let (shown, reference) = match (options.source, supplied) {
                (MetricSource::Computed, supplied) => (computed, supplied),
                (MetricSource::Supplied, Some(supplied)) => {
                    (supplied.filled_from(&computed), Some(computed))
                }
                (MetricSource::Supplied, None) => {
                    logger.caution(&format!(
                        "model `{}` has no supplied metrics, showing computed values",
                        record.id
                    ));
                    (computed, None)
                }
            };

            if let Some(reference) = reference.as_ref() {
                discrepancies.extend(cross_check(&record.id, &shown, reference, options.family));
            }

            models.push(Model {
                id: record.id,
                name: record.name,
                color: record.color,
                technique: record.technique,
                profile: ModelProfile {
                    summary: record.summary,
                    best_for: record.best_for,
                    watch_out: record.watch_out,
                    features: record.features,
                },
                predictions: record.predictions,
                aligned,
                metrics: shown,
            });
        }

        for discrepancy in &discrepancies {
            logger.caution(&format!(
                "model `{}` {}: shown {:.4} vs cross-check {:.4}",
                discrepancy.model_id, discrepancy.key, discrepancy.shown, discrepancy.reference
            ));
        }
        logger.record(&format!(
            "loaded {} models over {} points ({:?} family, {:?} metrics)",
            models.len(),
            actual.len(),
            options.family,
            options.source
        ));

        let mut info = document.info;
        info.analyst_insights.extend(document.analyst_insights);

        Ok(Self {
            info,
            actual,
            models,
            family: options.family,
            consistency: ConsistencyReport {
                source: options.source,
                discrepancies,
            },
        })
    }

    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    pub fn actual(&self) -> &ActualSeries {
        &self.actual
    }

    /// Models in input order.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn family(&self) -> MetricFamily {
        self.family
    }

    pub fn consistency(&self) -> &ConsistencyReport {
        &self.consistency
    }

    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        self.models.iter().map(|model| model.id.clone()).collect()
    }
}

fn cross_check(
    model_id: &str,
    shown: &MetricSet,
    reference: &MetricSet,
    family: MetricFamily,
) -> Vec<Discrepancy> {
    family
        .keys()
        .into_iter()
        .filter_map(|key| match (shown.get(key), reference.get(key)) {
            (Some(shown), Some(reference)) if (shown - reference).abs() > best_tolerance(key) => {
                Some(Discrepancy {
                    model_id: model_id.to_string(),
                    key,
                    shown,
                    reference,
                })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn record(id: &str, values: &[(u32, f64)]) -> ModelRecord {
        ModelRecord {
            id: id.into(),
            name: id.to_uppercase(),
            color: "#38bdf8".into(),
            technique: "test".into(),
            summary: None,
            best_for: None,
            watch_out: None,
            features: Vec::new(),
            predictions: values
                .iter()
                .map(|&(d, v)| TimePoint::new(day(d), v))
                .collect(),
            metrics: None,
        }
    }

    fn document(models: Vec<ModelRecord>) -> DatasetDocument {
        DatasetDocument {
            info: DatasetInfo::default(),
            actual: vec![
                TimePoint::new(day(1), 100.0),
                TimePoint::new(day(2), 110.0),
                TimePoint::new(day(3), 105.0),
            ],
            models,
            analyst_insights: Vec::new(),
        }
    }

    #[test]
    fn dataset_computes_metrics_and_alignment() {
        let doc = document(vec![record("a", &[(1, 100.0), (2, 108.0), (3, 107.0)])]);
        let dataset = Dataset::from_document(doc, ScoringOptions::default()).unwrap();
        let model = dataset.model("a").unwrap();
        assert_eq!(model.aligned, vec![Some(100.0), Some(108.0), Some(107.0)]);
        assert!((model.metric(MetricKey::Mae).unwrap() - 4.0 / 3.0).abs() < 1e-9);
        assert!(dataset.consistency().is_consistent());
    }

    #[test]
    fn dataset_rejects_duplicate_ids_and_disjoint_models() {
        let doc = document(vec![
            record("a", &[(1, 100.0)]),
            record("a", &[(2, 100.0)]),
        ]);
        assert!(Dataset::from_document(doc, ScoringOptions::default()).is_err());

        let doc = document(vec![record("late", &[(20, 100.0)])]);
        let err = Dataset::from_document(doc, ScoringOptions::default()).unwrap_err();
        assert!(err.to_string().contains("shares no timestamps"));
    }

    #[test]
    fn supplied_metrics_are_cross_checked_against_computed() {
        let mut model = record("a", &[(1, 100.0), (2, 108.0), (3, 107.0)]);
        model.metrics = Some(BTreeMap::from([
            (MetricKey::Mae, 9.0),
            (MetricKey::Rmse, 1.633),
        ]));
        let options = ScoringOptions {
            family: MetricFamily::Regression,
            source: MetricSource::Supplied,
        };
        let dataset = Dataset::from_document(document(vec![model]), options).unwrap();
        let shown = dataset.model("a").unwrap();
        assert_eq!(shown.metric(MetricKey::Mae), Some(9.0));
        // MAPE was not supplied, so the computed value fills the gap.
        assert!(shown.metric(MetricKey::Mape).is_some());

        let report = dataset.consistency();
        assert_eq!(report.discrepancies.len(), 1);
        assert_eq!(report.discrepancies[0].key, MetricKey::Mae);
    }

    #[test]
    fn document_parses_original_field_names() {
        let json = r##"{
            "dataset": { "name": "Synthetic", "featureStack": ["RSI"] },
            "actual": [{ "date": "2024-02-01", "price": 150.2 }],
            "models": [{
                "id": "lstm",
                "name": "LSTM",
                "color": "#34d399",
                "description": "Sequence model",
                "bestFor": "Swing trading",
                "metrics": { "MAE": 1.17, "R2": 0.988 },
                "predictions": [{ "date": "2024-02-01", "price": 150.6 }]
            }]
        }"##;
        let doc = DatasetDocument::from_json_str(json).unwrap();
        assert_eq!(doc.info.feature_stack, vec!["RSI".to_string()]);
        assert_eq!(doc.models[0].technique, "Sequence model");
        assert_eq!(doc.models[0].best_for.as_deref(), Some("Swing trading"));
        assert_eq!(
            doc.models[0].metrics.as_ref().unwrap().get(&MetricKey::R2),
            Some(&0.988)
        );
    }

    #[test]
    fn top_level_analyst_insights_reach_dataset_info() {
        let json = r##"{
            "dataset": { "name": "Synthetic", "analystInsights": ["Gaps follow holidays."] },
            "actual": [
                { "date": "2024-02-01", "price": 150.2 },
                { "date": "2024-02-02", "price": 151.0 }
            ],
            "models": [{
                "id": "rf",
                "name": "Random Forest",
                "color": "#c084fc",
                "predictions": [
                    { "date": "2024-02-01", "price": 150.0 },
                    { "date": "2024-02-02", "price": 151.4 }
                ]
            }],
            "analystInsights": ["Random Forest achieves the lowest MAE."]
        }"##;
        let doc = DatasetDocument::from_json_str(json).unwrap();
        assert_eq!(doc.analyst_insights.len(), 1);

        let dataset = Dataset::from_document(doc, ScoringOptions::default()).unwrap();
        assert_eq!(
            dataset.info().analyst_insights,
            vec![
                "Gaps follow holidays.".to_string(),
                "Random Forest achieves the lowest MAE.".to_string(),
            ]
        );
    }
}
