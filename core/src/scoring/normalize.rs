use ndarray::Array2;
use std::collections::BTreeMap;

use crate::dataset::model::Model;
use crate::math::stats::StatsHelper;
use crate::prelude::{MetricDirection, MetricFamily, MetricKey};

/// Ranges narrower than this are treated as a tie across all models.
pub const DEGENERATE_RANGE_EPSILON: f64 = 1e-9;

/// Highlight tolerance: tight for [0, 1] metrics, loose for error metrics.
pub fn best_tolerance(key: MetricKey) -> f64 {
    if key.is_bounded() {
        0.0005
    } else {
        0.01
    }
}

/// Min-max rescaling of one metric across models into a [0, 1] goodness score.
pub struct MetricsNormalizer;

impl MetricsNormalizer {
    /// One score per input value, 1 being the best model. Undefined values
    /// take no part in the range and score 0.
    pub fn normalize(values: &[Option<f64>], direction: MetricDirection) -> Vec<f64> {
        let Some((min, max)) = StatsHelper::min_max(values.iter().flatten().copied()) else {
            return vec![0.0; values.len()];
        };
        let span = max - min;

        values
            .iter()
            .map(|value| match value {
                None => 0.0,
                Some(_) if span < DEGENERATE_RANGE_EPSILON => 1.0,
                Some(v) => {
                    let score = match direction {
                        MetricDirection::Max => (v - min) / span,
                        MetricDirection::Min => (max - v) / span,
                    };
                    score.clamp(0.0, 1.0)
                }
            })
            .collect()
    }

    /// Models x family-keys matrix of normalized scores, rows in input order.
    pub fn normalize_matrix(models: &[Model], family: MetricFamily) -> Array2<f64> {
        let keys = family.keys();
        let mut matrix = Array2::<f64>::zeros((models.len(), keys.len()));
        for (col, key) in keys.iter().enumerate() {
            let values: Vec<Option<f64>> = models.iter().map(|model| model.metric(*key)).collect();
            let scores = Self::normalize(&values, key.direction());
            for (row, score) in scores.into_iter().enumerate() {
                matrix[[row, col]] = score;
            }
        }
        matrix
    }
}

/// Best value per metric across every model, used for cell highlighting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestValues {
    values: BTreeMap<MetricKey, Option<f64>>,
}

impl BestValues {
    pub fn from_models(models: &[Model], family: MetricFamily) -> Self {
        let values = family
            .keys()
            .into_iter()
            .map(|key| {
                let best = Self::best(models.iter().map(|model| model.metric(key)), key.direction());
                (key, best)
            })
            .collect();
        Self { values }
    }

    /// Max for `Max` metrics, min for `Min` metrics, over defined values.
    pub fn best<I>(values: I, direction: MetricDirection) -> Option<f64>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let (min, max) = StatsHelper::min_max(values.into_iter().flatten())?;
        Some(match direction {
            MetricDirection::Max => max,
            MetricDirection::Min => min,
        })
    }

    pub fn get(&self, key: MetricKey) -> Option<f64> {
        self.values.get(&key).copied().flatten()
    }

    pub fn is_best(&self, key: MetricKey, value: Option<f64>) -> bool {
        match (value, self.get(key)) {
            (Some(value), Some(best)) => (value - best).abs() <= best_tolerance(key),
            _ => false,
        }
    }
}
