use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::math::stats::StatsHelper;
use crate::prelude::{CoreError, CoreResult, MetricFamily, MetricKey};

/// Below this total sum of squares the actual series counts as constant.
const ZERO_VARIANCE: f64 = 1e-12;

/// Metric values keyed by metric. `None` records an undefined metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: BTreeMap<MetricKey, Option<f64>>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: MetricKey) -> Option<f64> {
        self.values.get(&key).copied().flatten()
    }

    pub fn contains(&self, key: MetricKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn insert(&mut self, key: MetricKey, value: Option<f64>) {
        self.values.insert(key, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, Option<f64>)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }

    /// Keeps the supplied values that belong to `family`.
    pub fn from_supplied(values: &BTreeMap<MetricKey, f64>, family: MetricFamily) -> CoreResult<Self> {
        let mut set = Self::new();
        for key in family.keys() {
            if let Some(&value) = values.get(&key) {
                if !value.is_finite() {
                    return Err(CoreError::InvalidInput(format!(
                        "supplied {key} is not finite"
                    )));
                }
                set.insert(key, Some(value));
            }
        }
        Ok(set)
    }

    /// Fills every key missing here with the value from `fallback`.
    pub fn filled_from(mut self, fallback: &MetricSet) -> Self {
        for (key, value) in fallback.iter() {
            self.values.entry(key).or_insert(value);
        }
        self
    }
}

/// Stateless per-model accuracy scoring.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Scores index-aligned `actual`/`predicted` pairs for one model.
    pub fn compute(actual: &[f64], predicted: &[f64], family: MetricFamily) -> CoreResult<MetricSet> {
        if actual.len() != predicted.len() {
            return Err(CoreError::LengthMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }

        let mut set = MetricSet::new();
        set.insert(MetricKey::Mae, Some(Self::mae(actual, predicted)));
        set.insert(MetricKey::Rmse, Some(Self::rmse(actual, predicted)));
        set.insert(MetricKey::Mape, Some(Self::mape(actual, predicted)));
        match family {
            MetricFamily::Regression => {
                set.insert(MetricKey::R2, Self::r_squared(actual, predicted));
            }
            MetricFamily::Directional => {
                set.insert(
                    MetricKey::DirectionalAccuracy,
                    Some(Self::directional_accuracy(actual, predicted)),
                );
            }
        }
        Ok(set)
    }

    pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
        let errors: Vec<f64> = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (p - a).abs())
            .collect();
        StatsHelper::mean(&errors)
    }

    pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
        let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| p - a).collect();
        StatsHelper::rms(&errors)
    }

    /// Percentage error; points with a zero actual contribute 0 but still
    /// count toward the mean.
    pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
        let ratios: Vec<f64> = actual
            .iter()
            .zip(predicted)
            .map(|(&a, &p)| if a != 0.0 { ((p - a) / a).abs() } else { 0.0 })
            .collect();
        StatsHelper::mean(&ratios) * 100.0
    }

    /// Coefficient of determination. A constant actual series yields 1 when
    /// the predictions reproduce it exactly and `None` otherwise.
    pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Option<f64> {
        if actual.is_empty() {
            return None;
        }
        let ss_res: f64 = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        let ss_tot = StatsHelper::total_sum_of_squares(actual);

        if ss_tot < ZERO_VARIANCE {
            let exact = actual.iter().zip(predicted).all(|(a, p)| a == p);
            return exact.then_some(1.0);
        }
        Some(1.0 - ss_res / ss_tot)
    }

    /// Share of consecutive steps where predicted and actual moves agree in
    /// sign. Fewer than two points gives 0.
    pub fn directional_accuracy(actual: &[f64], predicted: &[f64]) -> f64 {
        let comparisons = actual.len().min(predicted.len()).saturating_sub(1);
        if comparisons == 0 {
            return 0.0;
        }
        let hits = (1..=comparisons)
            .filter(|&i| {
                step_sign(actual[i] - actual[i - 1]) == step_sign(predicted[i] - predicted[i - 1])
            })
            .count();
        hits as f64 / comparisons as f64
    }
}

fn step_sign(change: f64) -> i8 {
    if change > 0.0 {
        1
    } else if change < 0.0 {
        -1
    } else {
        0
    }
}
