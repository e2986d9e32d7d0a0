use anyhow::Context;
use chrono::{Days, NaiveDate};
use forecastcore::dataset::{DatasetDocument, DatasetInfo, ModelRecord, TimePoint};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How one synthetic model deviates from the actual series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticModel {
    pub id: String,
    pub name: String,
    pub color: String,
    pub technique: String,
    /// Constant offset added to every prediction.
    pub bias: f64,
    /// Half-width of the uniform prediction noise.
    pub noise: f64,
    /// Drop every n-th point to leave gaps in the series.
    pub skip_every: Option<usize>,
}

impl Default for SyntheticModel {
    fn default() -> Self {
        Self {
            id: "model".into(),
            name: "Model".into(),
            color: "#38bdf8".into(),
            technique: String::new(),
            bias: 0.0,
            noise: 0.5,
            skip_every: None,
        }
    }
}

/// Configuration for generating a synthetic comparison dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub points: usize,
    pub start: NaiveDate,
    pub base_price: f64,
    pub drift: f64,
    pub volatility: f64,
    pub seed: u64,
    pub models: Vec<SyntheticModel>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            points: 30,
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap_or_default(),
            base_price: 150.0,
            drift: 0.75,
            volatility: 0.8,
            seed: 312,
            models: default_models(),
        }
    }
}

fn default_models() -> Vec<SyntheticModel> {
    let model = |id: &str, name: &str, color: &str, technique: &str, bias: f64, noise: f64| {
        SyntheticModel {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            technique: technique.into(),
            bias,
            noise,
            skip_every: None,
        }
    };
    vec![
        model(
            "linear_regression",
            "Linear Regression",
            "#38bdf8",
            "Ordinary least squares on lagged features",
            -0.45,
            0.3,
        ),
        model(
            "random_forest",
            "Random Forest",
            "#c084fc",
            "500-tree ensemble with time-aware cross-validation",
            0.05,
            0.35,
        ),
        model(
            "xgboost",
            "XGBoost",
            "#fbbf24",
            "Gradient boosted trees (depth 4, 400 estimators)",
            0.2,
            0.3,
        ),
        model(
            "lstm",
            "LSTM Network",
            "#34d399",
            "Two-layer sequence model with dropout",
            0.6,
            0.4,
        ),
        SyntheticModel {
            skip_every: Some(7),
            ..model(
                "prophet",
                "Prophet",
                "#f472b6",
                "Additive model with changepoint priors",
                -0.3,
                0.25,
            )
        },
    ]
}

fn build_actual(config: &GeneratorConfig, rng: &mut StdRng) -> anyhow::Result<Vec<TimePoint>> {
    let mut price = config.base_price;
    (0..config.points.max(1))
        .map(|index| {
            let date = config
                .start
                .checked_add_days(Days::new(index as u64))
                .context("date overflow while generating actual series")?;
            if index > 0 {
                let shock = if config.volatility > 0.0 {
                    rng.gen_range(-config.volatility..config.volatility)
                } else {
                    0.0
                };
                price += config.drift + shock;
            }
            Ok(TimePoint::new(date, round_cents(price)))
        })
        .collect()
}

fn build_predictions(
    model: &SyntheticModel,
    actual: &[TimePoint],
    rng: &mut StdRng,
) -> Vec<TimePoint> {
    actual
        .iter()
        .enumerate()
        .filter(|(index, _)| match model.skip_every {
            Some(every) if every > 0 => (index + 1) % every != 0,
            _ => true,
        })
        .map(|(_, point)| {
            let jitter = if model.noise > 0.0 {
                rng.gen_range(-model.noise..model.noise)
            } else {
                0.0
            };
            TimePoint::new(point.timestamp, round_cents(point.value + model.bias + jitter))
        })
        .collect()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds a deterministic dataset document for the given seed.
pub fn build_document(config: &GeneratorConfig) -> anyhow::Result<DatasetDocument> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let actual = build_actual(config, &mut rng)?;
    let models = config
        .models
        .iter()
        .map(|model| ModelRecord {
            id: model.id.clone(),
            name: model.name.clone(),
            color: model.color.clone(),
            technique: model.technique.clone(),
            summary: None,
            best_for: None,
            watch_out: None,
            features: Vec::new(),
            predictions: build_predictions(model, &actual, &mut rng),
            metrics: None,
        })
        .collect();

    Ok(DatasetDocument {
        info: DatasetInfo {
            name: Some("Synthetic equity series".into()),
            horizon: Some(format!("{} trading days", actual.len())),
            frequency: Some("Daily close".into()),
            ..Default::default()
        },
        actual,
        models,
        analyst_insights: vec![format!(
            "Seed {} replays this series exactly; models differ only in bias and noise.",
            config.seed
        )],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_point_count() {
        let document = build_document(&GeneratorConfig::default()).unwrap();
        assert_eq!(document.actual.len(), 30);
        assert_eq!(document.models.len(), 5);
        assert_eq!(document.models[0].predictions.len(), 30);
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig {
            seed: 13,
            ..Default::default()
        };
        let first = build_document(&config).unwrap();
        let second = build_document(&config).unwrap();
        assert_eq!(first.actual, second.actual);
        assert_eq!(first.models[3].predictions, second.models[3].predictions);
    }

    #[test]
    fn skip_every_leaves_gaps() {
        let config = GeneratorConfig {
            points: 14,
            models: vec![SyntheticModel {
                skip_every: Some(7),
                ..Default::default()
            }],
            ..Default::default()
        };
        let document = build_document(&config).unwrap();
        assert_eq!(document.models[0].predictions.len(), 12);
    }
}
