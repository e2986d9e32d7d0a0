pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean; an empty slice averages to zero.
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    /// Sum of squared deviations from the mean.
    pub fn total_sum_of_squares(samples: &[f64]) -> f64 {
        let mean = Self::mean(samples);
        samples.iter().map(|&v| (v - mean).powi(2)).sum()
    }

    /// Minimum and maximum of the finite values, if any.
    pub fn min_max<I>(values: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
