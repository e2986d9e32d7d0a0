use chrono::NaiveDate;
use std::collections::HashMap;

use crate::dataset::series::TimePoint;

/// Maps prediction series onto a reference timestamp grid.
pub struct SeriesAligner;

impl SeriesAligner {
    /// One entry per reference point: the prediction at exactly that
    /// timestamp, or `None` when the model has no value there.
    pub fn align(predictions: &[TimePoint], reference: &[TimePoint]) -> Vec<Option<f64>> {
        let by_date: HashMap<NaiveDate, f64> = predictions
            .iter()
            .map(|point| (point.timestamp, point.value))
            .collect();
        reference
            .iter()
            .map(|point| by_date.get(&point.timestamp).copied())
            .collect()
    }

    /// Splits an aligned series into index-matched `(actual, predicted)`
    /// vectors, dropping gaps.
    pub fn paired(aligned: &[Option<f64>], reference: &[TimePoint]) -> (Vec<f64>, Vec<f64>) {
        aligned
            .iter()
            .zip(reference)
            .filter_map(|(predicted, actual)| predicted.map(|p| (actual.value, p)))
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(u32, f64)]) -> Vec<TimePoint> {
        points
            .iter()
            .map(|&(d, v)| TimePoint::new(NaiveDate::from_ymd_opt(2023, 3, d).unwrap(), v))
            .collect()
    }

    #[test]
    fn missing_timestamp_becomes_gap_at_that_position() {
        let reference = series(&[(1, 10.0), (2, 11.0), (3, 12.0), (4, 13.0)]);
        let predictions = series(&[(1, 9.5), (2, 11.5), (4, 12.5)]);
        let aligned = SeriesAligner::align(&predictions, &reference);
        assert_eq!(aligned, vec![Some(9.5), Some(11.5), None, Some(12.5)]);
    }

    #[test]
    fn extra_prediction_timestamps_are_ignored() {
        let reference = series(&[(2, 11.0)]);
        let predictions = series(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
        assert_eq!(
            SeriesAligner::align(&predictions, &reference),
            vec![Some(2.0)]
        );
    }

    #[test]
    fn paired_drops_gaps_and_keeps_order() {
        let reference = series(&[(1, 10.0), (2, 11.0), (3, 12.0)]);
        let aligned = vec![Some(9.0), None, Some(13.0)];
        let (actual, predicted) = SeriesAligner::paired(&aligned, &reference);
        assert_eq!(actual, vec![10.0, 12.0]);
        assert_eq!(predicted, vec![9.0, 13.0]);
    }
}
