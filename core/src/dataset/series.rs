use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::prelude::{CoreError, CoreResult};

/// A single observation keyed by calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    #[serde(rename = "date")]
    pub timestamp: NaiveDate,
    #[serde(alias = "price")]
    pub value: f64,
}

impl TimePoint {
    pub fn new(timestamp: NaiveDate, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ground-truth series every model is scored against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualSeries {
    points: Vec<TimePoint>,
}

impl ActualSeries {
    pub fn new(points: Vec<TimePoint>) -> CoreResult<Self> {
        if points.is_empty() {
            return Err(CoreError::InvalidInput("actual series is empty".into()));
        }
        ensure_well_formed(&points, "actual series")?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|point| point.timestamp).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Rejects non-finite values and timestamps that are not strictly increasing.
pub(crate) fn ensure_well_formed(points: &[TimePoint], what: &str) -> CoreResult<()> {
    if let Some(point) = points.iter().find(|point| !point.value.is_finite()) {
        return Err(CoreError::InvalidInput(format!(
            "{what}: non-finite value at {}",
            point.timestamp
        )));
    }
    for pair in points.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(CoreError::InvalidInput(format!(
                "{what}: timestamp {} does not follow {}",
                pair[1].timestamp, pair[0].timestamp
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn actual_series_rejects_duplicate_timestamps() {
        let points = vec![TimePoint::new(day(1), 1.0), TimePoint::new(day(1), 2.0)];
        assert!(matches!(
            ActualSeries::new(points),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn actual_series_rejects_empty_and_nan() {
        assert!(ActualSeries::new(Vec::new()).is_err());
        assert!(ActualSeries::new(vec![TimePoint::new(day(1), f64::NAN)]).is_err());
    }

    #[test]
    fn time_point_accepts_price_alias() {
        let point: TimePoint =
            serde_json::from_str(r#"{"date": "2023-01-02", "price": 153}"#).unwrap();
        assert_eq!(point, TimePoint::new(day(2), 153.0));
    }
}
