use serde::{Deserialize, Serialize};

use crate::prelude::{CoreError, CoreResult, MetricDirection, MetricFamily, MetricKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// The direction that lists the best values of a metric first.
    pub fn best_first(direction: MetricDirection) -> Self {
        match direction {
            MetricDirection::Max => SortDirection::Desc,
            MetricDirection::Min => SortDirection::Asc,
        }
    }
}

/// Table sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: MetricKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn for_key(key: MetricKey) -> Self {
        Self {
            key,
            direction: SortDirection::best_first(key.direction()),
        }
    }

    pub fn initial(family: MetricFamily) -> Self {
        Self::for_key(family.headline())
    }

    /// Header click: same key flips, a new key starts best-first.
    pub fn click(self, key: MetricKey, family: MetricFamily) -> CoreResult<Self> {
        if !family.contains(key) {
            return Err(CoreError::UnknownMetric(key.to_string()));
        }
        if key == self.key {
            Ok(Self {
                key,
                direction: self.direction.flipped(),
            })
        } else {
            Ok(Self::for_key(key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_sort_lists_best_headline_first() {
        assert_eq!(
            SortState::initial(MetricFamily::Regression),
            SortState {
                key: MetricKey::R2,
                direction: SortDirection::Desc
            }
        );
    }

    #[test]
    fn clicking_same_key_twice_flips_direction() {
        let family = MetricFamily::Regression;
        let sort = SortState::initial(family);
        let once = sort.click(MetricKey::R2, family).unwrap();
        assert_eq!(once.direction, SortDirection::Asc);
        let twice = once.click(MetricKey::R2, family).unwrap();
        assert_eq!(twice, sort);
    }

    #[test]
    fn new_key_defaults_to_best_first() {
        let family = MetricFamily::Regression;
        let flipped = SortState::initial(family)
            .click(MetricKey::R2, family)
            .unwrap();
        let mae = flipped.click(MetricKey::Mae, family).unwrap();
        assert_eq!(mae.direction, SortDirection::Asc);

        let directional = MetricFamily::Directional;
        let da = SortState::for_key(MetricKey::Mape)
            .click(MetricKey::DirectionalAccuracy, directional)
            .unwrap();
        assert_eq!(da.direction, SortDirection::Desc);
    }

    #[test]
    fn key_outside_family_is_rejected() {
        let err = SortState::initial(MetricFamily::Regression)
            .click(MetricKey::DirectionalAccuracy, MetricFamily::Regression)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownMetric(_)));
    }
}
