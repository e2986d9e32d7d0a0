use std::cmp::Ordering;

use crate::dataset::model::Model;
use crate::state::sort::{SortDirection, SortState};

/// Orders models by one metric under a user-chosen direction.
pub struct RankingComparator;

impl RankingComparator {
    /// Equal values compare `Equal`; undefined values go last in either
    /// direction.
    pub fn compare(a: &Model, b: &Model, sort: &SortState) -> Ordering {
        Self::compare_values(a.metric(sort.key), b.metric(sort.key), sort.direction)
    }

    pub fn compare_values(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let ascending = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                match direction {
                    SortDirection::Asc => ascending,
                    SortDirection::Desc => ascending.reverse(),
                }
            }
        }
    }

    /// Stable sort: ties keep their input order.
    pub fn sorted<'a>(models: &'a [Model], sort: &SortState) -> Vec<&'a Model> {
        let mut ordered: Vec<&Model> = models.iter().collect();
        ordered.sort_by(|a, b| Self::compare(a, b, sort));
        ordered
    }
}
