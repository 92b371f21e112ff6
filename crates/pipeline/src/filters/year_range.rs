//! Filter to keep movies released inside a year range.

use super::retain_movies;
use crate::traits::Filter;
use data_loader::{DataIndex, MovieId};

/// Keeps candidates with `year >= start` and `year <= end`.
///
/// Either bound may be absent. A movie without a known year fails any
/// present bound.
pub struct YearRangeFilter {
    start: Option<u16>,
    end: Option<u16>,
}

impl YearRangeFilter {
    pub fn new(start: Option<u16>, end: Option<u16>) -> Self {
        Self { start, end }
    }

    fn is_noop(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl Filter for YearRangeFilter {
    fn name(&self) -> &str {
        "YearRangeFilter"
    }

    fn apply(&self, candidates: Vec<MovieId>, data_index: &DataIndex) -> Vec<MovieId> {
        if self.is_noop() {
            return candidates;
        }
        retain_movies(candidates, data_index, |movie| match movie.year {
            Some(year) => {
                self.start.is_none_or(|start| year >= start) && self.end.is_none_or(|end| year <= end)
            }
            None => false,
        })
    }
}
