//! Filter to exclude local movies on request.

use super::retain_movies;
use crate::traits::Filter;
use data_loader::{DataIndex, MovieId};

/// Drops movies flagged local. Only added when local content is excluded.
pub struct LocalityFilter;

impl Filter for LocalityFilter {
    fn name(&self) -> &str {
        "LocalityFilter"
    }

    fn apply(&self, candidates: Vec<MovieId>, data_index: &DataIndex) -> Vec<MovieId> {
        retain_movies(candidates, data_index, |movie| !movie.is_local)
    }
}
