//! Filter to remove movies the user already has a record for.
//!
//! Any record counts, including watched-but-unrated ones.

use crate::traits::Filter;
use data_loader::{DataIndex, MovieId};
use sources::UserContext;
use std::collections::HashSet;

/// Removes candidates present in the user's watch history.
pub struct AlreadyRatedFilter {
    watched: HashSet<MovieId>,
}

impl AlreadyRatedFilter {
    pub fn new(watched: HashSet<MovieId>) -> Self {
        Self { watched }
    }

    pub fn for_user(context: &UserContext) -> Self {
        Self::new(context.watched_movies.clone())
    }
}

impl Filter for AlreadyRatedFilter {
    fn name(&self) -> &str {
        "AlreadyRatedFilter"
    }

    fn apply(&self, candidates: Vec<MovieId>, _data_index: &DataIndex) -> Vec<MovieId> {
        candidates
            .into_iter()
            .filter(|id| !self.watched.contains(id))
            .collect()
    }
}
