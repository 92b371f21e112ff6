//! Filter to keep movies in any of the requested genres.

use super::retain_movies;
use crate::traits::Filter;
use data_loader::{DataIndex, Genre, MovieId};
use std::collections::BTreeSet;

/// Keeps candidates tagged with at least one of `genres`.
///
/// An empty set keeps everything.
pub struct GenreFilter {
    genres: BTreeSet<Genre>,
}

impl GenreFilter {
    pub fn new(genres: impl IntoIterator<Item = Genre>) -> Self {
        Self {
            genres: genres.into_iter().collect(),
        }
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply(&self, candidates: Vec<MovieId>, data_index: &DataIndex) -> Vec<MovieId> {
        if self.genres.is_empty() {
            return candidates;
        }
        retain_movies(candidates, data_index, |movie| {
            movie.genres.iter().any(|genre| self.genres.contains(genre))
        })
    }
}
