//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_rated;
pub mod genre;
pub mod locality;
pub mod runtime;
pub mod year_range;

pub use already_rated::AlreadyRatedFilter;
pub use genre::GenreFilter;
pub use locality::LocalityFilter;
pub use runtime::{RuntimeFilter, RuntimePreference};
pub use year_range::YearRangeFilter;

use data_loader::{DataIndex, Movie, MovieId};

/// Keep candidates whose movie exists and satisfies `keep`.
pub(crate) fn retain_movies(
    candidates: Vec<MovieId>,
    data_index: &DataIndex,
    keep: impl Fn(&Movie) -> bool,
) -> Vec<MovieId> {
    candidates
        .into_iter()
        .filter(|&id| data_index.get_movie(id).is_some_and(&keep))
        .collect()
}
