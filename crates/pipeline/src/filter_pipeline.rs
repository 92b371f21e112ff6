//! The FilterPipeline orchestrates multiple filters.
//!
//! Filters are conjunctive: a candidate survives only if every filter keeps
//! it, so the order filters are added in never changes the result.

use crate::filters::{GenreFilter, LocalityFilter, RuntimeFilter, RuntimePreference, YearRangeFilter};
use crate::traits::Filter;
use data_loader::{DataIndex, Genre, MovieId};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Optional narrowing applied to the candidate pool.
///
/// Every field is optional; an absent field filters nothing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Keep movies in any of these genres; empty means all genres
    pub genres: BTreeSet<Genre>,
    pub year_start: Option<u16>,
    pub year_end: Option<u16>,
    pub runtime: Option<RuntimePreference>,
    /// When false, local movies are excluded
    pub include_local: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            genres: BTreeSet::new(),
            year_start: None,
            year_end: None,
            runtime: None,
            include_local: true,
        }
    }
}

impl FilterOptions {
    /// Add genres by display name, silently skipping unknown names.
    pub fn with_genre_names<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.genres.extend(names.into_iter().filter_map(Genre::from_name));
        self
    }

    pub fn with_year_range(mut self, start: Option<u16>, end: Option<u16>) -> Self {
        self.year_start = start;
        self.year_end = end;
        self
    }

    /// Runtime bucket by name; an unrecognized name clears the preference.
    pub fn with_runtime_name(mut self, name: &str) -> Self {
        self.runtime = RuntimePreference::parse(name);
        self
    }

    pub fn with_include_local(mut self, include_local: bool) -> Self {
        self.include_local = include_local;
        self
    }
}

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(GenreFilter::new([Genre::Comedy]))
///     .add_filter(RuntimeFilter::new(RuntimePreference::Short));
///
/// let filtered = pipeline.apply(index.movie_ids(), &index);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Build the pipeline for a set of request options.
    ///
    /// Only filters with something to do are added. A year bound of 0 counts
    /// as absent.
    pub fn from_options(options: &FilterOptions) -> Self {
        let mut pipeline = Self::new();

        if !options.genres.is_empty() {
            pipeline = pipeline.add_filter(GenreFilter::new(options.genres.iter().copied()));
        }

        let year_start = options.year_start.filter(|&y| y != 0);
        let year_end = options.year_end.filter(|&y| y != 0);
        if year_start.is_some() || year_end.is_some() {
            pipeline = pipeline.add_filter(YearRangeFilter::new(year_start, year_end));
        }

        if let Some(preference) = options.runtime {
            pipeline = pipeline.add_filter(RuntimeFilter::new(preference));
        }

        if !options.include_local {
            pipeline = pipeline.add_filter(LocalityFilter);
        }

        pipeline
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    pub fn apply(&self, candidates: Vec<MovieId>, data_index: &DataIndex) -> Vec<MovieId> {
        let mut current = candidates;
        for filter in &self.filters {
            debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, data_index);
            debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Narrow `candidates` by every option that is set.
pub fn apply_filters(data_index: &DataIndex, candidates: Vec<MovieId>, options: &FilterOptions) -> Vec<MovieId> {
    FilterPipeline::from_options(options).apply(candidates, data_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::create_test_index;
    use crate::filters::AlreadyRatedFilter;
    use std::collections::HashSet;

    #[test]
    fn test_empty_pipeline() {
        let index = create_test_index();
        let pipeline = FilterPipeline::new();

        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(index.movie_ids(), &index), index.movie_ids());
    }

    #[test]
    fn test_single_filter() {
        let index = create_test_index();
        let pipeline = FilterPipeline::new().add_filter(AlreadyRatedFilter::new(HashSet::from([1, 3])));

        assert_eq!(pipeline.apply(index.movie_ids(), &index), vec![2, 4, 5]);
    }

    #[test]
    fn test_default_options_add_no_filters() {
        let options = FilterOptions::default();
        assert!(options.include_local);
        assert!(FilterPipeline::from_options(&options).is_empty());
    }

    #[test]
    fn test_zero_year_bound_is_absent() {
        let index = create_test_index();
        let options = FilterOptions::default().with_year_range(Some(0), Some(0));

        assert!(FilterPipeline::from_options(&options).is_empty());
        assert_eq!(apply_filters(&index, index.movie_ids(), &options).len(), 5);
    }

    #[test]
    fn test_unknown_names_degrade_to_noop() {
        let index = create_test_index();
        let options = FilterOptions::default()
            .with_genre_names(["Telenovela"])
            .with_runtime_name("epic");

        assert!(options.genres.is_empty());
        assert_eq!(options.runtime, None);
        assert_eq!(apply_filters(&index, index.movie_ids(), &options), index.movie_ids());
    }

    #[test]
    fn test_combined_filters() {
        let index = create_test_index();
        let options = FilterOptions::default()
            .with_genre_names(["Comedy", "Drama"])
            .with_year_range(Some(1990), None)
            .with_runtime_name("short")
            .with_include_local(false);

        // Movie 3 is a local long drama; 1 and 4 are short comedies
        assert_eq!(apply_filters(&index, index.movie_ids(), &options), vec![1, 4]);
    }

    #[test]
    fn test_filter_order_does_not_matter() {
        let index = create_test_index();

        let forward = FilterPipeline::new()
            .add_filter(GenreFilter::new([Genre::Action, Genre::Comedy]))
            .add_filter(YearRangeFilter::new(Some(2000), None))
            .add_filter(LocalityFilter);
        let backward = FilterPipeline::new()
            .add_filter(LocalityFilter)
            .add_filter(YearRangeFilter::new(Some(2000), None))
            .add_filter(GenreFilter::new([Genre::Action, Genre::Comedy]));

        let a = forward.apply(index.movie_ids(), &index);
        let b = backward.apply(index.movie_ids(), &index);
        assert_eq!(a, vec![2, 4]);
        assert_eq!(a, b);
    }
}
