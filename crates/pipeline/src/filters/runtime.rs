//! Filter to keep movies in a runtime bucket.

use super::retain_movies;
use crate::traits::Filter;
use data_loader::{DataIndex, MovieId};
use serde::{Deserialize, Serialize};

/// Runtime buckets in minutes: short <= 90 < medium <= 120 < long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimePreference {
    Short,
    Medium,
    Long,
}

impl RuntimePreference {
    /// Parse a preference name; anything unrecognized is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Some(Self::Short),
            "medium" => Some(Self::Medium),
            "long" => Some(Self::Long),
            _ => None,
        }
    }

    pub fn matches(&self, runtime: u32) -> bool {
        match self {
            Self::Short => runtime <= 90,
            Self::Medium => runtime > 90 && runtime <= 120,
            Self::Long => runtime > 120,
        }
    }
}

/// Keeps candidates whose runtime falls in the bucket.
///
/// Movies with unknown runtime are dropped.
pub struct RuntimeFilter {
    preference: RuntimePreference,
}

impl RuntimeFilter {
    pub fn new(preference: RuntimePreference) -> Self {
        Self { preference }
    }
}

impl Filter for RuntimeFilter {
    fn name(&self) -> &str {
        "RuntimeFilter"
    }

    fn apply(&self, candidates: Vec<MovieId>, data_index: &DataIndex) -> Vec<MovieId> {
        retain_movies(candidates, data_index, |movie| {
            movie.runtime.is_some_and(|r| self.preference.matches(r))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::create_test_index;

    #[test]
    fn test_parse() {
        assert_eq!(RuntimePreference::parse("Short"), Some(RuntimePreference::Short));
        assert_eq!(RuntimePreference::parse(" long "), Some(RuntimePreference::Long));
        assert_eq!(RuntimePreference::parse("epic"), None);
        assert_eq!(RuntimePreference::parse(""), None);
    }

    #[test]
    fn test_bucket_edges() {
        assert!(RuntimePreference::Short.matches(90));
        assert!(!RuntimePreference::Medium.matches(90));
        assert!(RuntimePreference::Medium.matches(91));
        assert!(RuntimePreference::Medium.matches(120));
        assert!(RuntimePreference::Long.matches(121));
    }

    #[test]
    fn test_runtime_filter() {
        let index = create_test_index();

        let short = RuntimeFilter::new(RuntimePreference::Short);
        assert_eq!(short.apply(index.movie_ids(), &index), vec![1, 4]);

        let medium = RuntimeFilter::new(RuntimePreference::Medium);
        assert_eq!(medium.apply(index.movie_ids(), &index), vec![2]);

        let long = RuntimeFilter::new(RuntimePreference::Long);
        assert_eq!(long.apply(index.movie_ids(), &index), vec![3]);
    }
}
