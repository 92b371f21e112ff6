//! Core traits for the recommendation pipeline.
//!
//! `Filter` narrows a candidate pool; `ScoringStrategy` turns a pool into a
//! ranked list. Both are object-safe so the engine can pick implementations
//! per request.

use data_loader::{DataIndex, MovieId};
use sources::{ScoredMovie, SimilarityCache};

/// A declarative constraint over the candidate pool.
///
/// Filters never fail: an absent or unrecognized option is simply not
/// turned into a filter. Candidates whose movie is missing from the index
/// are dropped.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Keep the candidates that satisfy this filter, preserving order.
    fn apply(&self, candidates: Vec<MovieId>, data_index: &DataIndex) -> Vec<MovieId>;
}

/// How a request's candidate pool is scored.
///
/// Selected once per request: `UserStrategy` for an identified user,
/// `GuestStrategy` for anonymous traffic.
pub trait ScoringStrategy {
    fn name(&self) -> &str;

    /// Score up to a bounded number of candidates and return the best `limit`,
    /// sorted by descending score.
    fn score(&self, candidates: Vec<MovieId>, limit: usize, cache: &SimilarityCache) -> Vec<ScoredMovie>;
}
