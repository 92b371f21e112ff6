//! "More like this": movies similar to a reference movie.
//!
//! ## Algorithm
//! 1. Candidate pool: every movie sharing at least one genre with the
//!    reference, excluding the reference, in catalog order
//! 2. Evaluate up to `movie_candidate_multiplier * limit` of them
//! 3. similarity = 0.7 * Jaccard(genres) + 0.3 * max(0, 1 - |year gap| / 50)
//! 4. Keep results above `min_movie_similarity`, best first, top `limit`

use crate::cache::SimilarityCache;
use crate::ranking::rank_and_select;
use crate::similarity::SimilarityConfig;
use crate::types::ScoredMovie;
use data_loader::{DataIndex, Genre, Movie, MovieId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

const GENRE_WEIGHT: f32 = 0.7;
const YEAR_WEIGHT: f32 = 0.3;
/// Year gap at which the year term reaches zero
const YEAR_SPAN: f32 = 50.0;
/// Year gap still reported as "the same era"
const SAME_ERA_YEARS: u16 = 5;

/// Jaccard index of two genre lists; 0 when either is empty.
pub fn genre_jaccard(a: &[Genre], b: &[Genre]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: BTreeSet<Genre> = a.iter().copied().collect();
    let b: BTreeSet<Genre> = b.iter().copied().collect();
    let intersection = a.intersection(&b).count() as f32;
    let union = a.union(&b).count() as f32;
    if union == 0.0 { 0.0 } else { intersection / union }
}

fn year_gap(a: &Movie, b: &Movie) -> Option<u16> {
    Some(a.year?.abs_diff(b.year?))
}

/// Pairwise movie similarity in [0, 1].
///
/// A movie missing its year contributes nothing to the year term.
pub fn movie_similarity(a: &Movie, b: &Movie) -> f32 {
    let year_similarity = year_gap(a, b)
        .map(|gap| (1.0 - f32::from(gap) / YEAR_SPAN).max(0.0))
        .unwrap_or(0.0);
    GENRE_WEIGHT * genre_jaccard(&a.genres, &b.genres) + YEAR_WEIGHT * year_similarity
}

/// Human-readable reasons two movies are alike.
pub fn similarity_reasons(a: &Movie, b: &Movie) -> Vec<String> {
    let mut reasons = Vec::new();

    let a_genres: BTreeSet<Genre> = a.genres.iter().copied().collect();
    let shared: Vec<&str> = b
        .genres
        .iter()
        .copied()
        .collect::<BTreeSet<Genre>>()
        .intersection(&a_genres)
        .map(Genre::name)
        .collect();
    if !shared.is_empty() {
        reasons.push(format!("Both are {} movies", shared.join(", ")));
    }

    if year_gap(a, b).is_some_and(|gap| gap <= SAME_ERA_YEARS) {
        reasons.push("From the same era".to_string());
    }

    reasons
}

/// Generates "more like this" results for a reference movie.
#[derive(Clone)]
pub struct SimilarMoviesSource {
    data_index: Arc<DataIndex>,
    config: SimilarityConfig,
}

impl SimilarMoviesSource {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            data_index,
            config: SimilarityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SimilarityConfig) -> Self {
        self.config = config;
        self
    }

    /// Movies sharing a genre with the reference, deduplicated, in id order.
    pub fn genre_neighbours(&self, reference: &Movie) -> Vec<MovieId> {
        let pool: BTreeSet<MovieId> = reference
            .genres
            .iter()
            .flat_map(|&genre| self.data_index.get_movies_by_genre(genre))
            .copied()
            .filter(|&id| id != reference.id)
            .collect();
        pool.into_iter().collect()
    }

    #[instrument(skip(self, reference, cache), fields(movie_id = reference.id))]
    pub fn get_similar(&self, reference: &Movie, limit: usize, cache: &SimilarityCache) -> Vec<ScoredMovie> {
        let pool = self.genre_neighbours(reference);
        let budget = limit.saturating_mul(self.config.movie_candidate_multiplier);

        let scored: Vec<ScoredMovie> = pool
            .iter()
            .take(budget)
            .filter_map(|&id| self.data_index.get_movie(id))
            .map(|candidate| {
                let score = cache.movie_similarity(reference.id, candidate.id, || {
                    movie_similarity(reference, candidate)
                });
                ScoredMovie::new(candidate.id, score, similarity_reasons(reference, candidate))
            })
            .collect();

        debug!(
            "Scored {} of {} genre neighbours",
            scored.len(),
            pool.len()
        );
        rank_and_select(scored, self.config.min_movie_similarity, limit)
    }
}
