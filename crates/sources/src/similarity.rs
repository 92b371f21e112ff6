//! User-user similarity for collaborative filtering.
//!
//! ## Algorithm
//! 1. For the target user and every other user, take the movies both have
//!    rated (records without a value are ignored)
//! 2. With at least `min_common_ratings` shared movies, compute the Pearson
//!    correlation of the two rating vectors; negative correlation counts as 0
//! 3. Keep users above `min_similarity`, best first, at most `max_neighbours`
//!
//! Pairwise values and finished neighbour lists go through the
//! `SimilarityCache`, so repeated requests for the same user are cheap.

use crate::cache::{Neighbours, SimilarityCache};
use crate::types::UserContext;
use data_loader::{DataIndex, MovieId, UserId};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Thresholds for user and movie similarity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Shared rated movies required before Pearson is attempted
    pub min_common_ratings: usize,
    /// Users must be strictly above this to count as similar
    pub min_similarity: f32,
    /// Neighbours kept per user
    pub max_neighbours: usize,
    /// Similar-movie results must be strictly above this
    pub min_movie_similarity: f32,
    /// Similar-movie candidates evaluated per requested result
    pub movie_candidate_multiplier: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            min_common_ratings: 3,
            min_similarity: 0.3,
            max_neighbours: 10,
            min_movie_similarity: 0.3,
            movie_candidate_multiplier: 2,
        }
    }
}

/// Pearson correlation over the movies both users rated, clamped to [0, 1].
///
/// Returns 0 when fewer than `min_common` movies are shared or either
/// rating vector has zero variance.
pub fn pearson_similarity(
    a: &HashMap<MovieId, f32>,
    b: &HashMap<MovieId, f32>,
    min_common: usize,
) -> f32 {
    // Sorted so both argument orders sum in the same sequence
    let mut common: Vec<MovieId> = a.keys().filter(|id| b.contains_key(id)).copied().collect();
    if common.len() < min_common.max(1) {
        return 0.0;
    }
    common.sort_unstable();

    let n = common.len() as f64;
    let (mut sum_a, mut sum_b, mut sum_a_sq, mut sum_b_sq, mut product_sum) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for id in &common {
        let ra = f64::from(a[id]);
        let rb = f64::from(b[id]);
        sum_a += ra;
        sum_b += rb;
        sum_a_sq += ra * ra;
        sum_b_sq += rb * rb;
        product_sum += ra * rb;
    }

    let numerator = product_sum - (sum_a * sum_b / n);
    let denominator = ((sum_a_sq - sum_a * sum_a / n) * (sum_b_sq - sum_b * sum_b / n)).sqrt();
    if denominator == 0.0 || denominator.is_nan() {
        return 0.0;
    }

    (numerator / denominator).clamp(0.0, 1.0) as f32
}

/// Finds the users whose taste correlates with a target user.
#[derive(Clone)]
pub struct NeighbourFinder {
    data_index: Arc<DataIndex>,
    config: SimilarityConfig,
}

impl NeighbourFinder {
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

    /// Configure minimum shared rated movies (default: 3)
    pub fn with_min_common_ratings(mut self, min: usize) -> Self {
        self.config.min_common_ratings = min;
        self
    }

    /// Rated movies of a user, records without a value skipped
    fn rated_movies(&self, user_id: UserId) -> HashMap<MovieId, f32> {
        self.data_index
            .get_user_ratings(user_id)
            .iter()
            .filter_map(|r| r.rating.map(|value| (r.movie_id, value)))
            .collect()
    }

    /// Similarity of two users, cached per unordered pair.
    pub fn user_similarity(&self, a: UserId, b: UserId, cache: &SimilarityCache) -> f32 {
        cache.user_similarity(a, b, || {
            pearson_similarity(
                &self.rated_movies(a),
                &self.rated_movies(b),
                self.config.min_common_ratings,
            )
        })
    }

    /// Top neighbours of the context's user, best first.
    ///
    /// Ties are broken by user id so the list is deterministic.
    #[instrument(skip(self, user_context, cache), fields(user_id = user_context.user_id))]
    pub fn find_similar_users(&self, user_context: &UserContext, cache: &SimilarityCache) -> Neighbours {
        let user_id = user_context.user_id;
        cache.neighbours(user_id, || {
            let mut similar: Vec<(UserId, f32)> = self
                .data_index
                .user_ids()
                .filter(|&other| other != user_id)
                .filter_map(|other| {
                    let similarity = cache.user_similarity(user_id, other, || {
                        pearson_similarity(
                            &user_context.rated_movies,
                            &self.rated_movies(other),
                            self.config.min_common_ratings,
                        )
                    });
                    (similarity > self.config.min_similarity).then_some((other, similarity))
                })
                .collect();

            similar.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            similar.truncate(self.config.max_neighbours);

            debug!("Found {} similar users", similar.len());
            similar
        })
    }
}
