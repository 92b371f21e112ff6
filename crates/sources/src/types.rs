//! Shared types for candidate scoring.

use data_loader::{Genre, MovieId, UserId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A movie together with its score and the reasons behind it.
///
/// Scores are built from additive weighted terms and are not normalized:
/// bonuses can push a score above 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
    pub reasons: Vec<String>,
}

impl ScoredMovie {
    pub fn new(movie_id: MovieId, score: f32, reasons: Vec<String>) -> Self {
        Self {
            movie_id,
            score,
            reasons,
        }
    }
}

/// Everything the scorers need to know about one user, gathered once.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: UserId,
    /// Whether the user opted into local movies
    pub include_local_movies: bool,
    /// Every movie with a record, rated or not
    pub watched_movies: HashSet<MovieId>,
    /// Movies with a rating value
    pub rated_movies: HashMap<MovieId, f32>,
    /// Number of records, rated or not
    pub record_count: usize,
    /// Up to three genres most frequent among movies rated >= 4, with counts
    pub favorite_genres: Vec<(Genre, u32)>,
    /// Mean release year over the watch history
    pub mean_year: Option<f32>,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    pub fn has_watched(&self, movie_id: MovieId) -> bool {
        self.watched_movies.contains(&movie_id)
    }
}
