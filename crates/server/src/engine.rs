//! # Recommendation Engine
//!
//! Coordinates one request end to end:
//! 1. Start from the whole catalog in id order
//! 2. Narrow it with the request's filters
//! 3. Score with the user or guest strategy, picked once per request
//! 4. Record the session and its results
//! 5. Return the ranked list
//!
//! Similarity values are memoized in a cache owned by the engine. Call
//! `invalidate_user` after a user's ratings change and `refresh` after the
//! catalog is reloaded.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument};

use data_loader::{DataIndex, Movie, MovieId, UserId};
use pipeline::{apply_filters, detect_mood, FilterOptions, GuestStrategy, ScoringStrategy, UserStrategy};
use sources::{user_context::build_user_context, NeighbourFinder, ScoredMovie, SimilarMoviesSource, SimilarityCache};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::request::{Audience, RecommendationRequest};
use crate::session::{InMemorySessionRecorder, SessionParameters, SessionRecorder, SessionToken};

/// Default number of similar movies returned.
pub const DEFAULT_SIMILAR_LIMIT: usize = 6;

/// A recommended movie with its score and the reasons behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    pub movie: Movie,
    pub score: f32,
    pub reasons: Vec<String>,
}

/// Ranked results plus the session they were recorded under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub session_token: SessionToken,
    pub recommendations: Vec<MovieRecommendation>,
}

pub struct RecommendationEngine {
    data_index: Arc<DataIndex>,
    config: EngineConfig,
    cache: SimilarityCache,
    neighbour_finder: NeighbourFinder,
    similar_movies: SimilarMoviesSource,
    recorder: Arc<dyn SessionRecorder>,
}

impl RecommendationEngine {
    /// Engine with default config and an in-memory session recorder.
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self::with_config(data_index, EngineConfig::default())
    }

    pub fn with_config(data_index: Arc<DataIndex>, config: EngineConfig) -> Self {
        let cache = SimilarityCache::new(&config.cache);
        let neighbour_finder = NeighbourFinder::new(Arc::clone(&data_index)).with_config(config.similarity.clone());
        let similar_movies = SimilarMoviesSource::new(Arc::clone(&data_index)).with_config(config.similarity.clone());
        Self {
            data_index,
            config,
            cache,
            neighbour_finder,
            similar_movies,
            recorder: Arc::new(InMemorySessionRecorder::new()),
        }
    }

    /// Replace the session recorder.
    pub fn with_recorder(mut self, recorder: Arc<dyn SessionRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Filtered, scored and recorded recommendations.
    pub fn get_recommendations(&self, request: &RecommendationRequest) -> Result<Vec<MovieRecommendation>, EngineError> {
        self.recommend(request).map(|response| response.recommendations)
    }

    /// Like `get_recommendations`, also returning the session token.
    #[instrument(skip(self, request), fields(audience = ?request.audience, limit = request.limit))]
    pub fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse, EngineError> {
        let start_time = Instant::now();

        let strategy = self.strategy_for(request)?;

        let pool = self.candidate_pool(&request.filter_options());
        info!("Candidate pool after filters: {}", pool.len());

        let scored = strategy.score(pool, request.limit, &self.cache);
        debug!("{} kept {} results", strategy.name(), scored.len());
        let recommendations = self.to_recommendations(scored);

        let session_token = self
            .recorder
            .record(&SessionParameters::from(request), &recommendations)?;

        info!(
            "Served {} recommendations in {:.2?} (session {})",
            recommendations.len(),
            start_time.elapsed(),
            session_token
        );
        Ok(RecommendationResponse {
            session_token,
            recommendations,
        })
    }

    /// Personalized recommendations over the whole catalog.
    ///
    /// No filters are applied and no session is recorded.
    #[instrument(skip(self))]
    pub fn get_user_recommendations(&self, user_id: UserId, limit: usize) -> Result<Vec<MovieRecommendation>, EngineError> {
        let strategy = self.user_strategy(user_id)?;
        let scored = strategy.score(self.data_index.movie_ids(), limit, &self.cache);
        Ok(self.to_recommendations(scored))
    }

    /// Movies most like the given one.
    #[instrument(skip(self))]
    pub fn get_similar_movies(&self, movie_id: MovieId, limit: usize) -> Result<Vec<MovieRecommendation>, EngineError> {
        let reference = self
            .data_index
            .get_movie(movie_id)
            .ok_or(EngineError::MovieNotFound(movie_id))?;

        let scored = self.similar_movies.get_similar(reference, limit, &self.cache);
        info!("Found {} movies similar to {}", scored.len(), movie_id);
        Ok(self.to_recommendations(scored))
    }

    /// Forget cached similarities involving a user whose ratings changed.
    pub fn invalidate_user(&self, user_id: UserId) {
        self.cache.invalidate_user(user_id);
    }

    /// Swap in a reloaded catalog and drop every cached similarity.
    pub fn refresh(&mut self, data_index: Arc<DataIndex>) {
        let (users, movies, ratings) = data_index.counts();
        info!(
            "Refreshing engine catalog: {} users, {} movies, {} ratings",
            users, movies, ratings
        );
        self.neighbour_finder =
            NeighbourFinder::new(Arc::clone(&data_index)).with_config(self.config.similarity.clone());
        self.similar_movies =
            SimilarMoviesSource::new(Arc::clone(&data_index)).with_config(self.config.similarity.clone());
        self.data_index = data_index;
        self.cache.clear();
    }

    fn strategy_for(&self, request: &RecommendationRequest) -> Result<Box<dyn ScoringStrategy>, EngineError> {
        match request.audience {
            Audience::User(user_id) => Ok(Box::new(self.user_strategy(user_id)?)),
            Audience::Guest => {
                let moods = request.mood_text.as_deref().map(detect_mood).unwrap_or_default();
                Ok(Box::new(GuestStrategy::new(
                    Arc::clone(&self.data_index),
                    moods,
                    self.config.scoring.clone(),
                )))
            }
        }
    }

    fn user_strategy(&self, user_id: UserId) -> Result<UserStrategy, EngineError> {
        let context =
            build_user_context(&self.data_index, user_id).map_err(|_| EngineError::UserNotFound(user_id))?;
        Ok(UserStrategy::new(
            Arc::clone(&self.data_index),
            context,
            self.config.scoring.clone(),
            self.neighbour_finder.clone(),
        ))
    }

    fn candidate_pool(&self, options: &FilterOptions) -> Vec<MovieId> {
        apply_filters(&self.data_index, self.data_index.movie_ids(), options)
    }

    fn to_recommendations(&self, scored: Vec<ScoredMovie>) -> Vec<MovieRecommendation> {
        scored
            .into_iter()
            .filter_map(|s| {
                let movie = self.data_index.get_movie(s.movie_id)?;
                Some(MovieRecommendation {
                    movie: movie.clone(),
                    score: s.score,
                    reasons: s.reasons,
                })
            })
            .collect()
    }
}
