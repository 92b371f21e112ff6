//! Candidate scoring for signed-in users and guests.
//!
//! Both strategies walk the candidate pool in order, score a bounded number
//! of candidates with additive weighted signals, then keep the best.
//! Scores are not normalized: bonuses can push a total above 1.0.

use crate::features::{
    collaborative_score, content_score, mood_score, popularity_score, year_preference, CLOSE_ERA_PREFERENCE,
};
use crate::filters::AlreadyRatedFilter;
use crate::traits::{Filter, ScoringStrategy};
use data_loader::{DataIndex, Genre, MovieId};
use serde::Deserialize;
use sources::{rank_and_select, NeighbourFinder, ScoredMovie, SimilarityCache, UserContext};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const REASON_FAVORITE_GENRES: &str = "Matches your favorite genres";
pub const REASON_SIMILAR_USERS: &str = "Liked by users with similar taste";
pub const REASON_LOCAL: &str = "Local movie";
pub const REASON_ERA: &str = "From an era you enjoy";
pub const REASON_POPULAR: &str = "Highly rated by users";
pub const REASON_MOOD: &str = "Matches your mood";
pub const REASON_FEATURED: &str = "Featured movie";

/// Weights and thresholds for both scoring paths.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub content_weight: f32,
    /// Per favorite-genre occurrence inside the content score
    pub genre_match_weight: f32,
    /// Share of external rating inside the content score
    pub rating_quality_weight: f32,
    pub collaborative_weight: f32,
    /// Collaborative signal needs strictly more records than this
    pub min_ratings_for_collaborative: usize,
    pub local_bonus: f32,
    pub year_weight: f32,
    pub popularity_weight: f32,
    pub mood_weight: f32,
    pub featured_bonus: f32,
    /// Results must score strictly above this
    pub min_score: f32,
    /// Content, collaborative and mood signals above this earn a reason
    pub reason_threshold: f32,
    pub popularity_reason_threshold: f32,
    /// Candidates evaluated per requested result
    pub user_candidate_multiplier: usize,
    pub guest_candidate_multiplier: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            content_weight: 0.6,
            genre_match_weight: 0.3,
            rating_quality_weight: 0.2,
            collaborative_weight: 0.4,
            min_ratings_for_collaborative: 5,
            local_bonus: 0.2,
            year_weight: 0.1,
            popularity_weight: 0.5,
            mood_weight: 0.5,
            featured_bonus: 0.3,
            min_score: 0.3,
            reason_threshold: 0.5,
            popularity_reason_threshold: 0.7,
            user_candidate_multiplier: 3,
            guest_candidate_multiplier: 2,
        }
    }
}

/// Personalized scoring from a user's history and similar users.
pub struct UserStrategy {
    data_index: Arc<DataIndex>,
    context: UserContext,
    config: ScoringConfig,
    finder: NeighbourFinder,
}

impl UserStrategy {
    pub fn new(data_index: Arc<DataIndex>, context: UserContext, config: ScoringConfig, finder: NeighbourFinder) -> Self {
        Self {
            data_index,
            context,
            config,
            finder,
        }
    }

    pub fn context(&self) -> &UserContext {
        &self.context
    }

    fn uses_collaborative(&self) -> bool {
        self.context.record_count > self.config.min_ratings_for_collaborative
    }
}

impl ScoringStrategy for UserStrategy {
    fn name(&self) -> &str {
        "UserStrategy"
    }

    #[instrument(skip(self, candidates, cache), fields(user_id = self.context.user_id))]
    fn score(&self, candidates: Vec<MovieId>, limit: usize, cache: &SimilarityCache) -> Vec<ScoredMovie> {
        let unseen = AlreadyRatedFilter::for_user(&self.context).apply(candidates, &self.data_index);
        let budget = limit.saturating_mul(self.config.user_candidate_multiplier);

        let neighbours = if self.uses_collaborative() {
            Some(self.finder.find_similar_users(&self.context, cache))
        } else {
            None
        };

        let config = &self.config;
        let scored: Vec<ScoredMovie> = unseen
            .iter()
            .take(budget)
            .filter_map(|&id| self.data_index.get_movie(id))
            .map(|movie| {
                let mut score = 0.0;
                let mut reasons = Vec::new();

                let content = content_score(movie, &self.context, config);
                score += content * config.content_weight;
                if content > config.reason_threshold {
                    reasons.push(REASON_FAVORITE_GENRES.to_string());
                }

                if let Some(neighbours) = &neighbours {
                    let collaborative = collaborative_score(movie, neighbours, &self.data_index);
                    score += collaborative * config.collaborative_weight;
                    if collaborative > config.reason_threshold {
                        reasons.push(REASON_SIMILAR_USERS.to_string());
                    }
                }

                if movie.is_local && self.context.include_local_movies {
                    score += config.local_bonus;
                    reasons.push(REASON_LOCAL.to_string());
                }

                let era = year_preference(movie, &self.context);
                score += era * config.year_weight;
                if era >= CLOSE_ERA_PREFERENCE {
                    reasons.push(REASON_ERA.to_string());
                }

                ScoredMovie::new(movie.id, score, reasons)
            })
            .collect();

        debug!(
            "Scored {} of {} unseen candidates",
            scored.len(),
            unseen.len()
        );
        rank_and_select(scored, config.min_score, limit)
    }
}

/// Popularity and mood scoring for anonymous requests.
pub struct GuestStrategy {
    data_index: Arc<DataIndex>,
    moods: BTreeSet<Genre>,
    config: ScoringConfig,
}

impl GuestStrategy {
    pub fn new(data_index: Arc<DataIndex>, moods: BTreeSet<Genre>, config: ScoringConfig) -> Self {
        Self {
            data_index,
            moods,
            config,
        }
    }

    pub fn moods(&self) -> &BTreeSet<Genre> {
        &self.moods
    }
}

impl ScoringStrategy for GuestStrategy {
    fn name(&self) -> &str {
        "GuestStrategy"
    }

    #[instrument(skip(self, candidates, _cache), fields(moods = self.moods.len()))]
    fn score(&self, candidates: Vec<MovieId>, limit: usize, _cache: &SimilarityCache) -> Vec<ScoredMovie> {
        let budget = limit.saturating_mul(self.config.guest_candidate_multiplier);
        let config = &self.config;

        let scored: Vec<ScoredMovie> = candidates
            .iter()
            .take(budget)
            .filter_map(|&id| self.data_index.get_movie(id))
            .map(|movie| {
                let mut score = 0.0;
                let mut reasons = Vec::new();

                let popularity = popularity_score(movie, &self.data_index);
                score += popularity * config.popularity_weight;
                if popularity > config.popularity_reason_threshold {
                    reasons.push(REASON_POPULAR.to_string());
                }

                if !self.moods.is_empty() {
                    let mood = mood_score(movie, &self.moods);
                    score += mood * config.mood_weight;
                    if mood > config.reason_threshold {
                        reasons.push(REASON_MOOD.to_string());
                    }
                }

                if movie.is_featured {
                    score += config.featured_bonus;
                    reasons.push(REASON_FEATURED.to_string());
                }

                ScoredMovie::new(movie.id, score, reasons)
            })
            .collect();

        debug!("Scored {} of {} candidates", scored.len(), candidates.len());
        rank_and_select(scored, config.min_score, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Movie, Rating, User};
    use sources::user_context::build_user_context;

    fn add_rating(index: &mut DataIndex, user_id: u32, movie_id: MovieId, rating: Option<f32>) {
        index.insert_rating(Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        });
    }

    /// Guest catalog: a featured family comedy and a plain drama.
    fn guest_index() -> DataIndex {
        let mut index = DataIndex::new();

        let mut comedy = Movie::new(1, "Featured Comedy", Some(2010), vec![Genre::Comedy, Genre::Family]);
        comedy.external_rating = Some(8.0);
        comedy.is_featured = true;
        index.insert_movie(comedy);

        let mut drama = Movie::new(2, "Quiet Drama", Some(2012), vec![Genre::Drama]);
        drama.external_rating = Some(6.0);
        index.insert_movie(drama);

        for user_id in 0..10 {
            index.insert_user(User {
                id: user_id,
                username: format!("viewer{}", user_id),
                include_local_movies: false,
            });
            add_rating(&mut index, user_id, 1, Some(4.0));
        }
        index
    }

    #[test]
    fn test_guest_mood_and_featured() {
        let index = Arc::new(guest_index());
        let moods = BTreeSet::from([Genre::Comedy, Genre::Family]);
        let strategy = GuestStrategy::new(Arc::clone(&index), moods, ScoringConfig::default());

        let results = strategy.score(index.movie_ids(), 10, &SimilarityCache::default());

        // Comedy: (0.8*0.6 + 0.1*0.4)*0.5 + 1.0*0.5 + 0.3 = 1.06
        // Drama: 0.36*0.5 = 0.18, discarded
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].movie_id, 1);
        assert!((results[0].score - 1.06).abs() < 1e-5);
        assert_eq!(
            results[0].reasons,
            vec![REASON_MOOD.to_string(), REASON_FEATURED.to_string()]
        );
    }

    #[test]
    fn test_guest_without_mood() {
        let index = Arc::new(guest_index());
        let strategy = GuestStrategy::new(Arc::clone(&index), BTreeSet::new(), ScoringConfig::default());

        let results = strategy.score(index.movie_ids(), 10, &SimilarityCache::default());

        // 0.26 + 0.3 for the featured comedy only
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 0.56).abs() < 1e-5);
        assert_eq!(results[0].reasons, vec![REASON_FEATURED.to_string()]);
    }

    #[test]
    fn test_guest_candidate_budget() {
        let index = Arc::new(guest_index());
        let strategy = GuestStrategy::new(Arc::clone(&index), BTreeSet::new(), ScoringConfig::default());

        // limit 1 looks at two candidates; reversed pool still finds movie 1
        let results = strategy.score(vec![2, 1], 1, &SimilarityCache::default());
        assert_eq!(results.len(), 1);

        assert!(strategy.score(index.movie_ids(), 0, &SimilarityCache::default()).is_empty());
    }

    /// User 1 loves action; user 2 shares their taste and liked movie 8.
    fn user_index() -> DataIndex {
        let mut index = DataIndex::new();
        for id in 1..=3 {
            index.insert_user(User {
                id,
                username: format!("user{}", id),
                include_local_movies: id == 1,
            });
        }

        for id in 1..=6 {
            index.insert_movie(Movie::new(id, format!("Seen {}", id), Some(2000), vec![Genre::Action]));
        }
        let mut target = Movie::new(7, "Unseen Action", Some(2002), vec![Genre::Action]);
        target.external_rating = Some(8.0);
        index.insert_movie(target);
        let mut local = Movie::new(8, "Local Drama", Some(1970), vec![Genre::Drama]);
        local.is_local = true;
        index.insert_movie(local);
        index.insert_movie(Movie::new(9, "Old Western", Some(1950), vec![Genre::Western]));

        let history = [5.0, 4.0, 5.0, 2.0, 4.0, 1.0];
        for (i, value) in history.iter().enumerate() {
            add_rating(&mut index, 1, i as MovieId + 1, Some(*value));
            add_rating(&mut index, 2, i as MovieId + 1, Some(*value));
        }
        add_rating(&mut index, 2, 8, Some(5.0));
        add_rating(&mut index, 3, 1, None);
        index
    }

    fn user_strategy(index: &Arc<DataIndex>, user_id: u32) -> UserStrategy {
        let context = build_user_context(index, user_id).unwrap();
        UserStrategy::new(
            Arc::clone(index),
            context,
            ScoringConfig::default(),
            NeighbourFinder::new(Arc::clone(index)),
        )
    }

    #[test]
    fn test_user_excludes_watched() {
        let index = Arc::new(user_index());
        let strategy = user_strategy(&index, 1);

        let results = strategy.score(index.movie_ids(), 10, &SimilarityCache::default());
        assert!(results.iter().all(|r| r.movie_id > 6));
    }

    #[test]
    fn test_user_scoring() {
        let index = Arc::new(user_index());
        let strategy = user_strategy(&index, 1);

        let results = strategy.score(index.movie_ids(), 10, &SimilarityCache::default());
        let ids: Vec<MovieId> = results.iter().map(|r| r.movie_id).collect();

        // Movie 7: content min(4*0.3 + 0.16, 1) * 0.6 + era 0.2 * 0.1 = 0.62
        // Movie 8: collaborative 1.0 * 0.4 + local 0.2 = 0.6
        // Movie 9: nothing, discarded
        assert_eq!(ids, vec![7, 8]);
        assert!((results[0].score - 0.62).abs() < 1e-5);
        assert_eq!(
            results[0].reasons,
            vec![REASON_FAVORITE_GENRES.to_string(), REASON_ERA.to_string()]
        );
        assert!((results[1].score - 0.6).abs() < 1e-5);
        assert_eq!(
            results[1].reasons,
            vec![REASON_SIMILAR_USERS.to_string(), REASON_LOCAL.to_string()]
        );
    }

    #[test]
    fn test_era_reason_only_for_close_era() {
        let mut index = user_index();
        // Eight years from user 1's mean year: near-era score, no reason
        index.insert_movie(Movie::new(10, "Later Action", Some(2008), vec![Genre::Action]));
        let index = Arc::new(index);
        let strategy = user_strategy(&index, 1);

        let results = strategy.score(index.movie_ids(), 10, &SimilarityCache::default());
        let ids: Vec<MovieId> = results.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![7, 10, 8]);

        // min(4*0.3, 1) * 0.6 + 0.1 * 0.1 = 0.61
        assert!((results[1].score - 0.61).abs() < 1e-5);
        assert_eq!(results[1].reasons, vec![REASON_FAVORITE_GENRES.to_string()]);
        assert!(results[0].reasons.contains(&REASON_ERA.to_string()));
    }

    #[test]
    fn test_collaborative_needs_enough_records() {
        let index = Arc::new(user_index());
        let mut config = ScoringConfig::default();
        config.min_ratings_for_collaborative = 6;
        let context = build_user_context(&index, 1).unwrap();
        let strategy = UserStrategy::new(
            Arc::clone(&index),
            context,
            config,
            NeighbourFinder::new(Arc::clone(&index)),
        );

        // Six records is not more than six, so movie 8 keeps only its local bonus
        let results = strategy.score(index.movie_ids(), 10, &SimilarityCache::default());
        let ids: Vec<MovieId> = results.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![7]);
    }

    #[test]
    fn test_user_without_history() {
        let index = Arc::new(user_index());
        let strategy = user_strategy(&index, 3);

        // One unrated record: no favorites, no collaborative, no local opt-in
        let results = strategy.score(index.movie_ids(), 10, &SimilarityCache::default());
        assert!(results.is_empty());
    }
}
