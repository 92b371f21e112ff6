//! Per-movie scoring signals.
//!
//! Each signal is a plain function of a movie and whatever it is compared
//! against. The strategies in `scoring` weight and combine them.

use crate::scoring::ScoringConfig;
use data_loader::{DataIndex, Genre, Movie};
use sources::UserContext;
use std::collections::BTreeSet;

/// Maximum rating on the user scale.
const RATING_SCALE: f32 = 5.0;
/// Maximum critic rating.
const EXTERNAL_SCALE: f32 = 10.0;
/// Watch count at which the popularity volume term saturates.
const POPULAR_WATCH_COUNT: f32 = 100.0;

const EXTERNAL_POPULARITY_SHARE: f32 = 0.6;
const VOLUME_POPULARITY_SHARE: f32 = 0.4;

/// Year distances for the two era tiers.
const CLOSE_ERA_YEARS: f32 = 5.0;
const NEAR_ERA_YEARS: f32 = 10.0;
/// Year preference within `CLOSE_ERA_YEARS` of the user's mean year
pub const CLOSE_ERA_PREFERENCE: f32 = 0.2;
/// Year preference within `NEAR_ERA_YEARS`
pub const NEAR_ERA_PREFERENCE: f32 = 0.1;

fn external_quality(movie: &Movie) -> f32 {
    movie.external_rating.map(|r| r / EXTERNAL_SCALE).unwrap_or(0.0)
}

/// Genre affinity plus critic quality, capped at 1.0.
///
/// Every favorite genre on the movie contributes its frequency count times
/// `genre_match_weight`.
pub fn content_score(movie: &Movie, context: &UserContext, config: &ScoringConfig) -> f32 {
    let genre_score: f32 = context
        .favorite_genres
        .iter()
        .filter(|(genre, _)| movie.has_genre(*genre))
        .map(|(_, count)| *count as f32 * config.genre_match_weight)
        .sum();

    (genre_score + external_quality(movie) * config.rating_quality_weight).min(1.0)
}

/// Similarity-weighted mean neighbour rating, scaled to [0, 1].
///
/// Only neighbours with a rating value for the movie take part; zero total
/// similarity gives 0.
pub fn collaborative_score(movie: &Movie, neighbours: &[(u32, f32)], data_index: &DataIndex) -> f32 {
    let (weighted_sum, similarity_sum) = neighbours
        .iter()
        .filter_map(|&(user_id, similarity)| {
            let value = data_index.get_rating(user_id, movie.id)?.rating?;
            Some((value * similarity, similarity))
        })
        .fold((0.0_f32, 0.0_f32), |(ws, ss), (w, s)| (ws + w, ss + s));

    if similarity_sum > 0.0 {
        weighted_sum / similarity_sum / RATING_SCALE
    } else {
        0.0
    }
}

/// Critic rating blended with watch volume.
pub fn popularity_score(movie: &Movie, data_index: &DataIndex) -> f32 {
    let volume = (data_index.watch_count(movie.id) as f32 / POPULAR_WATCH_COUNT).min(1.0);
    external_quality(movie) * EXTERNAL_POPULARITY_SHARE + volume * VOLUME_POPULARITY_SHARE
}

/// Fraction of the mood tags present on the movie.
pub fn mood_score(movie: &Movie, moods: &BTreeSet<Genre>) -> f32 {
    if moods.is_empty() {
        return 0.0;
    }
    let matched = moods.iter().filter(|genre| movie.has_genre(**genre)).count();
    matched as f32 / moods.len() as f32
}

/// Closeness of the movie's year to the user's mean watched year.
///
/// 0.2 within five years, 0.1 within ten, otherwise 0.
pub fn year_preference(movie: &Movie, context: &UserContext) -> f32 {
    let (Some(year), Some(mean_year)) = (movie.year, context.mean_year) else {
        return 0.0;
    };
    let distance = (f32::from(year) - mean_year).abs();
    if distance <= CLOSE_ERA_YEARS {
        CLOSE_ERA_PREFERENCE
    } else if distance <= NEAR_ERA_YEARS {
        NEAR_ERA_PREFERENCE
    } else {
        0.0
    }
}
