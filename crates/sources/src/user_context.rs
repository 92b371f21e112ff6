//! Helper functions to build UserContext from DataIndex

use crate::types::UserContext;
use anyhow::{anyhow, Result};
use data_loader::{DataIndex, Genre, Rating, UserId};

/// Minimum rating for a movie to count towards favorite genres
pub const FAVORITE_RATING: f32 = 4.0;

/// Number of favorite genres kept per user
pub const FAVORITE_GENRE_COUNT: usize = 3;

/// Build a UserContext from DataIndex for a given user
///
/// Gathers, in one pass over the user's records:
/// - watched movies (any record) and rated movies (records with a value)
/// - favorite genres (top 3 by frequency among movies rated >= 4)
/// - mean release year of the watch history
pub fn build_user_context(data_index: &DataIndex, user_id: UserId) -> Result<UserContext> {
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    let mut context = UserContext::new(user_id);
    context.include_local_movies = user.include_local_movies;

    let ratings = data_index.get_user_ratings(user_id);
    if ratings.is_empty() {
        return Ok(context);
    }

    context.record_count = ratings.len();
    for rating in ratings {
        context.watched_movies.insert(rating.movie_id);
        if let Some(value) = rating.rating {
            context.rated_movies.insert(rating.movie_id, value);
        }
    }

    context.favorite_genres = compute_favorite_genres(data_index, ratings);
    context.mean_year = compute_mean_year(data_index, ratings);

    Ok(context)
}

/// Count genres over highly rated movies and keep the top three.
///
/// Ties keep the order in which genres were first seen in the history.
fn compute_favorite_genres(data_index: &DataIndex, ratings: &[Rating]) -> Vec<(Genre, u32)> {
    let mut counts: Vec<(Genre, u32)> = Vec::new();
    for rating in ratings {
        if !rating.rating.is_some_and(|r| r >= FAVORITE_RATING) {
            continue;
        }
        let Some(movie) = data_index.get_movie(rating.movie_id) else {
            continue;
        };
        for &genre in &movie.genres {
            match counts.iter_mut().find(|(g, _)| *g == genre) {
                Some(entry) => entry.1 += 1,
                None => counts.push((genre, 1)),
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(FAVORITE_GENRE_COUNT);
    counts
}

/// Mean release year over every movie in the history that has a year.
fn compute_mean_year(data_index: &DataIndex, ratings: &[Rating]) -> Option<f32> {
    let years: Vec<f32> = ratings
        .iter()
        .filter_map(|r| data_index.get_movie(r.movie_id)?.year)
        .map(f32::from)
        .collect();

    if years.is_empty() {
        return None;
    }
    Some(years.iter().sum::<f32>() / years.len() as f32)
}
