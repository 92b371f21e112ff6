//! Core domain types for the movie catalog.
//!
//! This module defines the records the recommendation engine reads:
//! movies, genres, users and their rating records, plus the in-memory
//! `DataIndex` that stands in for the data-access layer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// User-related Types
// =============================================================================

/// A registered user of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Whether the user opted into local (regional) movies.
    pub include_local_movies: bool,
}

// =============================================================================
// Movie-related Types
// =============================================================================

/// A movie record. The engine never mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Release year, when known.
    pub year: Option<u16>,
    /// Runtime in minutes, when known.
    pub runtime: Option<u32>,
    /// Genre tags, unique and unordered.
    pub genres: Vec<Genre>,
    /// External critic rating on a 0-10 scale.
    pub external_rating: Option<f32>,
    /// Local critic rating on a 0-10 scale.
    pub local_rating: Option<f32>,
    pub is_local: bool,
    pub is_featured: bool,
}

impl Movie {
    /// Minimal movie with no ratings or flags set.
    pub fn new(id: MovieId, title: impl Into<String>, year: Option<u16>, genres: Vec<Genre>) -> Self {
        Self {
            id,
            title: title.into(),
            year,
            runtime: None,
            genres,
            external_rating: None,
            local_rating: None,
            is_local: false,
            is_featured: false,
        }
    }

    pub fn has_genre(&self, genre: Genre) -> bool {
        self.genres.contains(&genre)
    }
}

/// Catalog genres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    SciFi,
    Thriller,
    War,
    Western,
}

impl Genre {
    pub const ALL: [Genre; 18] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Family,
        Genre::Fantasy,
        Genre::History,
        Genre::Horror,
        Genre::Music,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// Display name as shown in the catalog.
    pub fn name(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::History => "History",
            Genre::Horror => "Horror",
            Genre::Music => "Music",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }

    /// Parse a genre name, ignoring case and the usual spelling variants.
    ///
    /// Example: "sci-fi", "Science Fiction" and "SciFi" all map to `Genre::SciFi`
    pub fn from_name(name: &str) -> Option<Genre> {
        let normalized: String = name
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "action" => Some(Genre::Action),
            "adventure" => Some(Genre::Adventure),
            "animation" => Some(Genre::Animation),
            "comedy" => Some(Genre::Comedy),
            "crime" => Some(Genre::Crime),
            "documentary" => Some(Genre::Documentary),
            "drama" => Some(Genre::Drama),
            "family" => Some(Genre::Family),
            "fantasy" => Some(Genre::Fantasy),
            "history" => Some(Genre::History),
            "horror" => Some(Genre::Horror),
            "music" | "musical" => Some(Genre::Music),
            "mystery" => Some(Genre::Mystery),
            "romance" => Some(Genre::Romance),
            "scifi" | "sciencefiction" => Some(Genre::SciFi),
            "thriller" => Some(Genre::Thriller),
            "war" => Some(Genre::War),
            "western" => Some(Genre::Western),
            _ => None,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Rating Type
// =============================================================================

/// A user's record for a movie.
///
/// `rating` is `None` when the movie was watched or watchlisted but never rated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 1.0 to 5.0
    pub rating: Option<f32>,
    /// Unix timestamp of the record
    pub timestamp: i64,
}

// =============================================================================
// DataIndex - The In-Memory Catalog
// =============================================================================

/// Holds the catalog and its rating indices.
///
/// Movies and users live in `BTreeMap`s so iteration follows id order, which
/// is the candidate-pool order the scorers rely on.
#[derive(Debug)]
pub struct DataIndex {
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) movies: BTreeMap<MovieId, Movie>,

    /// All records made by each user, in insertion order
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All records received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,
    /// Slot of each (user, movie) record in `user_ratings` and `movie_ratings`
    pub(crate) rating_slots: HashMap<(UserId, MovieId), (usize, usize)>,

    /// Movies grouped by genre, each list in id order
    pub(crate) genre_index: HashMap<Genre, Vec<MovieId>>,
}

impl DataIndex {
    pub fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            movies: BTreeMap::new(),
            user_ratings: HashMap::new(),
            movie_ratings: HashMap::new(),
            rating_slots: HashMap::new(),
            genre_index: HashMap::new(),
        }
    }

    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// All user ids in ascending order
    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.keys().copied()
    }

    /// All movie ids in catalog (ascending id) order
    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.movies.keys().copied().collect()
    }

    pub fn movies(&self) -> impl Iterator<Item = &Movie> + '_ {
        self.movies.values()
    }

    /// Get all records made by a user
    ///
    /// Returns an empty slice if the user has none
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all records for a movie
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The record a user holds for a movie, if any
    pub fn get_rating(&self, user_id: UserId, movie_id: MovieId) -> Option<&Rating> {
        let &(user_slot, _) = self.rating_slots.get(&(user_id, movie_id))?;
        self.get_user_ratings(user_id).get(user_slot)
    }

    /// Number of records (rated or not) attached to a movie
    pub fn watch_count(&self, movie_id: MovieId) -> usize {
        self.get_movie_ratings(movie_id).len()
    }

    /// Get all movies tagged with a genre
    pub fn get_movies_by_genre(&self, genre: Genre) -> &[MovieId] {
        self.genre_index
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert a movie and keep the genre index in sync
    pub fn insert_movie(&mut self, mut movie: Movie) {
        let mut seen = Vec::with_capacity(movie.genres.len());
        movie.genres.retain(|g| {
            if seen.contains(g) {
                false
            } else {
                seen.push(*g);
                true
            }
        });

        if let Some(previous) = self.movies.get(&movie.id) {
            for genre in &previous.genres {
                if let Some(ids) = self.genre_index.get_mut(genre) {
                    ids.retain(|id| *id != movie.id);
                }
            }
        }

        for &genre in &movie.genres {
            let ids = self.genre_index.entry(genre).or_default();
            if let Err(pos) = ids.binary_search(&movie.id) {
                ids.insert(pos, movie.id);
            }
        }

        self.movies.insert(movie.id, movie);
    }

    /// Insert a rating record and update indices.
    ///
    /// A (user, movie) pair holds at most one record: a second insert for the
    /// same pair replaces the first.
    pub fn insert_rating(&mut self, rating: Rating) {
        let key = (rating.user_id, rating.movie_id);

        if let Some(&(user_slot, movie_slot)) = self.rating_slots.get(&key) {
            if let Some(existing) = self
                .user_ratings
                .get_mut(&rating.user_id)
                .and_then(|v| v.get_mut(user_slot))
            {
                *existing = rating;
            }
            if let Some(existing) = self
                .movie_ratings
                .get_mut(&rating.movie_id)
                .and_then(|v| v.get_mut(movie_slot))
            {
                *existing = rating;
            }
            return;
        }

        let by_user = self.user_ratings.entry(rating.user_id).or_default();
        by_user.push(rating);
        let user_slot = by_user.len() - 1;

        let by_movie = self.movie_ratings.entry(rating.movie_id).or_default();
        by_movie.push(rating);
        let movie_slot = by_movie.len() - 1;

        self.rating_slots.insert(key, (user_slot, movie_slot));
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.users.len(), self.movies.len(), total_ratings)
    }
}

impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
