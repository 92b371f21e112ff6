//! # Data Loader Crate
//!
//! The data-access layer the recommendation engine reads from: movie,
//! user and rating records held in an in-memory `DataIndex`, plus the
//! loader for the `::`-separated catalog files.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/catalog"))?;
//!
//! let movie = index.get_movie(550).unwrap();
//! let history = index.get_user_ratings(1);
//! println!("{} has {} records", movie.title, index.watch_count(movie.id));
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use types::{DataIndex, Genre, Movie, MovieId, Rating, User, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_index_creation() {
        let index = DataIndex::new();
        let (users, movies, ratings) = index.counts();

        assert_eq!(users, 0);
        assert_eq!(movies, 0);
        assert_eq!(ratings, 0);
    }

    #[test]
    fn test_insert_movie_builds_genre_index() {
        let mut index = DataIndex::new();
        index.insert_movie(Movie::new(2, "Toy Story", Some(1995), vec![Genre::Animation, Genre::Comedy]));
        index.insert_movie(Movie::new(1, "Heat", Some(1995), vec![Genre::Crime, Genre::Crime]));

        assert_eq!(index.get_movie(1).unwrap().genres, vec![Genre::Crime]);
        assert_eq!(index.get_movies_by_genre(Genre::Comedy), &[2]);
        assert_eq!(index.movie_ids(), vec![1, 2]);

        // Re-inserting with different genres moves the movie between buckets
        index.insert_movie(Movie::new(2, "Toy Story", Some(1995), vec![Genre::Family]));
        assert!(index.get_movies_by_genre(Genre::Comedy).is_empty());
        assert_eq!(index.get_movies_by_genre(Genre::Family), &[2]);
    }

    #[test]
    fn test_insert_rating_replaces_same_pair() {
        let mut index = DataIndex::new();

        index.insert_rating(Rating {
            user_id: 1,
            movie_id: 1193,
            rating: None,
            timestamp: 978300760,
        });
        index.insert_rating(Rating {
            user_id: 1,
            movie_id: 1193,
            rating: Some(5.0),
            timestamp: 978300800,
        });

        let user_ratings = index.get_user_ratings(1);
        assert_eq!(user_ratings.len(), 1);
        assert_eq!(user_ratings[0].rating, Some(5.0));

        assert_eq!(index.watch_count(1193), 1);
        assert_eq!(index.get_rating(1, 1193).unwrap().timestamp, 978300800);
    }

    #[test]
    fn test_replace_keeps_other_records_in_place() {
        let mut index = DataIndex::new();
        for user_id in 1..=1000 {
            index.insert_rating(Rating {
                user_id,
                movie_id: 7,
                rating: Some(3.0),
                timestamp: 0,
            });
        }
        index.insert_rating(Rating {
            user_id: 1,
            movie_id: 8,
            rating: None,
            timestamp: 0,
        });

        index.insert_rating(Rating {
            user_id: 500,
            movie_id: 7,
            rating: Some(1.0),
            timestamp: 42,
        });
        index.insert_rating(Rating {
            user_id: 1,
            movie_id: 8,
            rating: Some(4.0),
            timestamp: 43,
        });

        assert_eq!(index.counts().2, 1001);
        assert_eq!(index.watch_count(7), 1000);
        assert_eq!(index.get_movie_ratings(7)[499].user_id, 500);
        assert_eq!(index.get_movie_ratings(7)[499].rating, Some(1.0));
        assert_eq!(index.get_rating(500, 7).unwrap().timestamp, 42);
        assert_eq!(index.get_rating(499, 7).unwrap().rating, Some(3.0));
        assert_eq!(index.get_user_ratings(1)[1].rating, Some(4.0));
        assert_eq!(index.get_rating(1, 8).unwrap().timestamp, 43);
        assert!(index.get_rating(1, 9).is_none());
    }

    #[test]
    fn test_empty_queries() {
        let index = DataIndex::new();

        assert!(index.get_user(999).is_none());
        assert!(index.get_movie(999).is_none());
        assert!(index.get_user_ratings(999).is_empty());
        assert!(index.get_movie_ratings(999).is_empty());
        assert!(index.get_movies_by_genre(Genre::Action).is_empty());
        assert_eq!(index.watch_count(999), 0);
    }

    #[test]
    fn test_genre_from_name() {
        assert_eq!(Genre::from_name("Sci-Fi"), Some(Genre::SciFi));
        assert_eq!(Genre::from_name("science fiction"), Some(Genre::SciFi));
        assert_eq!(Genre::from_name(" COMEDY "), Some(Genre::Comedy));
        assert_eq!(Genre::from_name("opera"), None);
        for genre in Genre::ALL {
            assert_eq!(Genre::from_name(genre.name()), Some(genre));
        }
    }
}
