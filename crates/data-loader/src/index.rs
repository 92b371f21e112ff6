//! DataIndex loading and integrity checks.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl DataIndex {
    /// Load the catalog from a directory holding `users.dat`, `movies.dat`
    /// and `ratings.dat`.
    ///
    /// Steps:
    /// 1. Parse the three files in parallel
    /// 2. Insert users, movies (building the genre index) and ratings
    /// 3. Validate referential integrity and rating range
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", data_dir);

        let users_path = data_dir.join("users.dat");
        let movies_path = data_dir.join("movies.dat");
        let ratings_path = data_dir.join("ratings.dat");

        // Nested joins give three-way parallelism
        let ((users, movies), ratings) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_movies(&movies_path),
                )
            },
            || parser::parse_ratings(&ratings_path),
        );

        let users = users?;
        let movies = movies?;
        let ratings = ratings?;

        info!(
            "Parsed {} users, {} movies, {} rating records",
            users.len(),
            movies.len(),
            ratings.len()
        );

        let mut index = DataIndex::new();
        for user in users {
            index.insert_user(user);
        }
        for movie in movies {
            index.insert_movie(movie);
        }
        for rating in ratings {
            index.insert_rating(rating);
        }

        index.validate()?;

        info!("Catalog loaded and validated");
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - All rating.user_id references exist in users
    /// - All rating.movie_id references exist in movies
    /// - Present rating values are in range (1.0 - 5.0)
    pub fn validate(&self) -> Result<()> {
        for ratings in self.user_ratings.values() {
            for rating in ratings {
                if !self.users.contains_key(&rating.user_id) {
                    return Err(DataLoadError::MissingReference {
                        entity: "User".to_string(),
                        id: rating.user_id,
                    });
                }
                if !self.movies.contains_key(&rating.movie_id) {
                    return Err(DataLoadError::MissingReference {
                        entity: "Movie".to_string(),
                        id: rating.movie_id,
                    });
                }
                if let Some(value) = rating.rating {
                    if !(1.0..=5.0).contains(&value) {
                        return Err(DataLoadError::InvalidValue {
                            field: "rating".to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
