//! # Sources Crate
//!
//! Candidate-side building blocks of the recommendation engine.
//!
//! ## Components
//!
//! - **user_context**: gathers a user's history into a `UserContext`
//!   (watched/rated movies, favorite genres, mean release year)
//! - **similarity**: Pearson user-user similarity and neighbour search
//!   for collaborative filtering
//! - **similar**: genre/year movie similarity for "more like this"
//! - **cache**: bounded, invalidatable memoization of pairwise results
//! - **ranking**: threshold, stable sort and truncation shared by scorers
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{user_context::build_user_context, NeighbourFinder, SimilarityCache};
//!
//! let cache = SimilarityCache::default();
//! let context = build_user_context(&data_index, user_id)?;
//! let neighbours = NeighbourFinder::new(data_index.clone())
//!     .find_similar_users(&context, &cache);
//! ```

pub mod cache;
pub mod ranking;
pub mod similar;
pub mod similarity;
pub mod types;
pub mod user_context;

pub use cache::{CacheConfig, Neighbours, PairKey, SimilarityCache};
pub use ranking::rank_and_select;
pub use similar::{movie_similarity, similarity_reasons, SimilarMoviesSource};
pub use similarity::{pearson_similarity, NeighbourFinder, SimilarityConfig};
pub use types::{ScoredMovie, UserContext};
