//! Candidate filtering, mood analysis and scoring.
//!
//! This crate provides:
//! - Filter trait and implementations for narrowing the catalog pool
//! - FilterPipeline for composing filters from request options
//! - Mood detection from free text
//! - Scoring strategies for signed-in users and guests
//!
//! ## Architecture
//! A request moves through two stages:
//! 1. Filters narrow the catalog (genre, year, runtime, locality)
//! 2. One ScoringStrategy scores a bounded prefix of the survivors and
//!    keeps the best
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{apply_filters, detect_mood, FilterOptions, GuestStrategy, ScoringStrategy};
//!
//! let options = FilterOptions::default().with_genre_names(["Comedy"]);
//! let pool = apply_filters(&index, index.movie_ids(), &options);
//!
//! let strategy = GuestStrategy::new(index.clone(), detect_mood("something funny"), config);
//! let results = strategy.score(pool, 20, &cache);
//! ```

pub mod features;
pub mod filter_pipeline;
pub mod filters;
pub mod mood;
pub mod scoring;
pub mod traits;

pub use filter_pipeline::{apply_filters, FilterOptions, FilterPipeline};
pub use filters::RuntimePreference;
pub use mood::{detect_mood, extract_keywords, MoodAnalyzer};
pub use scoring::{GuestStrategy, ScoringConfig, UserStrategy};
pub use traits::{Filter, ScoringStrategy};
