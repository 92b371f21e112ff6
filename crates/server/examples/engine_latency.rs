//! Times catalog loading and the main engine queries against a catalog.
//!
//! ```text
//! cargo run -p server --example engine_latency -- [data-dir]
//! ```

use anyhow::{Context, Result};
use data_loader::DataIndex;
use server::{RecommendationEngine, RecommendationRequest, DEFAULT_SIMILAR_LIMIT};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const ROUNDS: u32 = 200;

fn time_rounds(mut query: impl FnMut() -> Result<usize>) -> Result<(Duration, usize)> {
    let start = Instant::now();
    let mut returned = 0;
    for _ in 0..ROUNDS {
        returned = query()?;
    }
    Ok((start.elapsed() / ROUNDS, returned))
}

fn main() -> Result<()> {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/catalog"));

    let start = Instant::now();
    let index = DataIndex::load_from_files(&data_dir)
        .with_context(|| format!("loading catalog from {}", data_dir.display()))?;
    let (users, movies, records) = index.counts();
    println!(
        "Loaded {} users, {} movies, {} records in {:?}",
        users,
        movies,
        records,
        start.elapsed()
    );

    let first_movie = index.movie_ids().first().copied().context("catalog has no movies")?;
    let engine = RecommendationEngine::new(Arc::new(index));

    let guest = RecommendationRequest::guest();
    let (per_call, count) = time_rounds(|| Ok(engine.get_recommendations(&guest)?.len()))?;
    println!("Guest recommendations: {:?}/call, {} results", per_call, count);

    let mood = RecommendationRequest::guest().with_mood("funny family movie");
    let (per_call, count) = time_rounds(|| Ok(engine.get_recommendations(&mood)?.len()))?;
    println!("Guest with mood:       {:?}/call, {} results", per_call, count);

    let (per_call, count) =
        time_rounds(|| Ok(engine.get_similar_movies(first_movie, DEFAULT_SIMILAR_LIMIT)?.len()))?;
    println!(
        "Similar to movie {}:    {:?}/call, {} results",
        first_movie, per_call, count
    );

    Ok(())
}
