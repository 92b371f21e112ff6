use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, Movie, MovieId, UserId};
use rand::seq::IndexedRandom;
use rand::Rng;
use rayon::prelude::*;
use server::{
    EngineConfig, MovieRecommendation, RecommendationEngine, RecommendationRequest, DEFAULT_LIMIT,
    DEFAULT_SIMILAR_LIMIT,
};
use sources::user_context::build_user_context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Hybrid content/collaborative movie recommendations", long_about = None)]
struct Cli {
    /// Path to the catalog directory (users.dat, movies.dat, ratings.dat)
    #[arg(short, long, default_value = "data/catalog")]
    data_dir: PathBuf,

    /// Optional TOML file overriding scoring, similarity and cache settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a user, or for a guest when no user is given
    Recommend {
        /// User ID to personalize for
        #[arg(long)]
        user_id: Option<UserId>,

        /// Session token to record results under
        #[arg(long)]
        session_token: Option<String>,

        /// Genre to keep (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Free-text mood, e.g. "something funny for the kids" (guests only)
        #[arg(long)]
        mood: Option<String>,

        #[arg(long)]
        year_start: Option<u16>,

        #[arg(long)]
        year_end: Option<u16>,

        /// short (<= 90 min), medium (91-120) or long (> 120)
        #[arg(long)]
        runtime: Option<String>,

        /// Leave out local movies
        #[arg(long)]
        exclude_local: bool,

        /// Number of recommendations to return
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Show the reasons behind each recommendation
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Find movies similar to a given movie
    Similar {
        #[arg(long)]
        movie_id: MovieId,

        #[arg(long, default_value_t = DEFAULT_SIMILAR_LIMIT)]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show user profile, watch history and top picks
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,

        /// Number of personalized picks to show
        #[arg(long, default_value_t = 5)]
        picks: usize,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value_t = 100)]
        requests: usize,

        /// Number of worker threads
        #[arg(long, default_value_t = 4)]
        concurrent: usize,

        /// Share of requests made as guests
        #[arg(long, default_value_t = 0.3)]
        guest_ratio: f64,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    println!("Loading catalog from {}...", cli.data_dir.display());
    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&cli.data_dir).context("Failed to load catalog")?,
    );
    let (users, movies, ratings) = data_index.counts();
    println!(
        "{} Loaded {} users, {} movies, {} rating records in {:?}",
        "✓".green(),
        users,
        movies,
        ratings,
        start.elapsed()
    );

    let engine = RecommendationEngine::with_config(data_index, config);

    match cli.command {
        Commands::Recommend {
            user_id,
            session_token,
            genres,
            mood,
            year_start,
            year_end,
            runtime,
            exclude_local,
            limit,
            explain,
            json,
        } => {
            let mut request = match user_id {
                Some(id) => RecommendationRequest::for_user(id),
                None => RecommendationRequest::guest(),
            }
            .with_genres(genres)
            .with_year_range(year_start, year_end)
            .with_include_local(!exclude_local)
            .with_limit(limit);
            if let Some(token) = session_token {
                request = request.with_session_token(token);
            }
            if let Some(mood) = mood {
                request = request.with_mood(mood);
            }
            if let Some(runtime) = runtime {
                request = request.with_runtime(runtime);
            }
            handle_recommend(&engine, &request, explain, json)?
        }
        Commands::Similar {
            movie_id,
            limit,
            json,
        } => handle_similar(&engine, movie_id, limit, json)?,
        Commands::User { user_id, picks } => handle_user(&engine, user_id, picks)?,
        Commands::Search { title, limit } => handle_search(engine.data_index(), &title, limit),
        Commands::Benchmark {
            requests,
            concurrent,
            guest_ratio,
        } => handle_benchmark(&engine, requests, concurrent, guest_ratio)?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    request: &RecommendationRequest,
    explain: bool,
    json: bool,
) -> Result<()> {
    let response = engine
        .recommend(request)
        .context("Failed to get recommendations")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let heading = match request.audience.user_id() {
        Some(id) => format!("Recommendations for user {}", id),
        None => "Recommendations for guest".to_string(),
    };
    print_recommendations(&heading, &response.recommendations, explain);
    println!("{} {}", "Session:".dimmed(), response.session_token);
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(engine: &RecommendationEngine, movie_id: MovieId, limit: usize, json: bool) -> Result<()> {
    let similar = engine
        .get_similar_movies(movie_id, limit)
        .context("Failed to find similar movies")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&similar)?);
        return Ok(());
    }

    let title = engine
        .data_index()
        .get_movie(movie_id)
        .map(|m| m.title.clone())
        .unwrap_or_default();
    print_recommendations(&format!("More like {}", title), &similar, true);
    Ok(())
}

/// Handle the 'user' command
fn handle_user(engine: &RecommendationEngine, user_id: UserId, picks: usize) -> Result<()> {
    let data_index = engine.data_index();
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;
    let context = build_user_context(data_index, user_id)?;

    println!("{}", format!("User {} ({})", user_id, user.username).bold().blue());
    println!("{}Local movies: {}", "• ".green(), if user.include_local_movies { "yes" } else { "no" });
    println!("{}Watched: {}", "• ".cyan(), context.record_count);
    println!("{}Rated: {}", "• ".cyan(), context.rated_movies.len());
    if !context.rated_movies.is_empty() {
        let mean = context.rated_movies.values().sum::<f32>() / context.rated_movies.len() as f32;
        println!("{}Average rating: {:.2}", "• ".cyan(), mean);
    }
    if let Some(mean_year) = context.mean_year {
        println!("{}Typical era: {:.0}", "• ".cyan(), mean_year);
    }

    if !context.favorite_genres.is_empty() {
        let favorites: Vec<String> = context
            .favorite_genres
            .iter()
            .map(|(genre, count)| format!("{} ({})", genre, count))
            .collect();
        println!("{}Favorite genres: {}", "• ".cyan(), favorites.join(", "));
    }

    let mut top_rated: Vec<(MovieId, f32)> = context.rated_movies.iter().map(|(id, r)| (*id, *r)).collect();
    top_rated.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    if !top_rated.is_empty() {
        println!("Top rated movies:");
        for (movie_id, rating) in top_rated.iter().take(5) {
            if let Some(movie) = data_index.get_movie(*movie_id) {
                println!("  - {} (Rating: {})", movie.title, rating);
            }
        }
    }

    if picks > 0 {
        let recommendations = engine.get_user_recommendations(user_id, picks)?;
        print_recommendations("Top picks", &recommendations, true);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(data_index: &DataIndex, title: &str, limit: usize) {
    let needle = title.to_lowercase();

    // (relevance, movie): exact title first, then substring matches
    let mut matches: Vec<(u8, &Movie)> = data_index
        .movies()
        .filter_map(|movie| {
            let haystack = movie.title.to_lowercase();
            if haystack == needle {
                Some((0, movie))
            } else if haystack.contains(&needle) {
                Some((1, movie))
            } else {
                None
            }
        })
        .collect();
    matches.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| {
            b.1.external_rating
                .partial_cmp(&a.1.external_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for (_, movie) in matches.iter().take(limit) {
        let genres: Vec<&str> = movie.genres.iter().map(|g| g.name()).collect();
        println!(
            "{}: {} ({}) [{}] critics {} - {} watches",
            movie.id,
            movie.title,
            format_year(movie.year),
            genres.join(", "),
            movie
                .external_rating
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "n/a".to_string()),
            data_index.watch_count(movie.id)
        );
    }
}

/// Handle the 'benchmark' command
fn handle_benchmark(
    engine: &RecommendationEngine,
    requests: usize,
    concurrent: usize,
    guest_ratio: f64,
) -> Result<()> {
    let user_ids: Vec<UserId> = engine.data_index().user_ids().collect();
    let guest_ratio = if guest_ratio.is_finite() { guest_ratio.clamp(0.0, 1.0) } else { 0.0 };

    let mut rng = rand::rng();
    let batch: Vec<RecommendationRequest> = (0..requests)
        .map(|_| match user_ids.choose(&mut rng) {
            Some(&id) if !rng.random_bool(guest_ratio) => RecommendationRequest::for_user(id),
            _ => RecommendationRequest::guest().with_mood("something exciting and funny"),
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrent.max(1))
        .build()
        .context("Failed to build benchmark thread pool")?;

    let wall = Instant::now();
    let mut timings: Vec<Duration> = pool.install(|| {
        batch
            .par_iter()
            .map(|request| -> Result<Duration> {
                let start = Instant::now();
                engine.get_recommendations(request)?;
                Ok(start.elapsed())
            })
            .collect::<Result<Vec<Duration>>>()
    })?;
    let wall_time = wall.elapsed();

    if timings.is_empty() {
        println!("No requests made.");
        return Ok(());
    }
    debug!("Collected {} timings", timings.len());

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} on {} threads", timings.len(), concurrent.max(1));
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn format_year(year: Option<u16>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string())
}

/// Helper function to format and print recommendations
fn print_recommendations(heading: &str, recommendations: &[MovieRecommendation], explain: bool) {
    println!("{}", format!("{}:", heading).bold().blue());
    if recommendations.is_empty() {
        println!("  (nothing scored above the threshold)");
        return;
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let genres: Vec<&str> = rec.movie.genres.iter().map(|g| g.name()).collect();
        let mut badges = String::new();
        if rec.movie.is_featured {
            badges.push_str(&format!(" {}", "featured".yellow()));
        }
        if rec.movie.is_local {
            badges.push_str(&format!(" {}", "local".magenta()));
        }
        println!(
            "{}. {} ({}) [{}] - Score: {:.2}{}",
            (i + 1).to_string().green(),
            rec.movie.title,
            format_year(rec.movie.year),
            genres.join(", "),
            rec.score,
            badges
        );
        if explain && !rec.reasons.is_empty() {
            println!("   {}", rec.reasons.join("; ").dimmed());
        }
    }
}
