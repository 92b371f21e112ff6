//! End-to-end tests for the recommendation engine.

use data_loader::{DataIndex, Genre, Movie, MovieId, Rating, User, UserId};
use server::{EngineConfig, InMemorySessionRecorder, RecommendationEngine, RecommendationRequest};
use std::sync::Arc;

fn add_user(index: &mut DataIndex, id: UserId, include_local_movies: bool) {
    index.insert_user(User {
        id,
        username: format!("user{}", id),
        include_local_movies,
    });
}

fn add_rating(index: &mut DataIndex, user_id: UserId, movie_id: MovieId, rating: f32) {
    index.insert_rating(Rating {
        user_id,
        movie_id,
        rating: Some(rating),
        timestamp: 978300760,
    });
}

/// A small catalog where users 1 and 2 share taste and user 3 is opposite.
fn create_catalog() -> Arc<DataIndex> {
    build_catalog(true)
}

/// Same catalog; with `user_two_agrees` false user 2 rates like user 3.
fn build_catalog(user_two_agrees: bool) -> Arc<DataIndex> {
    let mut index = DataIndex::new();

    let titles = [
        (1, "Night Raid", 1999, 125, vec![Genre::Action, Genre::Thriller], 7.8),
        (2, "Star Drift", 2001, 118, vec![Genre::SciFi, Genre::Adventure], 8.1),
        (3, "Quiet Harbour", 2003, 102, vec![Genre::Drama, Genre::Romance], 7.0),
        (4, "Punchline", 2000, 88, vec![Genre::Comedy], 6.4),
        (5, "Laugh Lines", 2002, 84, vec![Genre::Comedy, Genre::Family], 7.2),
        (6, "Cold Case", 1998, 131, vec![Genre::Crime, Genre::Thriller], 8.4),
        (7, "Deep Orbit", 2004, 141, vec![Genre::SciFi, Genre::Action], 8.8),
        (8, "Back Roads", 2003, 97, vec![Genre::Drama], 6.9),
    ];
    for (id, title, year, runtime, genres, external) in titles {
        let mut movie = Movie::new(id, title, Some(year), genres);
        movie.runtime = Some(runtime);
        movie.external_rating = Some(external);
        movie.is_featured = id == 5;
        movie.is_local = id == 8;
        index.insert_movie(movie);
    }

    add_user(&mut index, 1, true);
    add_user(&mut index, 2, false);
    add_user(&mut index, 3, false);
    add_user(&mut index, 4, false);

    let history = [(1, 5.0), (2, 4.5), (3, 2.0), (4, 1.5), (5, 2.5), (6, 5.0)];
    for (movie_id, value) in history {
        add_rating(&mut index, 1, movie_id, value);
        add_rating(&mut index, 2, movie_id, if user_two_agrees { value } else { 6.0 - value });
        add_rating(&mut index, 3, movie_id, 6.0 - value);
    }
    add_rating(&mut index, 2, 7, 5.0);
    add_rating(&mut index, 3, 7, 1.0);

    Arc::new(index)
}

#[test]
fn test_user_recommendations_use_similar_users() {
    let engine = RecommendationEngine::new(create_catalog());

    let results = engine.get_recommendations(&RecommendationRequest::for_user(1)).unwrap();
    let ids: Vec<MovieId> = results.iter().map(|r| r.movie.id).collect();

    assert!(ids.iter().all(|id| *id > 6), "rated movies are never recommended");
    assert_eq!(ids.first(), Some(&7));
    assert!(results[0].reasons.contains(&"Liked by users with similar taste".to_string()));
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.iter().all(|r| r.score > 0.3));
}

#[test]
fn test_excluding_local_movies() {
    let engine = RecommendationEngine::new(create_catalog());

    let with_local = engine.get_recommendations(&RecommendationRequest::for_user(1)).unwrap();
    assert!(with_local.iter().any(|r| r.movie.id == 8));

    let without_local = engine
        .get_recommendations(&RecommendationRequest::for_user(1).with_include_local(false))
        .unwrap();
    assert!(without_local.iter().all(|r| !r.movie.is_local));
}

#[test]
fn test_guest_with_filters_and_mood() {
    let engine = RecommendationEngine::new(create_catalog());

    let request = RecommendationRequest::guest()
        .with_genres(["Comedy"])
        .with_runtime("short")
        .with_mood("something funny for the kids");
    let results = engine.get_recommendations(&request).unwrap();

    assert_eq!(results[0].movie.id, 5);
    assert!(results[0].reasons.contains(&"Matches your mood".to_string()));
    assert!(results[0].reasons.contains(&"Featured movie".to_string()));
    assert!(results.iter().all(|r| r.movie.has_genre(Genre::Comedy)));
    assert!(results.iter().all(|r| r.movie.runtime.is_some_and(|rt| rt <= 90)));
}

#[test]
fn test_guest_mood_text_only() {
    let engine = RecommendationEngine::new(create_catalog());

    let request = RecommendationRequest::guest().with_mood("funny family movie");
    let results = engine.get_recommendations(&request).unwrap();
    let ids: Vec<MovieId> = results.iter().map(|r| r.movie.id).collect();

    // Movie 5: popularity (0.72*0.6 + 0.03*0.4)*0.5 + mood 1.0*0.5 + featured 0.3
    // Movie 4: 0.396*0.5 + half the mood tags 0.5*0.5
    assert_eq!(ids, vec![5, 4]);
    assert!((results[0].score - 1.022).abs() < 1e-4);
    assert_eq!(
        results[0].reasons,
        vec!["Matches your mood".to_string(), "Featured movie".to_string()]
    );
    assert!((results[1].score - 0.448).abs() < 1e-4);
    assert!(results[1].reasons.is_empty());
}

#[test]
fn test_limit_zero_is_empty() {
    let engine = RecommendationEngine::new(create_catalog());
    let results = engine
        .get_recommendations(&RecommendationRequest::guest().with_limit(0))
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_user_without_history_gets_no_collaborative_reason() {
    let engine = RecommendationEngine::new(create_catalog());
    let results = engine.get_user_recommendations(4, 20).unwrap();
    assert!(results
        .iter()
        .all(|r| !r.reasons.contains(&"Liked by users with similar taste".to_string())));
}

#[test]
fn test_session_token_reuse() {
    let recorder = Arc::new(InMemorySessionRecorder::new());
    let engine = RecommendationEngine::new(create_catalog()).with_recorder(recorder.clone());

    let first = engine
        .recommend(&RecommendationRequest::guest().with_session_token("tok-1"))
        .unwrap();
    let second = engine
        .recommend(
            &RecommendationRequest::guest()
                .with_session_token("tok-1")
                .with_genres(["Drama"]),
        )
        .unwrap();

    assert_eq!(first.session_token, "tok-1");
    assert_eq!(second.session_token, "tok-1");
    assert_eq!(recorder.len().unwrap(), 1);

    let session = recorder.get_session("tok-1").unwrap().unwrap();
    let recorded: Vec<MovieId> = session.results.iter().map(|r| r.movie_id).collect();
    let served: Vec<MovieId> = second.recommendations.iter().map(|r| r.movie.id).collect();
    assert_eq!(recorded, served);
    assert_eq!(session.parameters.genres, vec!["Drama".to_string()]);
}

#[test]
fn test_refresh_rebuilds_neighbours() {
    let similar_users = "Liked by users with similar taste".to_string();
    let mut engine = RecommendationEngine::new(create_catalog());

    let before = engine.get_user_recommendations(1, 10).unwrap();
    let movie_7 = before.iter().find(|r| r.movie.id == 7).unwrap();
    assert!(movie_7.reasons.contains(&similar_users));

    // User 2 still loves movie 7 but no longer correlates with user 1
    engine.refresh(build_catalog(false));

    let after = engine.get_user_recommendations(1, 10).unwrap();
    assert!(after.iter().all(|r| !r.reasons.contains(&similar_users)));
    let rescored = after.iter().find(|r| r.movie.id == 7).map(|r| r.score);
    assert!(rescored.is_none_or(|score| score < movie_7.score));
}

#[test]
fn test_invalidate_user_recomputes_same_results() {
    let engine = RecommendationEngine::new(create_catalog());

    let before = engine.get_user_recommendations(1, 10).unwrap();
    engine.invalidate_user(2);
    let after = engine.get_user_recommendations(1, 10).unwrap();

    assert_eq!(before, after);
}

#[test]
fn test_custom_config() {
    let config = EngineConfig::from_toml("[scoring]\nmin_score = 5.0\n").unwrap();
    let engine = RecommendationEngine::with_config(create_catalog(), config);

    assert!(engine
        .get_recommendations(&RecommendationRequest::guest())
        .unwrap()
        .is_empty());
}

#[test]
fn test_recommendation_serializes() {
    let engine = RecommendationEngine::new(create_catalog());
    let results = engine.get_similar_movies(2, 3).unwrap();

    let json = serde_json::to_value(&results).unwrap();
    assert!(json[0]["movie"]["title"].is_string());
    assert!(json[0]["reasons"].is_array());
}
