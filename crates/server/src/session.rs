//! Recording of served recommendations per session.
//!
//! Every request is recorded under a session token so feedback can later be
//! tied to what was shown. Reusing a token updates the session's parameters
//! and replaces its results.

use crate::engine::MovieRecommendation;
use crate::request::RecommendationRequest;
use chrono::{DateTime, Utc};
use data_loader::{MovieId, UserId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

pub type SessionToken = String;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecorderError {
    #[error("Session store lock poisoned")]
    Poisoned,

    #[error("Session storage failed: {0}")]
    Storage(String),
}

/// The request parameters a session was created or last updated with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionParameters {
    pub session_token: Option<SessionToken>,
    pub user_id: Option<UserId>,
    pub genres: Vec<String>,
    pub mood_text: String,
    pub year_start: Option<u16>,
    pub year_end: Option<u16>,
    pub runtime_preference: String,
    pub include_local: bool,
}

impl From<&RecommendationRequest> for SessionParameters {
    fn from(request: &RecommendationRequest) -> Self {
        Self {
            session_token: request.session_token.clone(),
            user_id: request.audience.user_id(),
            genres: request.genres.clone(),
            mood_text: request.mood_text.clone().unwrap_or_default(),
            year_start: request.year_start,
            year_end: request.year_end,
            runtime_preference: request.runtime.clone().unwrap_or_default(),
            include_local: request.include_local,
        }
    }
}

/// One served result, in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedResult {
    pub movie_id: MovieId,
    pub score: f32,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub parameters: SessionParameters,
    pub results: Vec<RecordedResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persists sessions and their results.
pub trait SessionRecorder: Send + Sync {
    /// Create or update the session and replace its results.
    ///
    /// Returns the token the session was stored under.
    fn record(
        &self,
        parameters: &SessionParameters,
        results: &[MovieRecommendation],
    ) -> Result<SessionToken, RecorderError>;
}

/// `session_{user id or "guest"}_{unix seconds}`
pub fn synthesize_token(user_id: Option<UserId>, now: DateTime<Utc>) -> SessionToken {
    let owner = user_id.map_or_else(|| "guest".to_string(), |id| id.to_string());
    format!("session_{}_{}", owner, now.timestamp())
}

/// Sessions kept in process memory.
#[derive(Default)]
pub struct InMemorySessionRecorder {
    sessions: Mutex<HashMap<SessionToken, Session>>,
}

impl InMemorySessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_session(&self, token: &str) -> Result<Option<Session>, RecorderError> {
        let sessions = self.sessions.lock().map_err(|_| RecorderError::Poisoned)?;
        Ok(sessions.get(token).cloned())
    }

    pub fn len(&self) -> Result<usize, RecorderError> {
        let sessions = self.sessions.lock().map_err(|_| RecorderError::Poisoned)?;
        Ok(sessions.len())
    }

    pub fn is_empty(&self) -> Result<bool, RecorderError> {
        Ok(self.len()? == 0)
    }
}

impl SessionRecorder for InMemorySessionRecorder {
    fn record(
        &self,
        parameters: &SessionParameters,
        results: &[MovieRecommendation],
    ) -> Result<SessionToken, RecorderError> {
        let now = Utc::now();
        let token = parameters
            .session_token
            .clone()
            .unwrap_or_else(|| synthesize_token(parameters.user_id, now));

        let recorded: Vec<RecordedResult> = results
            .iter()
            .map(|r| RecordedResult {
                movie_id: r.movie.id,
                score: r.score,
                reasons: r.reasons.clone(),
            })
            .collect();

        let mut stored_parameters = parameters.clone();
        stored_parameters.session_token = Some(token.clone());

        let mut sessions = self.sessions.lock().map_err(|_| RecorderError::Poisoned)?;
        match sessions.get_mut(&token) {
            Some(session) => {
                debug!("Updating session {} with {} results", token, recorded.len());
                session.parameters = stored_parameters;
                session.results = recorded;
                session.updated_at = now;
            }
            None => {
                debug!("Creating session {} with {} results", token, recorded.len());
                sessions.insert(
                    token.clone(),
                    Session {
                        token: token.clone(),
                        parameters: stored_parameters,
                        results: recorded,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }

        Ok(token)
    }
}
