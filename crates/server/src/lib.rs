//! Server crate for the ReelRecs recommendation engine.
//!
//! This crate contains the engine facade that coordinates filtering,
//! scoring and session recording, plus its configuration.

pub mod config;
pub mod engine;
pub mod error;
pub mod request;
pub mod session;

pub use config::EngineConfig;
pub use engine::{MovieRecommendation, RecommendationEngine, RecommendationResponse, DEFAULT_SIMILAR_LIMIT};
pub use error::{ConfigError, EngineError};
pub use request::{Audience, RecommendationRequest, DEFAULT_LIMIT};
pub use session::{
    synthesize_token, InMemorySessionRecorder, RecordedResult, RecorderError, Session, SessionParameters,
    SessionRecorder, SessionToken,
};
