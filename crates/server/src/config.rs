//! Engine configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) gives
//! the stock weights. Example:
//!
//! ```toml
//! [scoring]
//! featured_bonus = 0.25
//!
//! [similarity]
//! max_neighbours = 20
//!
//! [cache]
//! max_entries = 50000
//! ttl_secs = 600
//! ```

use crate::error::ConfigError;
use pipeline::ScoringConfig;
use serde::Deserialize;
use sources::{CacheConfig, SimilarityConfig};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub similarity: SimilarityConfig,
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject weights and thresholds that cannot produce sensible scores.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        let weights = [
            ("scoring.content_weight", s.content_weight),
            ("scoring.genre_match_weight", s.genre_match_weight),
            ("scoring.rating_quality_weight", s.rating_quality_weight),
            ("scoring.collaborative_weight", s.collaborative_weight),
            ("scoring.local_bonus", s.local_bonus),
            ("scoring.year_weight", s.year_weight),
            ("scoring.popularity_weight", s.popularity_weight),
            ("scoring.mood_weight", s.mood_weight),
            ("scoring.featured_bonus", s.featured_bonus),
            ("scoring.min_score", s.min_score),
            ("similarity.min_similarity", self.similarity.min_similarity),
            ("similarity.min_movie_similarity", self.similarity.min_movie_similarity),
        ];
        for (field, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "cache.max_entries",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cache.ttl_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "cache.ttl_secs",
                reason: "must be greater than zero when set".to_string(),
            });
        }

        Ok(())
    }
}
