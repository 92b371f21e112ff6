//! Bounded memoization of pairwise similarity results.
//!
//! One `SimilarityCache` belongs to one engine instance. Entries are keyed by
//! unordered id pairs, capped at `max_entries` per map and optionally expire
//! after `ttl_secs`. Callers invalidate explicitly when ratings change.

use data_loader::{MovieId, UserId};
use moka::sync::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Unordered pair of entity ids; `(a, b)` and `(b, a)` produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(u32, u32);

impl PairKey {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0 == id || self.1 == id
    }
}

/// Cache sizing and expiry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries kept in each similarity map
    pub max_entries: u64,
    /// Optional time-to-live for every entry
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100_000,
            ttl_secs: None,
        }
    }
}

/// Ranked neighbours of a user: (other user, similarity), best first.
pub type Neighbours = Arc<Vec<(UserId, f32)>>;

pub struct SimilarityCache {
    user_pairs: Cache<PairKey, f32>,
    movie_pairs: Cache<PairKey, f32>,
    neighbours: Cache<UserId, Neighbours>,
}

impl SimilarityCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            user_pairs: build_cache(config),
            movie_pairs: build_cache(config),
            neighbours: build_cache(config),
        }
    }

    /// Similarity between two users, computed once per unordered pair.
    pub fn user_similarity(&self, a: UserId, b: UserId, compute: impl FnOnce() -> f32) -> f32 {
        self.user_pairs.get_with(PairKey::new(a, b), compute)
    }

    /// Similarity between two movies, computed once per unordered pair.
    pub fn movie_similarity(&self, a: MovieId, b: MovieId, compute: impl FnOnce() -> f32) -> f32 {
        self.movie_pairs.get_with(PairKey::new(a, b), compute)
    }

    /// Neighbour list for a user, computed once until invalidated.
    pub fn neighbours(&self, user_id: UserId, compute: impl FnOnce() -> Vec<(UserId, f32)>) -> Neighbours {
        self.neighbours.get_with(user_id, || Arc::new(compute()))
    }

    /// Drop everything derived from a user's ratings.
    ///
    /// Any neighbour list may mention the user, so all of them go.
    pub fn invalidate_user(&self, user_id: UserId) {
        debug!("Invalidating cached similarities for user {}", user_id);
        if let Err(e) = self
            .user_pairs
            .invalidate_entries_if(move |key, _| key.contains(user_id))
        {
            warn!("Predicate invalidation unavailable ({}), clearing user pairs", e);
            self.user_pairs.invalidate_all();
        }
        self.neighbours.invalidate_all();
    }

    /// Drop every cached value, e.g. after the catalog is reloaded.
    pub fn clear(&self) {
        debug!("Clearing similarity cache");
        self.user_pairs.invalidate_all();
        self.movie_pairs.invalidate_all();
        self.neighbours.invalidate_all();
    }
}

impl Default for SimilarityCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

fn build_cache<K, V>(config: &CacheConfig) -> Cache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let mut builder = Cache::builder()
        .max_capacity(config.max_entries)
        .support_invalidation_closures();
    if let Some(ttl) = config.ttl_secs {
        builder = builder.time_to_live(Duration::from_secs(ttl));
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new(3, 7), PairKey::new(7, 3));
        assert!(PairKey::new(3, 7).contains(7));
        assert!(!PairKey::new(3, 7).contains(5));
    }

    #[test]
    fn test_user_similarity_computed_once_per_pair() {
        let cache = SimilarityCache::default();

        assert_eq!(cache.user_similarity(1, 2, || 0.5), 0.5);
        // Reversed pair hits the cached value
        assert_eq!(cache.user_similarity(2, 1, || panic!("should be cached")), 0.5);
    }

    #[test]
    fn test_invalidate_user_recomputes() {
        let cache = SimilarityCache::default();
        cache.user_similarity(1, 2, || 0.5);
        cache.user_similarity(3, 4, || 0.7);
        cache.neighbours(1, || vec![(2, 0.5)]);

        cache.invalidate_user(2);

        assert_eq!(cache.user_similarity(1, 2, || 0.9), 0.9);
        assert_eq!(cache.user_similarity(3, 4, || panic!("unrelated pair kept")), 0.7);
        assert!(cache.neighbours(1, Vec::new).is_empty());
    }

    #[test]
    fn test_clear_drops_movie_pairs() {
        let cache = SimilarityCache::default();
        cache.movie_similarity(10, 20, || 0.4);
        cache.clear();
        assert_eq!(cache.movie_similarity(20, 10, || 0.8), 0.8);
    }
}
