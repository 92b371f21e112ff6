//! Final ranking shared by every scorer.

use crate::types::ScoredMovie;

/// Drop scores at or below `min_score`, sort best first and keep `limit`.
///
/// The sort is stable: equal scores keep their candidate order.
pub fn rank_and_select(scored: Vec<ScoredMovie>, min_score: f32, limit: usize) -> Vec<ScoredMovie> {
    let mut ranked: Vec<ScoredMovie> = scored
        .into_iter()
        .filter(|s| s.score > min_score)
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(movie_id: u32, score: f32) -> ScoredMovie {
        ScoredMovie::new(movie_id, score, Vec::new())
    }

    #[test]
    fn test_sorts_descending_and_truncates() {
        let ranked = rank_and_select(
            vec![scored(1, 0.4), scored(2, 0.9), scored(3, 0.6), scored(4, 0.5)],
            0.3,
            3,
        );
        let ids: Vec<u32> = ranked.iter().map(|s| s.movie_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let ranked = rank_and_select(vec![scored(1, 0.3), scored(2, 0.31)], 0.3, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].movie_id, 2);
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let ranked = rank_and_select(vec![scored(5, 0.5), scored(1, 0.5), scored(3, 0.5)], 0.3, 10);
        let ids: Vec<u32> = ranked.iter().map(|s| s.movie_id).collect();
        assert_eq!(ids, vec![5, 1, 3]);
    }

    #[test]
    fn test_nan_scores_do_not_panic() {
        let ranked = rank_and_select(vec![scored(1, f32::NAN), scored(2, 0.8)], 0.3, 10);
        // NaN fails the threshold comparison
        assert_eq!(ranked.len(), 1);
    }
}
