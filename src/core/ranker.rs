use crate::domain::model::ScoredCandidate;
use std::cmp::Ordering;

/// Sorts by score descending and keeps the first `top_n`.
///
/// The sort is stable: equal scores keep the order in which candidates were
/// enumerated. NaN scores sort last. A `top_n` above the candidate count
/// returns every candidate.
pub fn rank(mut scored: Vec<ScoredCandidate>, top_n: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| descending(a.score, b.score));
    scored.truncate(top_n);
    scored
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ranked: &[ScoredCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.item_id.as_str()).collect()
    }

    #[test]
    fn test_sorts_descending() {
        let ranked = rank(
            vec![
                ScoredCandidate::new("a", 0.1),
                ScoredCandidate::new("b", 0.9),
                ScoredCandidate::new("c", 0.5),
            ],
            3,
        );
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let ranked = rank(
            vec![
                ScoredCandidate::new("C", 0.62),
                ScoredCandidate::new("D", 0.62),
                ScoredCandidate::new("E", 0.18),
            ],
            2,
        );
        assert_eq!(ids(&ranked), vec!["C", "D"]);
    }

    #[test]
    fn test_top_n_larger_than_candidates() {
        let ranked = rank(
            vec![ScoredCandidate::new("a", 1.0), ScoredCandidate::new("b", 2.0)],
            10,
        );
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_all_zero_scores_keep_input_order() {
        let candidates: Vec<ScoredCandidate> =
            ["w", "x", "y", "z"].iter().map(|id| ScoredCandidate::new(*id, 0.0)).collect();
        let ranked = rank(candidates, 3);
        assert_eq!(ids(&ranked), vec!["w", "x", "y"]);
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let ranked = rank(vec![ScoredCandidate::new("a", -0.0), ScoredCandidate::new("b", 0.0)], 2);
        assert_eq!(ids(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn test_nan_sorts_last() {
        let ranked = rank(
            vec![
                ScoredCandidate::new("nan", f64::NAN),
                ScoredCandidate::new("low", -1.0),
                ScoredCandidate::new("high", 3.0),
            ],
            3,
        );
        assert_eq!(ids(&ranked), vec!["high", "low", "nan"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(Vec::new(), 5).is_empty());
    }
}
