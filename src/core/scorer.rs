//! Hybrid scoring: fuses two predictors into one score per candidate.
//!
//! Both predictors are fail-soft. A `PredictionUnavailable` from either one
//! contributes `0.0` to the fused score and is never surfaced to callers;
//! partial model coverage is expected for cold-start users and items.

use crate::domain::ports::{PredictionUnavailable, Predictor};
use crate::utils::error::Result;
use crate::utils::validation::{validate_weight, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub weight_a: f64,
    pub weight_b: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weight_a: 0.6,
            weight_b: 0.4,
        }
    }
}

impl Validate for ScoringWeights {
    fn validate(&self) -> Result<()> {
        validate_weight("scoring.weight_a", self.weight_a)?;
        validate_weight("scoring.weight_b", self.weight_b)?;
        Ok(())
    }
}

/// Fused score plus the per-predictor outcome it was built from.
/// `None` means that predictor was unavailable and contributed `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedScore {
    pub value: f64,
    pub a: Option<f64>,
    pub b: Option<f64>,
}

/// Per-query tally of how often each predictor could not score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    pub scored: usize,
    pub a_unavailable: usize,
    pub b_unavailable: usize,
}

impl Coverage {
    pub fn record(&mut self, a: Option<f64>, b: Option<f64>) {
        self.scored += 1;
        if a.is_none() {
            self.a_unavailable += 1;
        }
        if b.is_none() {
            self.b_unavailable += 1;
        }
    }
}

/// Calls `predictor` and classifies a failure instead of propagating it.
pub fn fail_soft<P: Predictor + ?Sized>(predictor: &P, user_id: &str, item_id: &str) -> Option<f64> {
    match predictor.predict(user_id, item_id) {
        Ok(score) if score.is_finite() => Some(score),
        Ok(_) => {
            tracing::trace!(
                predictor = predictor.name(),
                user_id,
                item_id,
                reason = %PredictionUnavailable::NonFinite,
                "prediction unavailable"
            );
            None
        }
        Err(reason) => {
            tracing::trace!(
                predictor = predictor.name(),
                user_id,
                item_id,
                reason = %reason,
                "prediction unavailable"
            );
            None
        }
    }
}

pub struct HybridScorer<A: Predictor, B: Predictor> {
    predictor_a: A,
    predictor_b: B,
    weights: ScoringWeights,
}

impl<A: Predictor, B: Predictor> HybridScorer<A, B> {
    pub fn new(predictor_a: A, predictor_b: B, weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            predictor_a,
            predictor_b,
            weights,
        })
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn score(&self, user_id: &str, item_id: &str) -> f64 {
        self.score_detailed(user_id, item_id).value
    }

    pub fn score_detailed(&self, user_id: &str, item_id: &str) -> FusedScore {
        let a = fail_soft(&self.predictor_a, user_id, item_id);
        let b = fail_soft(&self.predictor_b, user_id, item_id);
        let value = self.weights.weight_a * a.unwrap_or(0.0) + self.weights.weight_b * b.unwrap_or(0.0);

        FusedScore { value, a, b }
    }

    /// Predictor B alone, fail-soft. Used by the similar-books flow.
    pub fn score_b(&self, user_id: &str, item_id: &str) -> Option<f64> {
        fail_soft(&self.predictor_b, user_id, item_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Table-driven predictor; unknown pairs are unavailable.
    pub(crate) struct MockPredictor {
        name: String,
        scores: HashMap<(String, String), f64>,
    }

    impl MockPredictor {
        pub(crate) fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                scores: HashMap::new(),
            }
        }

        pub(crate) fn with(mut self, user_id: &str, item_id: &str, score: f64) -> Self {
            self.scores.insert((user_id.to_string(), item_id.to_string()), score);
            self
        }
    }

    impl Predictor for MockPredictor {
        fn name(&self) -> &str {
            &self.name
        }

        fn predict(&self, user_id: &str, item_id: &str) -> std::result::Result<f64, PredictionUnavailable> {
            self.scores
                .get(&(user_id.to_string(), item_id.to_string()))
                .copied()
                .ok_or_else(|| PredictionUnavailable::UnknownItem(item_id.to_string()))
        }
    }

    #[test]
    fn test_fused_score_uses_weights() {
        let a = MockPredictor::new("a").with("42", "C", 0.9);
        let b = MockPredictor::new("b").with("42", "C", 0.2);
        let scorer = HybridScorer::new(a, b, ScoringWeights::default()).unwrap();

        let fused = scorer.score_detailed("42", "C");
        assert!((fused.value - 0.62).abs() < 1e-9);
        assert_eq!(fused.a, Some(0.9));
        assert_eq!(fused.b, Some(0.2));
    }

    #[test]
    fn test_unavailable_predictor_contributes_zero() {
        let a = MockPredictor::new("a");
        let b = MockPredictor::new("b").with("42", "C", 5.0);
        let scorer = HybridScorer::new(a, b, ScoringWeights::default()).unwrap();

        let fused = scorer.score_detailed("42", "C");
        assert_eq!(fused.a, None);
        assert!((fused.value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_both_unavailable_scores_zero() {
        let scorer = HybridScorer::new(MockPredictor::new("a"), MockPredictor::new("b"), ScoringWeights::default())
            .unwrap();
        assert_eq!(scorer.score("nobody", "nothing"), 0.0);
    }

    #[test]
    fn test_non_finite_prediction_is_unavailable() {
        let a = MockPredictor::new("a").with("42", "C", f64::NAN);
        let b = MockPredictor::new("b").with("42", "C", 1.0);
        let scorer = HybridScorer::new(a, b, ScoringWeights::default()).unwrap();

        let fused = scorer.score_detailed("42", "C");
        assert_eq!(fused.a, None);
        assert!((fused.value - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_custom_weights() {
        let a = MockPredictor::new("a").with("1", "X", 10.0);
        let b = MockPredictor::new("b").with("1", "X", 0.0);
        let weights = ScoringWeights {
            weight_a: 1.0,
            weight_b: 0.0,
        };
        let scorer = HybridScorer::new(a, b, weights).unwrap();
        assert_eq!(scorer.score("1", "X"), 10.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ScoringWeights {
            weight_a: -0.5,
            weight_b: 0.4,
        };
        assert!(HybridScorer::new(MockPredictor::new("a"), MockPredictor::new("b"), weights).is_err());
    }

    #[test]
    fn test_coverage_tally() {
        let mut coverage = Coverage::default();
        coverage.record(Some(1.0), None);
        coverage.record(None, None);
        assert_eq!(
            coverage,
            Coverage {
                scored: 2,
                a_unavailable: 1,
                b_unavailable: 2
            }
        );
    }
}
