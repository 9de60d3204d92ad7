use crate::core::filter::{eligible_candidates, Exclusion};
use crate::core::ranker::rank;
use crate::core::resolver::resolve;
use crate::core::scorer::{Coverage, HybridScorer, ScoringWeights};
use crate::domain::model::{
    LoadedAssets, Query, QueryOutcome, Recommendation, ScoredCandidate, SimilarBooks,
};
use crate::domain::ports::{CatalogStore, Predictor};
use crate::utils::error::{RecError, Result};

/// Scores, filters and ranks against assets loaded once at startup.
///
/// Every query scans the full item universe; nothing is cached between
/// queries. Identical queries against the same assets return identical
/// results.
pub struct RecommendationEngine<C: CatalogStore, A: Predictor, B: Predictor> {
    catalog: C,
    scorer: HybridScorer<A, B>,
}

impl<C: CatalogStore, A: Predictor, B: Predictor> RecommendationEngine<C, A, B> {
    pub fn new(assets: LoadedAssets<C, A, B>, weights: ScoringWeights) -> Result<Self> {
        let scorer = HybridScorer::new(assets.predictor_a, assets.predictor_b, weights)?;
        Ok(Self {
            catalog: assets.catalog,
            scorer,
        })
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn weights(&self) -> ScoringWeights {
        self.scorer.weights()
    }

    pub fn run(&self, query: &Query) -> Result<QueryOutcome> {
        match query {
            Query::User { user_id, top_n } => Ok(QueryOutcome::ForUser {
                user_id: user_id.clone(),
                recommendations: self.recommend_for_user(user_id, *top_n)?,
            }),
            Query::Title { text, top_n } => Ok(QueryOutcome::Similar(self.recommend_similar(text, *top_n)?)),
        }
    }

    /// Hybrid recommendations for a known user, excluding books they have read.
    pub fn recommend_for_user(&self, user_id: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        check_top_n(top_n)?;
        if !self.catalog.contains_user(user_id) {
            return Err(RecError::UnknownUser {
                user_id: user_id.to_string(),
            });
        }

        let candidates = eligible_candidates(Exclusion::ConsumedBy(user_id), &self.catalog);
        let mut coverage = Coverage::default();
        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|item_id| {
                let fused = self.scorer.score_detailed(user_id, item_id);
                coverage.record(fused.a, fused.b);
                ScoredCandidate::new(item_id.clone(), fused.value)
            })
            .collect();

        tracing::debug!(
            "Scored {} candidates for user {} (predictor A unavailable: {}, predictor B unavailable: {})",
            coverage.scored,
            user_id,
            coverage.a_unavailable,
            coverage.b_unavailable
        );

        Ok(self.hydrate(rank(scored, top_n)))
    }

    /// Books similar to the first title containing `text`.
    ///
    /// Candidates are scored by predictor B for the user who owns the
    /// matched row. Returns `RecError::NotFound` when no title matches.
    pub fn recommend_similar(&self, text: &str, top_n: usize) -> Result<SimilarBooks> {
        check_top_n(top_n)?;
        if text.trim().is_empty() {
            return Err(RecError::InvalidQuery {
                reason: "title text cannot be empty".to_string(),
            });
        }

        let reference = resolve(&self.catalog, text).ok_or_else(|| RecError::NotFound {
            query: text.to_string(),
        })?;
        tracing::info!(
            "Showing results for: {} (anchor user {})",
            reference.item.title,
            reference.anchor_user
        );

        let candidates = eligible_candidates(Exclusion::Reference(&reference.item.id), &self.catalog);
        let mut unavailable = 0usize;
        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|item_id| {
                let score = self.scorer.score_b(&reference.anchor_user, item_id).unwrap_or_else(|| {
                    unavailable += 1;
                    0.0
                });
                ScoredCandidate::new(item_id.clone(), score)
            })
            .collect();

        tracing::debug!(
            "Scored {} similar candidates (predictor B unavailable: {})",
            scored.len(),
            unavailable
        );

        Ok(SimilarBooks {
            reference,
            recommendations: self.hydrate(rank(scored, top_n)),
        })
    }

    fn hydrate(&self, ranked: Vec<ScoredCandidate>) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .filter_map(|candidate| match self.catalog.get_item(&candidate.item_id) {
                Some(item) => Some(Recommendation {
                    item: item.clone(),
                    score: candidate.score,
                }),
                None => {
                    tracing::warn!("Ranked item {} has no catalog metadata, skipping", candidate.item_id);
                    None
                }
            })
            .collect()
    }
}

fn check_top_n(top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(RecError::InvalidQuery {
            reason: "top_n must be a positive integer".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::tests::sample_catalog;
    use crate::adapters::catalog::InMemoryCatalog;
    use crate::core::scorer::tests::MockPredictor;

    type TestEngine = RecommendationEngine<InMemoryCatalog, MockPredictor, MockPredictor>;

    fn scenario_engine() -> TestEngine {
        let predictor_a = MockPredictor::new("a")
            .with("42", "C", 0.9)
            .with("42", "D", 0.5)
            .with("42", "E", 0.1);
        let predictor_b = MockPredictor::new("b")
            .with("42", "C", 0.2)
            .with("42", "D", 0.8)
            .with("42", "E", 0.3)
            .with("7", "E", 4.0)
            .with("7", "B", 2.0);

        RecommendationEngine::new(
            LoadedAssets {
                catalog: sample_catalog(),
                predictor_a,
                predictor_b,
            },
            ScoringWeights::default(),
        )
        .unwrap()
    }

    fn ids(recommendations: &[Recommendation]) -> Vec<&str> {
        recommendations.iter().map(|r| r.item.id.as_str()).collect()
    }

    #[test]
    fn test_tie_broken_by_universe_order() {
        let engine = scenario_engine();
        let recommendations = engine.recommend_for_user("42", 2).unwrap();

        assert_eq!(ids(&recommendations), vec!["C", "D"]);
        assert!((recommendations[0].score - 0.62).abs() < 1e-9);
        assert!((recommendations[1].score - 0.62).abs() < 1e-9);
    }

    #[test]
    fn test_consumed_items_excluded() {
        let engine = scenario_engine();
        let recommendations = engine.recommend_for_user("42", 10).unwrap();

        assert_eq!(recommendations.len(), 3);
        assert!(recommendations.iter().all(|r| r.item.id != "A" && r.item.id != "B"));
        assert!(recommendations.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_all_predictors_unavailable_still_fills_result() {
        let engine: TestEngine = RecommendationEngine::new(
            LoadedAssets {
                catalog: sample_catalog(),
                predictor_a: MockPredictor::new("a"),
                predictor_b: MockPredictor::new("b"),
            },
            ScoringWeights::default(),
        )
        .unwrap();

        let recommendations = engine.recommend_for_user("42", 2).unwrap();
        assert_eq!(ids(&recommendations), vec!["C", "D"]);
        assert!(recommendations.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_zero_top_n_is_invalid() {
        let engine = scenario_engine();
        assert!(matches!(
            engine.recommend_for_user("42", 0),
            Err(RecError::InvalidQuery { .. })
        ));
        assert!(matches!(
            engine.recommend_similar("harry", 0),
            Err(RecError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_unknown_user_fails_fast() {
        let engine = scenario_engine();
        assert!(matches!(
            engine.recommend_for_user("999", 5),
            Err(RecError::UnknownUser { .. })
        ));
    }

    #[test]
    fn test_similar_excludes_reference_and_uses_anchor_user() {
        let engine = scenario_engine();
        // "Wild" matches C, owned by user 7 in the sample rows.
        let similar = engine.recommend_similar("wild", 3).unwrap();

        assert_eq!(similar.reference.item.id, "C");
        assert_eq!(similar.reference.anchor_user, "7");
        assert!(similar.recommendations.iter().all(|r| r.item.id != "C"));
        assert_eq!(ids(&similar.recommendations), vec!["E", "B", "A"]);
        assert_eq!(similar.recommendations[0].score, 4.0);
    }

    #[test]
    fn test_similar_not_found() {
        let engine = scenario_engine();
        assert!(matches!(
            engine.recommend_similar("zzz-not-a-real-title", 10),
            Err(RecError::NotFound { .. })
        ));
    }

    #[test]
    fn test_empty_title_is_invalid() {
        let engine = scenario_engine();
        assert!(matches!(
            engine.recommend_similar("   ", 10),
            Err(RecError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_run_is_deterministic() {
        let engine = scenario_engine();
        let query = Query::User {
            user_id: "42".to_string(),
            top_n: 3,
        };
        assert_eq!(engine.run(&query).unwrap(), engine.run(&query).unwrap());
    }
}
