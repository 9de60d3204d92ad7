//! Predictor adapters backed by precomputed model artifacts.
//!
//! Both models are exported as JSON by the training job. They are only read
//! here; training is not part of this crate.

use crate::domain::model::{Interaction, ItemId, UserId};
use crate::domain::ports::{PredictionUnavailable, Predictor};
use crate::utils::error::{RecError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

type Prediction = std::result::Result<f64, PredictionUnavailable>;

fn clip(estimate: f64, (low, high): (f64, f64)) -> Prediction {
    if !estimate.is_finite() {
        return Err(PredictionUnavailable::NonFinite);
    }
    Ok(estimate.clamp(low, high))
}

fn check_scale(asset: &str, (low, high): (f64, f64)) -> Result<()> {
    if !low.is_finite() || !high.is_finite() || low > high {
        return Err(RecError::AssetError {
            asset: asset.to_string(),
            message: format!("invalid rating_scale [{}, {}]", low, high),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorEntry {
    #[serde(default)]
    pub bias: f64,
    pub factors: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatentFactorArtifact {
    pub global_mean: f64,
    pub rating_scale: (f64, f64),
    pub users: HashMap<UserId, FactorEntry>,
    pub items: HashMap<ItemId, FactorEntry>,
}

/// Biased matrix factorisation: `mean + b_u + b_i + p_u · q_i`.
#[derive(Debug)]
pub struct LatentFactorModel {
    artifact: LatentFactorArtifact,
}

impl LatentFactorModel {
    pub const ASSET: &'static str = "latent factor model";

    pub fn from_artifact(artifact: LatentFactorArtifact) -> Result<Self> {
        check_scale(Self::ASSET, artifact.rating_scale)?;

        let mut dimensions = artifact
            .users
            .values()
            .chain(artifact.items.values())
            .map(|entry| entry.factors.len());
        if let Some(first) = dimensions.next() {
            if dimensions.any(|dim| dim != first) {
                return Err(RecError::AssetError {
                    asset: Self::ASSET.to_string(),
                    message: "factor vectors have mismatched dimensions".to_string(),
                });
            }
        }

        tracing::info!(
            "Loaded latent factor model: {} users, {} items",
            artifact.users.len(),
            artifact.items.len()
        );
        Ok(Self { artifact })
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        let artifact: LatentFactorArtifact = serde_json::from_slice(data).map_err(|e| RecError::AssetError {
            asset: Self::ASSET.to_string(),
            message: e.to_string(),
        })?;
        Self::from_artifact(artifact)
    }
}

impl Predictor for LatentFactorModel {
    fn name(&self) -> &str {
        "latent-factor"
    }

    fn predict(&self, user_id: &str, item_id: &str) -> Prediction {
        let user = self
            .artifact
            .users
            .get(user_id)
            .ok_or_else(|| PredictionUnavailable::UnknownUser(user_id.to_string()))?;
        let item = self
            .artifact
            .items
            .get(item_id)
            .ok_or_else(|| PredictionUnavailable::UnknownItem(item_id.to_string()))?;

        let dot: f64 = user.factors.iter().zip(&item.factors).map(|(p, q)| p * q).sum();
        clip(
            self.artifact.global_mean + user.bias + item.bias + dot,
            self.artifact.rating_scale,
        )
    }
}

fn default_k() -> usize {
    40
}

fn default_min_k() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodArtifact {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_min_k")]
    pub min_k: usize,
    pub rating_scale: (f64, f64),
    /// User-user similarities; missing pairs count as zero.
    pub similarities: HashMap<UserId, HashMap<UserId, f64>>,
}

/// User-based k-nearest-neighbour model.
///
/// The estimate for (u, i) is the similarity-weighted mean rating of the `k`
/// users most similar to `u` who rated `i`. Only positive similarities count.
#[derive(Debug)]
pub struct NeighborhoodModel {
    k: usize,
    min_k: usize,
    rating_scale: (f64, f64),
    similarities: HashMap<UserId, HashMap<UserId, f64>>,
    ratings_by_item: HashMap<ItemId, Vec<(UserId, f64)>>,
}

impl NeighborhoodModel {
    pub const ASSET: &'static str = "neighbourhood model";

    /// Ratings come from the interaction history the model was trained on.
    pub fn from_parts(artifact: NeighborhoodArtifact, interactions: &[Interaction]) -> Result<Self> {
        check_scale(Self::ASSET, artifact.rating_scale)?;
        if artifact.k == 0 {
            return Err(RecError::AssetError {
                asset: Self::ASSET.to_string(),
                message: "k must be at least 1".to_string(),
            });
        }

        let mut ratings_by_item: HashMap<ItemId, Vec<(UserId, f64)>> = HashMap::new();
        for interaction in interactions {
            if let Some(rating) = interaction.rating {
                ratings_by_item
                    .entry(interaction.item_id.clone())
                    .or_default()
                    .push((interaction.user_id.clone(), rating));
            }
        }

        tracing::info!(
            "Loaded neighbourhood model: k={}, min_k={}, {} users, {} rated items",
            artifact.k,
            artifact.min_k,
            artifact.similarities.len(),
            ratings_by_item.len()
        );
        Ok(Self {
            k: artifact.k,
            min_k: artifact.min_k,
            rating_scale: artifact.rating_scale,
            similarities: artifact.similarities,
            ratings_by_item,
        })
    }

    pub fn from_json(data: &[u8], interactions: &[Interaction]) -> Result<Self> {
        let artifact: NeighborhoodArtifact = serde_json::from_slice(data).map_err(|e| RecError::AssetError {
            asset: Self::ASSET.to_string(),
            message: e.to_string(),
        })?;
        Self::from_parts(artifact, interactions)
    }
}

impl Predictor for NeighborhoodModel {
    fn name(&self) -> &str {
        "neighbourhood"
    }

    fn predict(&self, user_id: &str, item_id: &str) -> Prediction {
        let similar = self
            .similarities
            .get(user_id)
            .ok_or_else(|| PredictionUnavailable::UnknownUser(user_id.to_string()))?;
        let raters = self
            .ratings_by_item
            .get(item_id)
            .ok_or_else(|| PredictionUnavailable::UnknownItem(item_id.to_string()))?;

        let mut neighbours: Vec<(f64, f64)> = raters
            .iter()
            .map(|(other, rating)| {
                let sim = if other == user_id {
                    1.0
                } else {
                    similar.get(other).copied().unwrap_or(0.0)
                };
                (sim, *rating)
            })
            .collect();
        // 穩定排序，相同相似度維持評分資料順序
        neighbours.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        neighbours.truncate(self.k);

        let (mut sum_sim, mut sum_ratings, mut actual_k) = (0.0, 0.0, 0usize);
        for (sim, rating) in neighbours.into_iter().filter(|(sim, _)| *sim > 0.0) {
            sum_sim += sim;
            sum_ratings += sim * rating;
            actual_k += 1;
        }

        if actual_k < self.min_k {
            return Err(PredictionUnavailable::InsufficientNeighbors {
                found: actual_k,
                required: self.min_k,
            });
        }
        if sum_sim == 0.0 {
            return Err(PredictionUnavailable::ZeroSimilarity);
        }

        clip(sum_ratings / sum_sim, self.rating_scale)
    }
}

/// Treats a call that ran past its budget as unavailable.
///
/// In-process predictors cannot be interrupted, so the budget is checked
/// after the call returns and a late result is discarded.
pub struct BudgetedPredictor<P: Predictor> {
    inner: P,
    budget: Option<Duration>,
}

impl<P: Predictor> BudgetedPredictor<P> {
    pub fn new(inner: P, budget: Option<Duration>) -> Self {
        Self { inner, budget }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Predictor> Predictor for BudgetedPredictor<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn predict(&self, user_id: &str, item_id: &str) -> Prediction {
        let Some(budget) = self.budget else {
            return self.inner.predict(user_id, item_id);
        };

        let started = Instant::now();
        let result = self.inner.predict(user_id, item_id);
        if started.elapsed() > budget {
            return Err(PredictionUnavailable::Timeout(budget));
        }
        result
    }
}
