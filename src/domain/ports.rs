use crate::domain::model::{Item, ItemId, LoadedAssets, TitleMatch, UserId};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Read-only view of item metadata and interaction history.
pub trait CatalogStore {
    fn get_item(&self, item_id: &str) -> Option<&Item>;

    /// Item universe in a stable order; the ranker's tie-break relies on it.
    fn all_item_ids(&self) -> &[ItemId];

    fn all_user_ids(&self) -> &[UserId];

    fn contains_user(&self, user_id: &str) -> bool;

    /// `None` when the user has no interaction history.
    fn consumed_items(&self, user_id: &str) -> Option<&HashSet<ItemId>>;

    /// Rows whose title contains `text` (case-insensitive), in row order.
    fn find_titles_containing(&self, text: &str) -> Vec<TitleMatch<'_>>;
}

/// Why a predictor could not score a (user, item) pair.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionUnavailable {
    #[error("user '{0}' is unknown to the model")]
    UnknownUser(UserId),

    #[error("item '{0}' is unknown to the model")]
    UnknownItem(ItemId),

    #[error("only {found} neighbours rated the item, need at least {required}")]
    InsufficientNeighbors { found: usize, required: usize },

    #[error("neighbour similarities sum to zero")]
    ZeroSimilarity,

    #[error("model produced a non-finite estimate")]
    NonFinite,

    #[error("prediction exceeded its {0:?} budget")]
    Timeout(Duration),
}

pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, user_id: &str, item_id: &str) -> std::result::Result<f64, PredictionUnavailable>;
}

pub trait ConfigProvider: Send + Sync {
    fn assets_path(&self) -> &str;
    fn catalog_file(&self) -> &str;
    fn factor_model_file(&self) -> &str;
    fn neighbor_model_file(&self) -> &str;
    fn weight_a(&self) -> f64;
    fn weight_b(&self) -> f64;
    fn call_budget(&self) -> Option<Duration>;
    fn default_top_n(&self) -> usize;
    fn top_n_bounds(&self) -> (usize, usize);
    fn similar_top_n(&self) -> usize;
}

#[async_trait]
pub trait AssetLoader: Send + Sync {
    type Catalog: CatalogStore + Send;
    type PredictorA: Predictor;
    type PredictorB: Predictor;

    async fn load(&self) -> Result<LoadedAssets<Self::Catalog, Self::PredictorA, Self::PredictorB>>;
}
