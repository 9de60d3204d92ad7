pub mod engine;
pub mod filter;
pub mod ranker;
pub mod resolver;
pub mod scorer;

pub use crate::domain::model::{Item, Query, QueryOutcome, Recommendation, ScoredCandidate, SimilarBooks};
pub use crate::domain::ports::{CatalogStore, ConfigProvider, PredictionUnavailable, Predictor, Storage};
pub use crate::utils::error::Result;
