pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{catalog::InMemoryCatalog, storage::LocalStorage};
pub use app::bootstrap::{build_engine, DefaultEngine};
pub use config::AppConfig;
pub use crate::core::{engine::RecommendationEngine, scorer::ScoringWeights};
pub use utils::error::{RecError, Result};
