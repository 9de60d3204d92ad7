use crate::adapters::bundle::{BundleLayout, BundleLoader};
use crate::adapters::catalog::InMemoryCatalog;
use crate::adapters::predictors::{BudgetedPredictor, LatentFactorModel, NeighborhoodModel};
use crate::adapters::storage::LocalStorage;
use crate::core::engine::RecommendationEngine;
use crate::core::scorer::ScoringWeights;
use crate::domain::model::LoadedAssets;
use crate::domain::ports::{AssetLoader, ConfigProvider};
use crate::utils::error::Result;
use std::path::Path;

pub type DefaultEngine = RecommendationEngine<
    InMemoryCatalog,
    BudgetedPredictor<LatentFactorModel>,
    BudgetedPredictor<NeighborhoodModel>,
>;

/// Picks loose-file or zip loading from the configured assets path.
pub fn loader_for<C: ConfigProvider>(config: &C) -> BundleLoader<LocalStorage> {
    let layout = BundleLayout {
        catalog_file: config.catalog_file().to_string(),
        factor_model_file: config.factor_model_file().to_string(),
        neighbor_model_file: config.neighbor_model_file().to_string(),
    };

    let path = Path::new(config.assets_path());
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    match (is_zip, path.file_name().and_then(|name| name.to_str())) {
        (true, Some(archive)) => {
            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            BundleLoader::from_archive(LocalStorage::new(parent), archive, layout)
        }
        _ => BundleLoader::new(LocalStorage::new(path), layout),
    }
}

/// One-time initialisation: load every asset and wire up the engine.
pub async fn build_engine<C: ConfigProvider>(config: &C) -> Result<DefaultEngine> {
    tracing::info!("📁 Loading recommendation assets from: {}", config.assets_path());
    let assets = loader_for(config).load().await?;

    let budget = config.call_budget();
    if let Some(budget) = budget {
        tracing::info!("⏱️ Predictor call budget: {:?}", budget);
    }

    let weights = ScoringWeights {
        weight_a: config.weight_a(),
        weight_b: config.weight_b(),
    };
    RecommendationEngine::new(
        LoadedAssets {
            catalog: assets.catalog,
            predictor_a: BudgetedPredictor::new(assets.predictor_a, budget),
            predictor_b: BudgetedPredictor::new(assets.predictor_b, budget),
        },
        weights,
    )
}
