// Adapters layer: concrete implementations of the domain ports (storage, catalog, predictors, asset bundles).

pub mod bundle;
pub mod catalog;
pub mod predictors;
pub mod storage;
