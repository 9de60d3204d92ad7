use crate::adapters::catalog::InMemoryCatalog;
use crate::adapters::predictors::{LatentFactorModel, NeighborhoodModel};
use crate::domain::model::LoadedAssets;
use crate::domain::ports::{AssetLoader, Storage};
use crate::utils::error::{RecError, Result};
use async_trait::async_trait;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// File names of the three assets, relative to the bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    pub catalog_file: String,
    pub factor_model_file: String,
    pub neighbor_model_file: String,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            catalog_file: "catalog.csv".to_string(),
            factor_model_file: "svd_model.json".to_string(),
            neighbor_model_file: "knn_model.json".to_string(),
        }
    }
}

/// Loads the catalog and both models, either as loose files or from a zip.
pub struct BundleLoader<S: Storage> {
    storage: S,
    archive: Option<String>,
    layout: BundleLayout,
}

impl<S: Storage> BundleLoader<S> {
    /// Assets are plain files under the storage root.
    pub fn new(storage: S, layout: BundleLayout) -> Self {
        Self {
            storage,
            archive: None,
            layout,
        }
    }

    /// Assets are entries of `archive`, a zip file under the storage root.
    pub fn from_archive(storage: S, archive: impl Into<String>, layout: BundleLayout) -> Self {
        Self {
            storage,
            archive: Some(archive.into()),
            layout,
        }
    }

    async fn read_assets(&self) -> Result<[Vec<u8>; 3]> {
        let names = [
            &self.layout.catalog_file,
            &self.layout.factor_model_file,
            &self.layout.neighbor_model_file,
        ];

        match &self.archive {
            Some(archive_name) => {
                let data = self.storage.read_file(archive_name).await?;
                tracing::debug!("Opening asset bundle {} ({} bytes)", archive_name, data.len());
                let mut archive = ZipArchive::new(Cursor::new(data))?;

                let mut contents: [Vec<u8>; 3] = Default::default();
                for (slot, name) in contents.iter_mut().zip(names) {
                    *slot = read_entry(&mut archive, name)?;
                }
                Ok(contents)
            }
            None => {
                let mut contents: [Vec<u8>; 3] = Default::default();
                for (slot, name) in contents.iter_mut().zip(names) {
                    *slot = self.storage.read_file(name).await?;
                }
                Ok(contents)
            }
        }
    }
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => RecError::AssetError {
            asset: name.to_string(),
            message: "entry missing from bundle".to_string(),
        },
        other => RecError::ZipError(other),
    })?;

    let mut buffer = Vec::new();
    entry.read_to_end(&mut buffer)?;
    Ok(buffer)
}

#[async_trait]
impl<S: Storage> AssetLoader for BundleLoader<S> {
    type Catalog = InMemoryCatalog;
    type PredictorA = LatentFactorModel;
    type PredictorB = NeighborhoodModel;

    async fn load(&self) -> Result<LoadedAssets<InMemoryCatalog, LatentFactorModel, NeighborhoodModel>> {
        let [catalog_data, factor_data, neighbor_data] = self.read_assets().await?;

        let catalog = InMemoryCatalog::from_csv_bytes(&catalog_data)?;
        let predictor_a = LatentFactorModel::from_json(&factor_data)?;
        let predictor_b = NeighborhoodModel::from_json(&neighbor_data, catalog.interactions())?;

        Ok(LoadedAssets {
            catalog,
            predictor_a,
            predictor_b,
        })
    }
}
