use std::path::PathBuf;

use async_trait::async_trait;

use storefront_inventory::Catalog;

use super::{CatalogSource, LoadError, parse_catalog};

/// Catalog document on the local filesystem (same shape as the remote one).
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<Catalog, LoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_catalog(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
