//! Where the initial catalog comes from on first run.
//!
//! Sources only fetch and validate; retries, caching and persistence are the
//! caller's business.

pub mod file;
pub mod http;

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use storefront_core::DomainError;
use storefront_inventory::{Catalog, CatalogItem};

pub use file::FileCatalogSource;
pub use http::HttpCatalogSource;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("catalog source unreachable: {0}")]
    Network(String),

    #[error("catalog source answered with HTTP status {0}")]
    Status(u16),

    #[error("failed to read catalog file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog document: {0}")]
    Malformed(String),

    #[error("invalid catalog: {0}")]
    Invalid(#[from] DomainError),

    #[error("catalog has no items")]
    Empty,
}

/// Supplier of the initial catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Catalog, LoadError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Parse a raw catalog document (`[{id, nombre, precio, stock, imagenUrl}, ...]`).
pub fn parse_catalog(bytes: &[u8]) -> Result<Catalog, LoadError> {
    let items: Vec<CatalogItem> =
        serde_json::from_slice(bytes).map_err(|e| LoadError::Malformed(e.to_string()))?;
    build_catalog(items)
}

/// Same as [`parse_catalog`] for an already-parsed document.
pub fn catalog_from_value(document: JsonValue) -> Result<Catalog, LoadError> {
    let items: Vec<CatalogItem> =
        serde_json::from_value(document).map_err(|e| LoadError::Malformed(e.to_string()))?;
    build_catalog(items)
}

fn build_catalog(items: Vec<CatalogItem>) -> Result<Catalog, LoadError> {
    if items.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Catalog::new(items)?)
}

/// Fixed in-memory catalog for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    items: Vec<CatalogItem>,
}

impl InMemoryCatalogSource {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn fetch(&self) -> Result<Catalog, LoadError> {
        build_catalog(self.items.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} items)", self.items.len())
    }
}
