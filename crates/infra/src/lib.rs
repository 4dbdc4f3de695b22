//! Infrastructure layer: persistence, catalog sources, config, and the
//! storefront service that binds them to the ledger.

pub mod catalog_source;
pub mod config;
pub mod store;
pub mod storefront;

pub use catalog_source::{
    CatalogSource, FileCatalogSource, HttpCatalogSource, InMemoryCatalogSource, LoadError,
};
pub use config::StorefrontConfig;
pub use store::{DocumentKey, DocumentStore, InMemoryDocumentStore, JsonFileStore, StoreError};
pub use storefront::{Outcome, Storefront, StorefrontError};
