//! Key/value persistence for the two ledger documents.
//!
//! Each document is a whole JSON array. `save` overwrites; there are no partial
//! updates and no transactions across the two keys.

pub mod in_memory;
pub mod json_file;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

pub use in_memory::InMemoryDocumentStore;
pub use json_file::JsonFileStore;

/// The documents the storefront persists.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    /// Catalog items with their current (partially depleted) stock.
    Catalog,
    /// Cart lines in insertion order.
    Cart,
}

impl DocumentKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKey::Catalog => "catalog",
            DocumentKey::Cart => "cart",
        }
    }
}

impl core::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {key} document at {path:?}: {source}")]
    Io {
        key: DocumentKey,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{key} document is not valid: {source}")]
    Corrupt {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {key} document: {source}")]
    Encode {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("document store lock poisoned")]
    Poisoned,
}

/// Persistence collaborator: load returns the parsed document or `None` when absent.
pub trait DocumentStore: Send + Sync {
    fn load(&self, key: DocumentKey) -> Result<Option<JsonValue>, StoreError>;
    fn save(&self, key: DocumentKey, document: &JsonValue) -> Result<(), StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn load(&self, key: DocumentKey) -> Result<Option<JsonValue>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: DocumentKey, document: &JsonValue) -> Result<(), StoreError> {
        (**self).save(key, document)
    }
}
