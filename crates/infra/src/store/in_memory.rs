use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use super::{DocumentKey, DocumentStore, StoreError};

/// In-memory document store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<HashMap<DocumentKey, JsonValue>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with documents (e.g. state left by an earlier visit).
    pub fn with_documents(documents: impl IntoIterator<Item = (DocumentKey, JsonValue)>) -> Self {
        Self {
            inner: RwLock::new(documents.into_iter().collect()),
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self, key: DocumentKey) -> Result<Option<JsonValue>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(&key).cloned())
    }

    fn save(&self, key: DocumentKey, document: &JsonValue) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(key, document.clone());
        Ok(())
    }
}
