use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use super::{DocumentKey, DocumentStore, StoreError};

/// One pretty-printed JSON file per document (`catalog.json`, `cart.json`) in a directory.
///
/// Writes go to a sibling temporary file first and are renamed into place, so
/// a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, key: DocumentKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    fn io_error(&self, key: DocumentKey, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, key: DocumentKey) -> Result<Option<JsonValue>, StoreError> {
        let path = self.path_of(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(key, &path, err)),
        };

        let document =
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { key, source })?;
        Ok(Some(document))
    }

    fn save(&self, key: DocumentKey, document: &JsonValue) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|err| self.io_error(key, &self.dir, err))?;

        let path = self.path_of(key);
        let tmp = path.with_extension("json.tmp");
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|source| StoreError::Encode { key, source })?;

        fs::write(&tmp, bytes).map_err(|err| self.io_error(key, &tmp, err))?;
        fs::rename(&tmp, &path).map_err(|err| self.io_error(key, &path, err))?;

        tracing::trace!(document = %key, path = ?path, "document saved");
        Ok(())
    }
}
