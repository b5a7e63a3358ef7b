//! JSON files under a data directory: `weights.json` and `history.json`.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{HistoryDocument, HistoryStore, StorageError, WeightStore};
use crate::domain::ModelWeights;

const WEIGHTS_FILE: &str = "weights.json";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn weights_path(&self) -> PathBuf {
        self.dir.join(WEIGHTS_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }
}

impl WeightStore for JsonFileStore {
    fn load_weights(&self) -> Result<Option<ModelWeights>, StorageError> {
        read_json(&self.weights_path())
    }

    fn save_weights(&self, weights: &ModelWeights) -> Result<(), StorageError> {
        write_json(&self.weights_path(), weights)
    }
}

impl HistoryStore for JsonFileStore {
    fn load_history(&self) -> Result<Option<HistoryDocument>, StorageError> {
        read_json(&self.history_path())
    }

    fn save_history(&self, history: &HistoryDocument) -> Result<(), StorageError> {
        write_json(&self.history_path(), history)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })
}

/// Write to a sibling temp file, then rename over the target so readers never
/// see a partial document.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let json = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp).map_err(io_err)?);
        writer.write_all(&json).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    fs::rename(&tmp, path).map_err(io_err)?;

    debug!(path = %path.display(), bytes = json.len(), "Persisted document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_weights_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let weights = ModelWeights::new(0.375, 0.3125, 0.3125);

        store.save_weights(&weights).unwrap();
        assert_eq!(store.load_weights().unwrap(), Some(weights));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        assert!(store.load_weights().unwrap().is_none());
        assert!(store.load_history().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.weights_path(), b"{not json").unwrap();
        assert!(matches!(
            store.load_weights(),
            Err(StorageError::Serialization { .. })
        ));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("a").join("b"));
        store.save_history(&HistoryDocument::default()).unwrap();
        assert!(store.history_path().exists());
        assert!(!store.history_path().with_extension("json.tmp").exists());
    }
}
