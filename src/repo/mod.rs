//! Persistence for model weights and the action/metrics history.
//!
//! Storage is synchronous and scoped around a decision cycle. Callers treat
//! every `StorageError` as recoverable.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::{ActionRecord, ModelWeights, PerformanceMetrics};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persisted action and metrics history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistoryDocument {
    pub actions: Vec<ActionRecord>,
    pub metrics: Vec<PerformanceMetrics>,
}

#[cfg_attr(test, mockall::automock)]
pub trait WeightStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn load_weights(&self) -> Result<Option<ModelWeights>, StorageError>;
    fn save_weights(&self, weights: &ModelWeights) -> Result<(), StorageError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore: Send + Sync {
    fn load_history(&self) -> Result<Option<HistoryDocument>, StorageError>;
    fn save_history(&self, history: &HistoryDocument) -> Result<(), StorageError>;
}

pub struct Repositories {
    pub weights: Arc<dyn WeightStore>,
    pub history: Arc<dyn HistoryStore>,
}

impl Repositories {
    pub fn new(cfg: &StorageConfig) -> Self {
        match cfg.backend {
            StorageBackend::Json => {
                let store = Arc::new(JsonFileStore::new(cfg.data_dir.clone()));
                Self {
                    weights: store.clone(),
                    history: store,
                }
            }
            StorageBackend::Memory => {
                let store = Arc::new(InMemoryStore::default());
                Self {
                    weights: store.clone(),
                    history: store,
                }
            }
        }
    }
}

/// Load persisted weights, falling back to defaults when absent, unreadable
/// or unusable. Weights that do not already sum to 1 are renormalized.
pub fn load_weights_or_default(store: &dyn WeightStore) -> ModelWeights {
    match store.load_weights() {
        Ok(Some(weights)) if weights.is_usable() && (weights.sum() - 1.0).abs() < 1e-9 => weights,
        Ok(Some(weights)) => match weights.normalized() {
            Some(normalized) => normalized,
            None => {
                warn!(?weights, "Persisted weights unusable, using defaults");
                ModelWeights::default()
            }
        },
        Ok(None) => ModelWeights::default(),
        Err(e) => {
            warn!(error = %e, "Failed to load weights, using defaults");
            ModelWeights::default()
        }
    }
}

/// Load persisted history, falling back to an empty history on any failure.
pub fn load_history_or_default(store: &dyn HistoryStore) -> HistoryDocument {
    match store.load_history() {
        Ok(history) => history.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Failed to load history, starting empty");
            HistoryDocument::default()
        }
    }
}
