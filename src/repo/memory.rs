use parking_lot::RwLock;

use super::{HistoryDocument, HistoryStore, StorageError, WeightStore};
use crate::domain::ModelWeights;

/// Process-local store, used for tests and the `memory` backend
#[derive(Debug, Default)]
pub struct InMemoryStore {
    weights: RwLock<Option<ModelWeights>>,
    history: RwLock<Option<HistoryDocument>>,
}

impl WeightStore for InMemoryStore {
    fn load_weights(&self) -> Result<Option<ModelWeights>, StorageError> {
        Ok(*self.weights.read())
    }

    fn save_weights(&self, weights: &ModelWeights) -> Result<(), StorageError> {
        *self.weights.write() = Some(*weights);
        Ok(())
    }
}

impl HistoryStore for InMemoryStore {
    fn load_history(&self) -> Result<Option<HistoryDocument>, StorageError> {
        Ok(self.history.read().clone())
    }

    fn save_history(&self, history: &HistoryDocument) -> Result<(), StorageError> {
        *self.history.write() = Some(history.clone());
        Ok(())
    }
}
