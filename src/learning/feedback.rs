//! Closes the loop from executed actions back to the scoring weights.

use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{compute_metrics, AdaptError, LearningConfig, WeightAdapter};
use crate::domain::{ActionRecord, ModelWeights, PerformanceMetrics};
use crate::repo::{
    load_history_or_default, load_weights_or_default, HistoryDocument, HistoryStore, WeightStore,
};
use crate::utils::BoundedBuffer;

struct LearningState {
    weights: ModelWeights,
    actions: BoundedBuffer<ActionRecord>,
    metrics: BoundedBuffer<PerformanceMetrics>,
}

impl LearningState {
    fn document(&self) -> HistoryDocument {
        HistoryDocument {
            actions: self.actions.to_vec(),
            metrics: self.metrics.to_vec(),
        }
    }
}

/// What one recorded action changed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackOutcome {
    pub metrics: PerformanceMetrics,
    pub weights: ModelWeights,
    pub weights_updated: bool,
    /// Why the weights were left unchanged, if they were
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// Owns the live `ModelWeights` and the bounded action/metrics history.
///
/// All mutation goes through one mutex, so append, trim, recompute, adapt and
/// persist happen as a single step per recorded action. `weights()` hands out
/// copies.
pub struct FeedbackLoop {
    adapter: WeightAdapter,
    window: Duration,
    state: Mutex<LearningState>,
    weight_store: Arc<dyn WeightStore>,
    history_store: Arc<dyn HistoryStore>,
}

impl FeedbackLoop {
    /// Restore weights and history from storage, falling back to defaults.
    pub fn new(
        config: &LearningConfig,
        weight_store: Arc<dyn WeightStore>,
        history_store: Arc<dyn HistoryStore>,
    ) -> Self {
        let weights = load_weights_or_default(weight_store.as_ref());
        let history = load_history_or_default(history_store.as_ref());

        info!(
            revenue_weight = weights.revenue_weight,
            health_weight = weights.health_weight,
            efficiency_weight = weights.efficiency_weight,
            actions = history.actions.len(),
            metrics = history.metrics.len(),
            "Feedback loop initialized"
        );

        let state = LearningState {
            weights,
            actions: BoundedBuffer::from_vec(history.actions, config.action_history_capacity),
            metrics: BoundedBuffer::from_vec(history.metrics, config.metrics_history_capacity),
        };

        Self {
            adapter: WeightAdapter::new(config.alpha, config.base_weights),
            window: Duration::hours(config.window_hours as i64),
            state: Mutex::new(state),
            weight_store,
            history_store,
        }
    }

    /// Snapshot of the current weights
    pub fn weights(&self) -> ModelWeights {
        self.state.lock().weights
    }

    pub fn actions(&self) -> Vec<ActionRecord> {
        self.state.lock().actions.to_vec()
    }

    /// Oldest-first
    pub fn metrics(&self) -> Vec<PerformanceMetrics> {
        self.state.lock().metrics.to_vec()
    }

    pub fn history(&self) -> HistoryDocument {
        self.state.lock().document()
    }

    /// Append an executed action, recompute metrics over the trailing window
    /// ending at the record's timestamp, then adapt and persist the weights.
    ///
    /// Storage failures are logged and the in-memory state is kept.
    pub fn record(&self, record: ActionRecord) -> FeedbackOutcome {
        let mut state = self.state.lock();

        let now = record.timestamp;
        state.actions.push(record);
        let metrics = compute_metrics(state.actions.iter(), now, self.window);
        state.metrics.push(metrics.clone());

        let recent: Vec<PerformanceMetrics> = state.metrics.last_n(2).cloned().collect();
        let (weights_updated, skipped) = match self.adapter.adapt(&state.weights, &recent) {
            Ok(weights) => {
                state.weights = weights;
                if let Err(e) = self.weight_store.save_weights(&weights) {
                    warn!(error = %e, "Failed to persist weights, keeping in-memory copy");
                }
                info!(
                    revenue_weight = weights.revenue_weight,
                    health_weight = weights.health_weight,
                    efficiency_weight = weights.efficiency_weight,
                    "Weights adapted"
                );
                (true, None)
            }
            Err(e @ AdaptError::InsufficientHistory { .. }) => {
                debug!(reason = %e, "Weight update skipped");
                (false, Some(e.to_string()))
            }
            Err(e) => {
                warn!(reason = %e, "Weight update skipped");
                (false, Some(e.to_string()))
            }
        };

        if let Err(e) = self.history_store.save_history(&state.document()) {
            warn!(error = %e, "Failed to persist history, keeping in-memory copy");
        }

        FeedbackOutcome {
            metrics,
            weights: state.weights,
            weights_updated,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, ActionType, ResultDelta, SystemState};
    use crate::repo::{InMemoryStore, MockHistoryStore, MockWeightStore, StorageError};
    use chrono::{TimeZone, Utc};

    fn record(minutes: i64, revenue: f64, health_delta: f64) -> ActionRecord {
        let start = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let state = SystemState {
            battery_charge: 50.0,
            market_price: 80.0,
            solar_irradiance: 0.0,
            temperature: 25.0,
            time_of_day: 0.0,
            day_of_week: 6.0,
            efficiency: 92.0,
        };
        let action = Action {
            kind: ActionType::Discharge,
            power_mw: 5.0,
            expected_revenue_eur: revenue,
            confidence: 0.7,
        };
        let result = ResultDelta {
            revenue,
            efficiency_delta: 0.0,
            health_delta,
            temperature_delta: 0.0,
        };
        ActionRecord::new(start + Duration::minutes(minutes), state, action, result)
    }

    fn memory_loop(config: &LearningConfig) -> (FeedbackLoop, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::default());
        (FeedbackLoop::new(config, store.clone(), store.clone()), store)
    }

    #[test]
    fn test_first_record_cannot_adapt() {
        let (feedback, _) = memory_loop(&LearningConfig::default());
        let outcome = feedback.record(record(0, 100.0, -0.1));
        assert!(!outcome.weights_updated);
        assert_eq!(outcome.weights, ModelWeights::default());
        assert_eq!(feedback.metrics().len(), 1);
    }

    #[test]
    fn test_growing_revenue_adapts_and_persists() {
        let (feedback, store) = memory_loop(&LearningConfig::default());
        feedback.record(record(0, 100.0, -0.1));
        let outcome = feedback.record(record(15, 100.0, -0.1));

        assert!(outcome.weights_updated);
        assert!(outcome.weights.revenue_weight > 0.4);
        assert!((outcome.weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(store.load_weights().unwrap(), Some(outcome.weights));
        assert_eq!(store.load_history().unwrap().unwrap().actions.len(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = LearningConfig {
            action_history_capacity: 3,
            metrics_history_capacity: 2,
            ..Default::default()
        };
        let (feedback, _) = memory_loop(&config);
        for i in 0..10 {
            feedback.record(record(i * 15, 50.0, -0.1));
        }
        assert_eq!(feedback.actions().len(), 3);
        assert_eq!(feedback.metrics().len(), 2);
        let history = feedback.history();
        assert!(history.actions[0].timestamp < history.actions[2].timestamp);
    }

    #[test]
    fn test_restores_persisted_state() {
        let (feedback, store) = memory_loop(&LearningConfig::default());
        feedback.record(record(0, 100.0, -0.1));
        feedback.record(record(15, 100.0, -0.1));
        let weights = feedback.weights();

        let restored = FeedbackLoop::new(&LearningConfig::default(), store.clone(), store);
        assert_eq!(restored.weights(), weights);
        assert_eq!(restored.actions().len(), 2);
    }

    #[test]
    fn test_storage_failures_are_absorbed() {
        let mut weights = MockWeightStore::new();
        weights
            .expect_load_weights()
            .returning(|| Err(StorageError::Unavailable("offline".into())));
        weights
            .expect_save_weights()
            .returning(|_| Err(StorageError::Unavailable("offline".into())));
        let mut history = MockHistoryStore::new();
        history.expect_load_history().returning(|| Ok(None));
        history
            .expect_save_history()
            .times(2)
            .returning(|_| Err(StorageError::Unavailable("offline".into())));

        let feedback =
            FeedbackLoop::new(&LearningConfig::default(), Arc::new(weights), Arc::new(history));
        feedback.record(record(0, 100.0, -0.1));
        let outcome = feedback.record(record(15, 100.0, -0.1));

        assert!(outcome.weights_updated);
        assert_eq!(feedback.weights(), outcome.weights);
        assert_eq!(feedback.actions().len(), 2);
    }
}
