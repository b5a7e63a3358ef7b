use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::ModelWeights;

/// Weight adaptation and history retention settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LearningConfig {
    /// Smoothing factor for weight updates (0 = frozen, 1 = jump to candidate)
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
    /// Trailing window used for performance metrics (hours)
    #[validate(range(min = 1))]
    pub window_hours: u32,
    #[validate(range(min = 1))]
    pub action_history_capacity: usize,
    #[validate(range(min = 2))]
    pub metrics_history_capacity: usize,
    /// Anchor for candidate weights
    pub base_weights: ModelWeights,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            window_hours: 24,
            action_history_capacity: 1000,
            metrics_history_capacity: 100,
            base_weights: ModelWeights::default(),
        }
    }
}
