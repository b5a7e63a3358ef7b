use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Action, SystemState};

/// Observed effect of executing one action
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultDelta {
    /// Realized EUR for the tick, negative when energy was bought
    pub revenue: f64,
    /// Change in efficiency (percentage points)
    pub efficiency_delta: f64,
    /// Change in state of health (percentage points)
    pub health_delta: f64,
    /// Change in battery temperature (°C)
    pub temperature_delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub state: SystemState,
    pub action: Action,
    pub result: ResultDelta,
}

impl ActionRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        state: SystemState,
        action: Action,
        result: ResultDelta,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            state,
            action,
            result,
        }
    }
}

/// Rolling performance summary over a trailing window of action records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub timestamp: DateTime<Utc>,
    pub daily_revenue: f64,
    pub average_efficiency: f64,
    /// Number of non-HOLD actions in the window
    pub cycle_count: u32,
    pub health_score: f64,
    pub roi: f64,
}

/// Scoring weights shared between the decision engine and the adapter.
///
/// Each weight lies in [0, 1] and the three sum to 1 after `normalized()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelWeights {
    pub revenue_weight: f64,
    pub health_weight: f64,
    pub efficiency_weight: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            revenue_weight: 0.4,
            health_weight: 0.3,
            efficiency_weight: 0.3,
        }
    }
}

impl ModelWeights {
    pub fn new(revenue_weight: f64, health_weight: f64, efficiency_weight: f64) -> Self {
        Self {
            revenue_weight,
            health_weight,
            efficiency_weight,
        }
    }

    pub fn sum(&self) -> f64 {
        self.revenue_weight + self.health_weight + self.efficiency_weight
    }

    /// All weights finite and non-negative with a positive sum
    pub fn is_usable(&self) -> bool {
        let parts = [self.revenue_weight, self.health_weight, self.efficiency_weight];
        parts.iter().all(|w| w.is_finite() && *w >= 0.0) && self.sum() > 0.0
    }

    /// Rescale so the weights sum to 1. Returns `None` when not usable.
    pub fn normalized(&self) -> Option<Self> {
        if !self.is_usable() {
            return None;
        }
        let total = self.sum();
        Some(Self {
            revenue_weight: self.revenue_weight / total,
            health_weight: self.health_weight / total,
            efficiency_weight: self.efficiency_weight / total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ModelWeights::default();
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalization() {
        let w = ModelWeights::new(2.0, 1.0, 1.0).normalized().unwrap();
        assert!((w.revenue_weight - 0.5).abs() < 1e-12);
        assert!((w.health_weight - 0.25).abs() < 1e-12);
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unusable_weights() {
        assert!(ModelWeights::new(0.0, 0.0, 0.0).normalized().is_none());
        assert!(ModelWeights::new(-0.1, 0.6, 0.5).normalized().is_none());
        assert!(ModelWeights::new(f64::NAN, 0.5, 0.5).normalized().is_none());
    }

    #[test]
    fn test_weights_wire_format() {
        let json = serde_json::to_string(&ModelWeights::default()).unwrap();
        assert_eq!(
            json,
            r#"{"revenueWeight":0.4,"healthWeight":0.3,"efficiencyWeight":0.3}"#
        );
    }
}
