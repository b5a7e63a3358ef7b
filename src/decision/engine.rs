use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::scoring::{self, QValues, ScoreBreakdown};
use super::{explain, DecisionConfig};
use crate::domain::{Action, ActionType, ModelWeights, SystemState};

/// Safety guard that short-circuited scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SafetyOverride {
    /// Battery temperature at or above the configured maximum
    Temperature { temperature: f64, limit: f64 },
    /// Round-trip efficiency below the configured threshold
    Efficiency { efficiency: f64, threshold: f64 },
}

/// Engine output: the action plus everything needed to explain it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub action: Action,
    pub explanation: String,
    /// Absent when a safety override fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_values: Option<QValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_override: Option<SafetyOverride>,
}

/// Rule-based scorer for CHARGE / DISCHARGE / HOLD.
///
/// `decide` is a pure function of its inputs. The engine holds no weights of
/// its own; callers pass the current `ModelWeights` on every call.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn decide(&self, state: &SystemState, weights: &ModelWeights) -> Decision {
        if let Some(guard) = self.check_safety(state) {
            let confidence = match guard {
                SafetyOverride::Temperature { .. } => self.config.temperature_override_confidence,
                SafetyOverride::Efficiency { .. } => self.config.efficiency_override_confidence,
            };
            warn!(?guard, "Safety override, holding");
            let action = Action::hold(confidence);
            return Decision {
                explanation: explain::safety_override(&guard),
                action,
                q_values: None,
                scores: None,
                safety_override: Some(guard),
            };
        }

        let scores = scoring::breakdown(state, weights, &self.config);
        let q = scoring::q_values(&scores, weights);
        let kind = self.select(state, &q);
        let power_mw = self.size_power(state, kind);
        let action = Action {
            kind,
            power_mw,
            expected_revenue_eur: expected_revenue(state, kind, power_mw),
            confidence: self.confidence(&q),
        };

        debug!(
            action = %action.kind,
            power_mw = action.power_mw,
            confidence = action.confidence,
            q_charge = q.charge,
            q_discharge = q.discharge,
            q_hold = q.hold,
            "Decision made"
        );

        Decision {
            explanation: explain::scored(state, &action, &scores, &self.config),
            action,
            q_values: Some(q),
            scores: Some(scores),
            safety_override: None,
        }
    }

    fn check_safety(&self, state: &SystemState) -> Option<SafetyOverride> {
        if state.temperature >= self.config.max_temperature {
            return Some(SafetyOverride::Temperature {
                temperature: state.temperature,
                limit: self.config.max_temperature,
            });
        }
        if state.efficiency < self.config.efficiency_threshold {
            return Some(SafetyOverride::Efficiency {
                efficiency: state.efficiency,
                threshold: self.config.efficiency_threshold,
            });
        }
        None
    }

    /// HOLD is the baseline. A candidate replaces the current best only when
    /// strictly better, so ties keep HOLD and CHARGE is checked before DISCHARGE.
    fn select(&self, state: &SystemState, q: &QValues) -> ActionType {
        let mut best = ActionType::Hold;
        let mut best_q = q.hold;

        if state.battery_charge < self.config.max_charge && q.charge > best_q {
            best = ActionType::Charge;
            best_q = q.charge;
        }
        if state.battery_charge > self.config.min_charge && q.discharge > best_q {
            best = ActionType::Discharge;
        }
        best
    }

    fn size_power(&self, state: &SystemState, kind: ActionType) -> f64 {
        let max_power = self.config.max_power_mw;
        let power = match kind {
            ActionType::Charge => {
                (self.config.max_charge - state.battery_charge) * max_power / 100.0
            }
            ActionType::Discharge => {
                (state.battery_charge - self.config.min_charge) * max_power / 100.0
            }
            ActionType::Hold => 0.0,
        };
        power.clamp(0.0, max_power)
    }

    fn confidence(&self, q: &QValues) -> f64 {
        let raw = self.config.base_confidence + self.config.confidence_per_spread * q.spread();
        raw.min(self.config.max_confidence).clamp(0.0, 1.0)
    }
}

/// Charging is a cost and comes back negative.
fn expected_revenue(state: &SystemState, kind: ActionType, power_mw: f64) -> f64 {
    match kind {
        ActionType::Charge => -power_mw * state.market_price,
        ActionType::Discharge => power_mw * state.market_price * (state.efficiency / 100.0),
        ActionType::Hold => 0.0,
    }
}
