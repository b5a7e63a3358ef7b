//! Request-level entry point to the decision engine.
//!
//! Callers hand in either a raw JSON request or an already-built
//! `SystemState`; the service reads the current weights from the feedback loop
//! and returns a response echoing both.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::decision::{DecisionEngine, QValues, SafetyOverride};
use crate::domain::{Action, ModelWeights, SystemState};
use crate::error::ValidationError;
use crate::learning::FeedbackLoop;

/// Wire names of the required request fields, in `SystemState` order
pub const SYSTEM_STATE_FIELDS: [&str; 7] = [
    "batteryCharge",
    "marketPrice",
    "solarIrradiance",
    "temperature",
    "timeOfDay",
    "dayOfWeek",
    "efficiency",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub action: Action,
    pub explanation: String,
    pub system_state: SystemState,
    pub model_weights: ModelWeights,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_values: Option<QValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_override: Option<SafetyOverride>,
}

#[derive(Clone)]
pub struct DecisionService {
    engine: DecisionEngine,
    feedback: Arc<FeedbackLoop>,
}

impl DecisionService {
    pub fn new(engine: DecisionEngine, feedback: Arc<FeedbackLoop>) -> Self {
        Self { engine, feedback }
    }

    pub fn feedback(&self) -> &Arc<FeedbackLoop> {
        &self.feedback
    }

    /// Validate a JSON request and decide. Invalid requests touch no state.
    pub fn decide_request(
        &self,
        request: &Value,
        timestamp: DateTime<Utc>,
    ) -> Result<DecisionResponse, ValidationError> {
        let state = parse_system_state(request)?;
        Ok(self.decide(&state, timestamp))
    }

    pub fn decide(&self, state: &SystemState, timestamp: DateTime<Utc>) -> DecisionResponse {
        let weights = self.feedback.weights();
        let decision = self.engine.decide(state, &weights);

        DecisionResponse {
            action: decision.action,
            explanation: decision.explanation,
            system_state: *state,
            model_weights: weights,
            timestamp,
            q_values: decision.q_values,
            safety_override: decision.safety_override,
        }
    }
}

/// Every field must be present and numeric; ranges are checked afterwards.
pub fn parse_system_state(request: &Value) -> Result<SystemState, ValidationError> {
    let object = request.as_object().ok_or(ValidationError::NotAnObject)?;

    let mut values = [0.0; SYSTEM_STATE_FIELDS.len()];
    for (slot, field) in values.iter_mut().zip(SYSTEM_STATE_FIELDS) {
        let value = object.get(field).ok_or(ValidationError::MissingField(field))?;
        *slot = value.as_f64().ok_or(ValidationError::NotNumeric(field))?;
    }

    let [battery_charge, market_price, solar_irradiance, temperature, time_of_day, day_of_week, efficiency] =
        values;
    let state = SystemState {
        battery_charge,
        market_price,
        solar_irradiance,
        temperature,
        time_of_day,
        day_of_week,
        efficiency,
    };
    state.validate()?;
    Ok(state)
}
