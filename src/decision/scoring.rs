//! Sub-scores and Q-values for the three candidate actions.
//!
//! Each sub-score is roughly in [-1, 1]. Positive price, time and solar
//! scores favour DISCHARGE; negative ones favour CHARGE.

use serde::{Deserialize, Serialize};

use super::DecisionConfig;
use crate::domain::{ActionType, ModelWeights, SystemState};

/// Individual factors behind one decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub price_score: f64,
    pub time_score: f64,
    pub solar_score: f64,
    /// Health score for an active (CHARGE/DISCHARGE) action
    pub active_health_score: f64,
    /// Health score for HOLD
    pub hold_health_score: f64,
}

/// Ranking score per candidate action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QValues {
    pub charge: f64,
    pub discharge: f64,
    pub hold: f64,
}

impl QValues {
    pub fn get(&self, kind: ActionType) -> f64 {
        match kind {
            ActionType::Charge => self.charge,
            ActionType::Discharge => self.discharge,
            ActionType::Hold => self.hold,
        }
    }

    pub fn max(&self) -> f64 {
        self.charge.max(self.discharge).max(self.hold)
    }

    pub fn min(&self) -> f64 {
        self.charge.min(self.discharge).min(self.hold)
    }

    /// Distance between best and worst action
    pub fn spread(&self) -> f64 {
        self.max() - self.min()
    }
}

/// Price relative to the threshold midpoint, scaled by efficiency.
pub fn price_score(state: &SystemState, config: &DecisionConfig) -> f64 {
    let midpoint = config.price_midpoint();
    if midpoint.abs() < f64::EPSILON {
        return 0.0;
    }
    ((state.market_price - midpoint) / midpoint) * (state.efficiency / 100.0)
}

/// Night favours charging, peak favours discharging, damped at weekends.
pub fn time_score(state: &SystemState, config: &DecisionConfig) -> f64 {
    let hour = state.hour();
    let score = if config.is_night_hour(hour) {
        config.night_score
    } else if config.is_peak_hour(hour) {
        config.peak_score
    } else {
        0.0
    };

    if state.is_weekend() {
        score * config.weekend_factor
    } else {
        score
    }
}

/// Available sunshine, reduced as the battery approaches its temperature limit.
pub fn solar_score(state: &SystemState, config: &DecisionConfig) -> f64 {
    let irradiance = state.solar_irradiance / config.reference_irradiance_wm2;
    let thermal_margin = (1.0 - state.temperature / config.max_temperature).max(0.0);
    irradiance * thermal_margin
}

/// Health-weighted score of taking `kind` in `state`.
///
/// Rewards temperature headroom, penalises distance from 50% state of charge
/// and, for active actions, the cycle wear.
pub fn health_score(
    state: &SystemState,
    kind: ActionType,
    weights: &ModelWeights,
    config: &DecisionConfig,
) -> f64 {
    let cycle_impact = if kind.is_hold() { 0.0 } else { config.cycle_impact };
    let temperature_headroom =
        ((config.max_temperature - state.temperature) / config.max_temperature).clamp(0.0, 1.0);
    let soc_stress = (state.battery_charge - 50.0).abs() / 50.0;

    (cycle_impact + temperature_headroom - soc_stress) * weights.health_weight
}

pub fn breakdown(
    state: &SystemState,
    weights: &ModelWeights,
    config: &DecisionConfig,
) -> ScoreBreakdown {
    ScoreBreakdown {
        price_score: price_score(state, config),
        time_score: time_score(state, config),
        solar_score: solar_score(state, config),
        // Charge and discharge share the same health term
        active_health_score: health_score(state, ActionType::Charge, weights, config),
        hold_health_score: health_score(state, ActionType::Hold, weights, config),
    }
}

pub fn q_values(scores: &ScoreBreakdown, weights: &ModelWeights) -> QValues {
    let market_signal = scores.price_score * weights.revenue_weight
        + scores.time_score * weights.efficiency_weight
        + scores.solar_score * weights.efficiency_weight;

    QValues {
        charge: -market_signal + scores.active_health_score,
        discharge: market_signal + scores.active_health_score,
        hold: 2.0 * scores.hold_health_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn state(hour: f64, day: f64) -> SystemState {
        SystemState {
            battery_charge: 50.0,
            market_price: 75.0,
            solar_irradiance: 0.0,
            temperature: 20.0,
            time_of_day: hour,
            day_of_week: day,
            efficiency: 90.0,
        }
    }

    #[test]
    fn test_price_score_relative_to_midpoint() {
        let config = DecisionConfig::default();
        let mut s = state(12.0, 3.0);
        assert_eq!(price_score(&s, &config), 0.0);

        s.market_price = 150.0;
        assert!((price_score(&s, &config) - 0.9).abs() < 1e-12);

        s.market_price = 0.0;
        assert!((price_score(&s, &config) + 0.9).abs() < 1e-12);
    }

    #[rstest]
    #[case(2.0, 3.0, -0.5)]
    #[case(18.0, 3.0, 0.5)]
    #[case(12.0, 3.0, 0.0)]
    #[case(2.0, 0.0, -0.35)]
    #[case(18.0, 6.0, 0.35)]
    fn test_time_score(#[case] hour: f64, #[case] day: f64, #[case] expected: f64) {
        let config = DecisionConfig::default();
        assert!((time_score(&state(hour, day), &config) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_solar_score_vanishes_at_temperature_limit() {
        let config = DecisionConfig::default();
        let mut s = state(13.0, 3.0);
        s.solar_irradiance = 1000.0;
        s.temperature = 0.0;
        assert!((solar_score(&s, &config) - 1.0).abs() < 1e-12);

        s.temperature = 35.0;
        assert_eq!(solar_score(&s, &config), 0.0);

        s.temperature = 50.0;
        assert_eq!(solar_score(&s, &config), 0.0);
    }

    #[test]
    fn test_hold_avoids_cycle_penalty() {
        let config = DecisionConfig::default();
        let weights = ModelWeights::default();
        let s = state(12.0, 3.0);

        let hold = health_score(&s, ActionType::Hold, &weights, &config);
        let charge = health_score(&s, ActionType::Charge, &weights, &config);
        assert!((hold - charge - 0.1 * weights.health_weight).abs() < 1e-12);
    }

    #[test]
    fn test_charge_and_discharge_mirror_market_signal() {
        let config = DecisionConfig::default();
        let weights = ModelWeights::default();
        let mut s = state(18.0, 3.0);
        s.market_price = 120.0;

        let scores = breakdown(&s, &weights, &config);
        let q = q_values(&scores, &weights);
        let health = scores.active_health_score;
        assert!(((q.charge - health) + (q.discharge - health)).abs() < 1e-12);
        assert!(q.discharge > q.charge);
        assert_eq!(q.hold, 2.0 * scores.hold_health_score);
    }
}
