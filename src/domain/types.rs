use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Decision engine input. Ephemeral, carries no identity.
///
/// `time_of_day` and `day_of_week` are accepted as any number in range and
/// floored to whole hours/days when scored. Day 0 is Sunday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    /// State of charge (%)
    #[validate(range(min = 0.0, max = 100.0))]
    pub battery_charge: f64,
    /// EUR/MWh
    #[validate(custom(function = "finite"))]
    pub market_price: f64,
    /// W/m²
    #[validate(range(min = 0.0, max = 2000.0))]
    pub solar_irradiance: f64,
    /// Battery temperature (°C)
    #[validate(custom(function = "finite"))]
    pub temperature: f64,
    #[validate(range(min = 0.0, max = 23.0))]
    pub time_of_day: f64,
    #[validate(range(min = 0.0, max = 6.0))]
    pub day_of_week: f64,
    /// Round-trip efficiency (%)
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub efficiency: f64,
}

fn finite(value: f64) -> Result<(), validator::ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("not_finite"))
    }
}

impl SystemState {
    pub fn hour(&self) -> u32 {
        self.time_of_day.floor().clamp(0.0, 23.0) as u32
    }

    pub fn weekday(&self) -> u32 {
        self.day_of_week.floor().clamp(0.0, 6.0) as u32
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), 0 | 6)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ActionType {
    Charge,
    Discharge,
    Hold,
}

impl ActionType {
    pub fn is_hold(&self) -> bool {
        matches!(self, ActionType::Hold)
    }
}

/// Recommended action. Immutable once returned by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    /// Non-negative magnitude (MW)
    #[serde(rename = "power")]
    pub power_mw: f64,
    /// EUR per hour at the current price; negative for charging
    #[serde(rename = "expectedRevenue")]
    pub expected_revenue_eur: f64,
    /// 0.0 - 1.0
    pub confidence: f64,
}

impl Action {
    pub fn hold(confidence: f64) -> Self {
        Self {
            kind: ActionType::Hold,
            power_mw: 0.0,
            expected_revenue_eur: 0.0,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_state() -> SystemState {
        SystemState {
            battery_charge: 50.0,
            market_price: 80.0,
            solar_irradiance: 300.0,
            temperature: 22.0,
            time_of_day: 14.0,
            day_of_week: 3.0,
            efficiency: 92.0,
        }
    }

    #[test]
    fn test_valid_state_passes() {
        assert!(sample_state().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_fields_rejected() {
        let mut state = sample_state();
        state.time_of_day = 24.0;
        assert!(state.validate().is_err());

        let mut state = sample_state();
        state.efficiency = 0.0;
        assert!(state.validate().is_err());

        let mut state = sample_state();
        state.temperature = f64::NAN;
        assert!(state.validate().is_err());

        let mut state = sample_state();
        state.market_price = f64::INFINITY;
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_weekend_detection() {
        let mut state = sample_state();
        state.day_of_week = 0.0;
        assert!(state.is_weekend());
        state.day_of_week = 6.0;
        assert!(state.is_weekend());
        state.day_of_week = 3.0;
        assert!(!state.is_weekend());
    }

    #[test]
    fn test_action_type_wire_names() {
        assert_eq!(ActionType::Charge.to_string(), "CHARGE");
        assert_eq!(ActionType::from_str("discharge").unwrap(), ActionType::Discharge);
        assert_eq!(
            serde_json::to_string(&ActionType::Hold).unwrap(),
            "\"HOLD\""
        );
    }

    #[test]
    fn test_action_json_shape() {
        let action = Action {
            kind: ActionType::Discharge,
            power_mw: 5.0,
            expected_revenue_eur: 600.0,
            confidence: 0.8,
        };
        let json = serde_json::to_value(action).unwrap();
        assert_eq!(json["type"], "DISCHARGE");
        assert_eq!(json["power"], 5.0);
        assert_eq!(json["expectedRevenue"], 600.0);
    }
}
