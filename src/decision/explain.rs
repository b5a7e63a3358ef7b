//! Human-readable summaries of decisions.

use super::engine::SafetyOverride;
use super::scoring::ScoreBreakdown;
use super::DecisionConfig;
use crate::domain::{Action, ActionType, SystemState};

pub fn safety_override(guard: &SafetyOverride) -> String {
    match guard {
        SafetyOverride::Temperature { temperature, limit } => format!(
            "Holding for safety: battery temperature {temperature:.1}°C is at or above the {limit:.1}°C limit."
        ),
        SafetyOverride::Efficiency {
            efficiency,
            threshold,
        } => format!(
            "Holding for safety: efficiency {efficiency:.1}% is below the {threshold:.1}% threshold."
        ),
    }
}

pub fn scored(
    state: &SystemState,
    action: &Action,
    scores: &ScoreBreakdown,
    config: &DecisionConfig,
) -> String {
    let headline = match action.kind {
        ActionType::Charge => format!(
            "Charge at {:.2} MW, costing about €{:.2}/h.",
            action.power_mw,
            action.expected_revenue_eur.abs()
        ),
        ActionType::Discharge => format!(
            "Discharge at {:.2} MW for about €{:.2}/h.",
            action.power_mw, action.expected_revenue_eur
        ),
        ActionType::Hold => "Hold: no action scores better than staying idle.".to_string(),
    };

    let mut reasons = Vec::new();
    reasons.push(price_reason(state.market_price, config));
    if let Some(reason) = time_reason(scores.time_score) {
        reasons.push(reason);
    }
    if scores.solar_score > 0.3 {
        reasons.push(format!(
            "solar irradiance is strong ({:.0} W/m²)",
            state.solar_irradiance
        ));
    }
    reasons.push(format!("battery at {:.0}% charge", state.battery_charge));

    format!(
        "{headline} Because {}. Confidence {:.0}%.",
        reasons.join(", "),
        action.confidence * 100.0
    )
}

fn price_reason(price: f64, config: &DecisionConfig) -> String {
    if price <= config.low_price_threshold {
        format!("price is low at €{price:.2}/MWh")
    } else if price >= config.high_price_threshold {
        format!("price is high at €{price:.2}/MWh")
    } else {
        format!("price is moderate at €{price:.2}/MWh")
    }
}

fn time_reason(time_score: f64) -> Option<String> {
    if time_score < 0.0 {
        Some("off-peak night hours favour charging".to_string())
    } else if time_score > 0.0 {
        Some("peak demand hours favour discharging".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_message_names_limit() {
        let text = safety_override(&SafetyOverride::Temperature {
            temperature: 40.0,
            limit: 35.0,
        });
        assert!(text.contains("40.0°C"));
        assert!(text.contains("35.0°C"));
    }

    #[test]
    fn test_price_bands() {
        let config = DecisionConfig::default();
        assert!(price_reason(40.0, &config).starts_with("price is low"));
        assert!(price_reason(75.0, &config).starts_with("price is moderate"));
        assert!(price_reason(150.0, &config).starts_with("price is high"));
    }
}
