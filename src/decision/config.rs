use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Thresholds and limits for action scoring
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_ordering"))]
pub struct DecisionConfig {
    /// Price regarded as cheap (EUR/MWh)
    pub low_price_threshold: f64,
    /// Price regarded as expensive (EUR/MWh)
    pub high_price_threshold: f64,
    /// Hours (0-23) that favour charging
    pub night_hours: Vec<u32>,
    /// Hours (0-23) that favour discharging
    pub peak_hours: Vec<u32>,
    /// Time score during night hours
    pub night_score: f64,
    /// Time score during peak hours
    pub peak_score: f64,
    /// Time score multiplier on Saturday and Sunday
    #[validate(range(min = 0.0, max = 1.0))]
    pub weekend_factor: f64,
    /// Safety limit: at or above this battery temperature the engine holds (°C)
    #[validate(range(exclusive_min = 0.0))]
    pub max_temperature: f64,
    /// Safety limit: below this efficiency the engine holds (%)
    #[validate(range(min = 0.0, max = 100.0))]
    pub efficiency_threshold: f64,
    /// Lowest state of charge to discharge to (%)
    #[validate(range(min = 0.0, max = 100.0))]
    pub min_charge: f64,
    /// Highest state of charge to charge to (%)
    #[validate(range(min = 0.0, max = 100.0))]
    pub max_charge: f64,
    /// Largest power the engine will recommend (MW)
    #[validate(range(exclusive_min = 0.0))]
    pub max_power_mw: f64,
    /// Health penalty applied to any non-HOLD action
    pub cycle_impact: f64,
    /// Irradiance that maps to a solar score of 1 (W/m²)
    #[validate(range(exclusive_min = 0.0))]
    pub reference_irradiance_wm2: f64,
    pub temperature_override_confidence: f64,
    pub efficiency_override_confidence: f64,
    pub base_confidence: f64,
    /// Confidence gained per unit of Q-value spread
    pub confidence_per_spread: f64,
    pub max_confidence: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            low_price_threshold: 50.0,
            high_price_threshold: 100.0,
            night_hours: (0..=5).collect(),
            peak_hours: (17..=20).collect(),
            night_score: -0.5,
            peak_score: 0.5,
            weekend_factor: 0.7,
            max_temperature: 35.0,
            efficiency_threshold: 80.0,
            min_charge: 10.0,
            max_charge: 90.0,
            max_power_mw: 10.0,
            cycle_impact: -0.1,
            reference_irradiance_wm2: 1000.0,
            temperature_override_confidence: 0.9,
            efficiency_override_confidence: 0.85,
            base_confidence: 0.6,
            confidence_per_spread: 0.35,
            max_confidence: 0.95,
        }
    }
}

impl DecisionConfig {
    pub fn price_midpoint(&self) -> f64 {
        (self.low_price_threshold + self.high_price_threshold) / 2.0
    }

    pub fn is_night_hour(&self, hour: u32) -> bool {
        self.night_hours.contains(&hour)
    }

    pub fn is_peak_hour(&self, hour: u32) -> bool {
        self.peak_hours.contains(&hour)
    }
}

fn validate_ordering(config: &DecisionConfig) -> Result<(), ValidationError> {
    if config.low_price_threshold >= config.high_price_threshold {
        return Err(ValidationError::new("low_price_threshold_not_below_high"));
    }
    if config.min_charge >= config.max_charge {
        return Err(ValidationError::new("min_charge_not_below_max_charge"));
    }
    if config
        .night_hours
        .iter()
        .chain(config.peak_hours.iter())
        .any(|h| *h > 23)
    {
        return Err(ValidationError::new("hour_out_of_range"));
    }
    Ok(())
}
