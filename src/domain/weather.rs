use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cross-correlated environmental conditions at one instant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditions {
    pub temperature_c: f64,
    /// 0-100
    pub humidity_percent: f64,
    pub wind_speed_ms: f64,
    /// Degrees, [0, 360)
    pub wind_direction_deg: f64,
    /// 0-100
    pub cloud_cover_percent: f64,
    /// mm/h, zero unless cloud cover is above the precipitation threshold
    pub precipitation_mm: f64,
    /// W/m² after cloud attenuation
    pub solar_irradiance_wm2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub conditions: WeatherConditions,
}

/// Forecast range bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForecastHorizon {
    /// Up to 24 hours ahead
    Short,
    /// Up to 72 hours ahead
    Medium,
    Long,
}

impl ForecastHorizon {
    pub fn from_hours_ahead(hours: u32) -> Self {
        match hours {
            0..=24 => ForecastHorizon::Short,
            25..=72 => ForecastHorizon::Medium,
            _ => ForecastHorizon::Long,
        }
    }
}

impl std::fmt::Display for ForecastHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Medium => write!(f, "medium"),
            Self::Long => write!(f, "long"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecastPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub conditions: WeatherConditions,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub horizon: ForecastHorizon,
}
