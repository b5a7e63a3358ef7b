use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sampled market price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    /// EUR/MWh
    pub price: f64,
}

/// Direction of the rolling price window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Rising,
    Falling,
    Flat,
}

/// Summary statistics over the rolling price history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceStatistics {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub trend: PriceTrend,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub current_price: f64,
    /// Oldest-first
    pub rolling_history: Vec<PriceSample>,
    pub statistics: Option<PriceStatistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub predicted_price: f64,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
}
