//! # Wholesale Market Simulation
//!
//! Price = `max(0, base + daily_pattern(hour) + noise)` where the daily
//! pattern is two Gaussian peaks (morning, evening) on a sinusoidal base load
//! and noise is uniform in `±volatility × base`. The base price drifts
//! multiplicatively each tick to mimic slow regime changes.
//!
//! Forecasts drop the noise and widen with the square root of the horizon.

use chrono::{DateTime, Duration, Timelike, Utc};
use itertools::{Itertools, MinMaxResult};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;
use validator::Validate;

use crate::domain::{MarketForecastPoint, MarketSnapshot, PriceSample, PriceStatistics, PriceTrend};
use crate::utils::BoundedBuffer;

/// Relative distance from the window mean that counts as a trend
const TREND_BAND: f64 = 0.02;

/// Market simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MarketSimulatorConfig {
    /// Starting base price (EUR/MWh)
    #[validate(range(min = 0.0))]
    pub base_price: f64,
    /// Noise amplitude as a fraction of base price
    #[validate(range(min = 0.0, max = 1.0))]
    pub volatility: f64,
    pub morning_peak_hour: f64,
    /// Morning peak height (EUR/MWh)
    pub morning_peak_amplitude: f64,
    pub evening_peak_hour: f64,
    /// Evening peak height (EUR/MWh)
    pub evening_peak_amplitude: f64,
    /// Standard deviation of both peaks (hours)
    pub peak_width_hours: f64,
    /// Base-load sinusoid amplitude (EUR/MWh)
    pub base_load_amplitude: f64,
    /// Maximum relative base price drift per tick
    #[validate(range(min = 0.0, max = 0.5))]
    pub base_price_drift: f64,
    /// Rolling history length (samples)
    #[validate(range(min = 1))]
    pub history_capacity: usize,
    #[validate(range(min = 1))]
    pub tick_minutes: u32,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for MarketSimulatorConfig {
    fn default() -> Self {
        Self {
            base_price: 60.0,
            volatility: 0.1,
            morning_peak_hour: 9.0,
            morning_peak_amplitude: 20.0,
            evening_peak_hour: 19.0,
            evening_peak_amplitude: 30.0,
            peak_width_hours: 2.0,
            base_load_amplitude: 5.0,
            base_price_drift: 0.005,
            history_capacity: 96, // one day at 15-minute resolution
            tick_minutes: 15,
            random_seed: None,
        }
    }
}

impl MarketSimulatorConfig {
    /// Deterministic intraday price shape (EUR/MWh offset from base).
    pub fn daily_pattern(&self, hour: f64) -> f64 {
        let width = self.peak_width_hours.max(1e-3);
        let gaussian = |center: f64| (-(hour - center).powi(2) / (2.0 * width * width)).exp();

        let morning = self.morning_peak_amplitude * gaussian(self.morning_peak_hour);
        let evening = self.evening_peak_amplitude * gaussian(self.evening_peak_hour);
        // Lowest at midnight, highest at noon
        let base_load = self.base_load_amplitude * (2.0 * PI * (hour - 6.0) / 24.0).sin();

        morning + evening + base_load
    }
}

fn fractional_hour(t: DateTime<Utc>) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0
}

/// Simulates a wholesale electricity price series
pub struct MarketSimulator<R: Rng = StdRng> {
    config: MarketSimulatorConfig,
    rng: R,
    clock: DateTime<Utc>,
    base_price: f64,
    current_price: f64,
    history: BoundedBuffer<PriceSample>,
}

impl MarketSimulator<StdRng> {
    pub fn new(config: MarketSimulatorConfig, start_time: DateTime<Utc>) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, start_time, rng)
    }
}

impl<R: Rng> MarketSimulator<R> {
    /// Create a simulator driven by an injected random source
    pub fn with_rng(config: MarketSimulatorConfig, start_time: DateTime<Utc>, rng: R) -> Self {
        let history = BoundedBuffer::new(config.history_capacity);
        let base_price = config.base_price.max(0.0);

        let mut simulator = Self {
            config,
            rng,
            clock: start_time,
            base_price,
            current_price: 0.0,
            history,
        };
        simulator.record_sample();
        simulator
    }

    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    pub fn config(&self) -> &MarketSimulatorConfig {
        &self.config
    }

    /// Price recorded at the last tick
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Draw a fresh price for the current clock. Each call is an independent draw.
    pub fn get_current_price(&mut self) -> f64 {
        let hour = fractional_hour(self.clock);
        let noise = self.random_walk();
        (self.base_price + self.config.daily_pattern(hour) + noise).max(0.0)
    }

    fn random_walk(&mut self) -> f64 {
        let amplitude = self.config.volatility.abs() * self.base_price;
        self.rng.gen_range(-1.0..=1.0) * amplitude
    }

    fn record_sample(&mut self) {
        let price = self.get_current_price();
        self.current_price = price;
        self.history.push(PriceSample {
            timestamp: self.clock,
            price,
        });
    }

    /// Hourly forecast for `hours_ahead` hours, starting one hour from now.
    pub fn get_forecast(&self, hours_ahead: u32) -> Vec<MarketForecastPoint> {
        (1..=hours_ahead)
            .map(|h| {
                let timestamp = self.clock + Duration::hours(h as i64);
                let predicted_price =
                    (self.base_price + self.config.daily_pattern(fractional_hour(timestamp))).max(0.0);
                let uncertainty = self.config.volatility.abs() * (h as f64).sqrt();

                MarketForecastPoint {
                    timestamp,
                    predicted_price,
                    confidence: (1.0 - uncertainty).clamp(0.0, 1.0),
                    upper_bound: predicted_price * (1.0 + uncertainty),
                    lower_bound: (predicted_price * (1.0 - uncertainty)).max(0.0),
                }
            })
            .collect()
    }

    /// Advance one tick: move the clock, drift the base price, sample a price.
    pub fn advance_time_step(&mut self) {
        self.clock += Duration::minutes(self.config.tick_minutes.max(1) as i64);

        let drift = self.config.base_price_drift.abs().min(0.5);
        self.base_price *= 1.0 + self.rng.gen_range(-drift..=drift);

        self.record_sample();
        trace!(
            clock = %self.clock,
            base_price = self.base_price,
            price = self.current_price,
            "market tick"
        );
    }

    /// Oldest-first price samples
    pub fn history(&self) -> &BoundedBuffer<PriceSample> {
        &self.history
    }

    pub fn statistics(&self) -> Option<PriceStatistics> {
        let (min, max) = match self.history.iter().map(|s| OrderedFloat(s.price)).minmax() {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(p) => (p.0, p.0),
            MinMaxResult::MinMax(lo, hi) => (lo.0, hi.0),
        };
        let samples = self.history.len();
        let average = self.history.iter().map(|s| s.price).sum::<f64>() / samples as f64;

        let latest = self.history.latest().map(|s| s.price).unwrap_or(average);
        let trend = if latest > average * (1.0 + TREND_BAND) {
            PriceTrend::Rising
        } else if latest < average * (1.0 - TREND_BAND) {
            PriceTrend::Falling
        } else {
            PriceTrend::Flat
        };

        Some(PriceStatistics {
            average,
            min,
            max,
            trend,
            samples,
        })
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            timestamp: self.clock,
            current_price: self.current_price,
            rolling_history: self.history.to_vec(),
            statistics: self.statistics(),
        }
    }
}
