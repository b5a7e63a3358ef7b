//! # Local Weather Simulation
//!
//! Periodic daily models for temperature and clear-sky irradiance, with a
//! randomly drifting wind and cloud state layered on top.
//!
//! ## Correlations
//!
//! - Irradiance is the clear-sky pattern attenuated by cloud cover.
//! - Humidity falls as temperature rises above its base value.
//! - Precipitation only occurs above a cloud-cover threshold and grows with it.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use validator::Validate;

use crate::domain::{ForecastHorizon, WeatherConditions, WeatherForecastPoint, WeatherSnapshot};

/// Weather simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WeatherSimulatorConfig {
    pub base_temperature_c: f64,
    /// Half the peak-to-trough swing of the daily temperature cycle
    pub temperature_amplitude_c: f64,
    /// Standard deviation of per-tick temperature noise
    pub temperature_noise_c: f64,
    pub base_humidity_percent: f64,
    /// Humidity drop per °C above base temperature
    pub humidity_per_degree: f64,
    /// Clear-sky irradiance at solar noon (W/m²)
    pub max_irradiance_wm2: f64,
    pub solar_noon_hour: f64,
    pub sunrise_hour: f64,
    pub sunset_hour: f64,
    /// Standard deviation of the irradiance bell (hours)
    pub irradiance_width_hours: f64,
    /// No precipitation at or below this cloud cover
    #[validate(range(min = 0.0, max = 100.0))]
    pub precipitation_threshold_percent: f64,
    /// Precipitation at full overcast (mm/h)
    pub max_precipitation_mm: f64,
    #[validate(range(min = 0.0))]
    pub initial_wind_speed_ms: f64,
    pub initial_wind_direction_deg: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub initial_cloud_cover_percent: f64,
    /// Maximum per-tick change
    pub wind_speed_step_ms: f64,
    pub wind_direction_step_deg: f64,
    pub cloud_cover_step_percent: f64,
    /// Forecast uncertainty growth, scaled by √hours
    #[validate(range(min = 0.0))]
    pub forecast_uncertainty_rate: f64,
    #[validate(range(min = 1))]
    pub tick_minutes: u32,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for WeatherSimulatorConfig {
    fn default() -> Self {
        Self {
            base_temperature_c: 15.0,
            temperature_amplitude_c: 5.0,
            temperature_noise_c: 0.5,
            base_humidity_percent: 60.0,
            humidity_per_degree: 3.0,
            max_irradiance_wm2: 1000.0,
            solar_noon_hour: 13.0,
            sunrise_hour: 6.0,
            sunset_hour: 20.0,
            irradiance_width_hours: 3.0,
            precipitation_threshold_percent: 70.0,
            max_precipitation_mm: 8.0,
            initial_wind_speed_ms: 5.0,
            initial_wind_direction_deg: 225.0,
            initial_cloud_cover_percent: 30.0,
            wind_speed_step_ms: 0.5,
            wind_direction_step_deg: 10.0,
            cloud_cover_step_percent: 5.0,
            forecast_uncertainty_rate: 0.1,
            tick_minutes: 15,
            random_seed: None,
        }
    }
}

impl WeatherSimulatorConfig {
    /// Daily temperature cycle: trough at 06:00, peak at 18:00.
    pub fn temperature_pattern(&self, hour: f64) -> f64 {
        self.base_temperature_c + self.temperature_amplitude_c * (2.0 * PI * (hour - 12.0) / 24.0).sin()
    }

    /// Clear-sky irradiance: zero outside daylight, bell-shaped around solar noon.
    pub fn irradiance_pattern(&self, hour: f64) -> f64 {
        if hour < self.sunrise_hour || hour > self.sunset_hour {
            return 0.0;
        }
        let width = self.irradiance_width_hours.max(1e-3);
        self.max_irradiance_wm2 * (-(hour - self.solar_noon_hour).powi(2) / (2.0 * width * width)).exp()
    }

    fn humidity_for(&self, temperature_c: f64) -> f64 {
        let deviation = temperature_c - self.base_temperature_c;
        (self.base_humidity_percent - self.humidity_per_degree * deviation).clamp(0.0, 100.0)
    }

    fn precipitation_for(&self, cloud_cover_percent: f64) -> f64 {
        let threshold = self.precipitation_threshold_percent.clamp(0.0, 100.0);
        if cloud_cover_percent <= threshold || threshold >= 100.0 {
            return 0.0;
        }
        (cloud_cover_percent - threshold) / (100.0 - threshold) * self.max_precipitation_mm
    }

    /// Derive the correlated variables from the independent ones.
    pub fn conditions_at(
        &self,
        hour: f64,
        temperature_c: f64,
        wind_speed_ms: f64,
        wind_direction_deg: f64,
        cloud_cover_percent: f64,
    ) -> WeatherConditions {
        let cloud = cloud_cover_percent.clamp(0.0, 100.0);
        WeatherConditions {
            temperature_c,
            humidity_percent: self.humidity_for(temperature_c),
            wind_speed_ms: wind_speed_ms.max(0.0),
            wind_direction_deg: wrap_degrees(wind_direction_deg),
            cloud_cover_percent: cloud,
            precipitation_mm: self.precipitation_for(cloud),
            solar_irradiance_wm2: self.irradiance_pattern(hour) * (1.0 - cloud / 100.0),
        }
    }
}

/// Wrap to [0, 360). `rem_euclid` alone can round tiny negatives up to 360.
fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn fractional_hour(t: DateTime<Utc>) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0
}

/// Simulates local weather
pub struct WeatherSimulator<R: Rng = StdRng> {
    config: WeatherSimulatorConfig,
    rng: R,
    clock: DateTime<Utc>,
    wind_speed_ms: f64,
    wind_direction_deg: f64,
    cloud_cover_percent: f64,
    current: WeatherSnapshot,
}

impl WeatherSimulator<StdRng> {
    pub fn new(config: WeatherSimulatorConfig, start_time: DateTime<Utc>) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, start_time, rng)
    }
}

impl<R: Rng> WeatherSimulator<R> {
    /// Create a simulator driven by an injected random source
    pub fn with_rng(config: WeatherSimulatorConfig, start_time: DateTime<Utc>, rng: R) -> Self {
        let wind_speed_ms = config.initial_wind_speed_ms.max(0.0);
        let wind_direction_deg = wrap_degrees(config.initial_wind_direction_deg);
        let cloud_cover_percent = config.initial_cloud_cover_percent.clamp(0.0, 100.0);
        let hour = fractional_hour(start_time);
        let current = WeatherSnapshot {
            timestamp: start_time,
            conditions: config.conditions_at(
                hour,
                config.temperature_pattern(hour),
                wind_speed_ms,
                wind_direction_deg,
                cloud_cover_percent,
            ),
        };

        Self {
            config,
            rng,
            clock: start_time,
            wind_speed_ms,
            wind_direction_deg,
            cloud_cover_percent,
            current,
        }
    }

    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    pub fn config(&self) -> &WeatherSimulatorConfig {
        &self.config
    }

    pub fn current(&self) -> &WeatherSnapshot {
        &self.current
    }

    /// Clear-sky irradiance for the current clock, before cloud attenuation
    pub fn clear_sky_irradiance(&self) -> f64 {
        self.config.irradiance_pattern(fractional_hour(self.clock))
    }

    fn temperature_noise(&mut self) -> f64 {
        match Normal::new(0.0, self.config.temperature_noise_c.abs()) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }

    fn step(&mut self, max_step: f64) -> f64 {
        let max_step = max_step.abs();
        self.rng.gen_range(-max_step..=max_step)
    }

    /// Advance one tick: drift wind and clouds, resample temperature noise.
    pub fn advance_time_step(&mut self) {
        self.clock += Duration::minutes(self.config.tick_minutes.max(1) as i64);

        let direction_step = self.step(self.config.wind_direction_step_deg);
        self.wind_direction_deg = wrap_degrees(self.wind_direction_deg + direction_step);

        let speed_step = self.step(self.config.wind_speed_step_ms);
        self.wind_speed_ms = (self.wind_speed_ms + speed_step).max(0.0);

        let cloud_step = self.step(self.config.cloud_cover_step_percent);
        self.cloud_cover_percent = (self.cloud_cover_percent + cloud_step).clamp(0.0, 100.0);

        let hour = fractional_hour(self.clock);
        let temperature_c = self.config.temperature_pattern(hour) + self.temperature_noise();
        self.current = WeatherSnapshot {
            timestamp: self.clock,
            conditions: self.config.conditions_at(
                hour,
                temperature_c,
                self.wind_speed_ms,
                self.wind_direction_deg,
                self.cloud_cover_percent,
            ),
        };
    }

    /// Hourly forecast from the deterministic patterns, holding wind and
    /// cloud at their current values.
    pub fn get_forecast(&self, hours_ahead: u32) -> Vec<WeatherForecastPoint> {
        (1..=hours_ahead)
            .map(|h| {
                let timestamp = self.clock + Duration::hours(h as i64);
                let hour = fractional_hour(timestamp);
                let uncertainty = self.config.forecast_uncertainty_rate.abs() * (h as f64).sqrt();

                WeatherForecastPoint {
                    timestamp,
                    conditions: self.config.conditions_at(
                        hour,
                        self.config.temperature_pattern(hour),
                        self.wind_speed_ms,
                        self.wind_direction_deg,
                        self.cloud_cover_percent,
                    ),
                    confidence: (1.0 - uncertainty).clamp(0.0, 1.0),
                    horizon: ForecastHorizon::from_hours_ahead(h),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_718_409_600, 0).unwrap() // 2024-06-15 00:00 UTC
    }

    fn seeded(seed: u64) -> WeatherSimulator {
        WeatherSimulator::new(
            WeatherSimulatorConfig {
                random_seed: Some(seed),
                ..Default::default()
            },
            start(),
        )
    }

    #[test]
    fn test_temperature_trough_and_peak() {
        let config = WeatherSimulatorConfig::default();
        assert!((config.temperature_pattern(6.0) - 10.0).abs() < 1e-9);
        assert!((config.temperature_pattern(18.0) - 20.0).abs() < 1e-9);
        assert!((config.temperature_pattern(12.0) - 15.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0)]
    #[case(5.5)]
    #[case(20.5)]
    #[case(23.75)]
    fn test_no_irradiance_at_night(#[case] hour: f64) {
        let config = WeatherSimulatorConfig::default();
        assert_eq!(config.irradiance_pattern(hour), 0.0);
    }

    #[test]
    fn test_irradiance_peaks_at_solar_noon() {
        let config = WeatherSimulatorConfig::default();
        assert!((config.irradiance_pattern(13.0) - 1000.0).abs() < 1e-9);
        assert!(config.irradiance_pattern(10.0) < config.irradiance_pattern(12.0));
        assert!(config.irradiance_pattern(16.0) < config.irradiance_pattern(14.0));
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(70.0, 0.0)]
    #[case(85.0, 4.0)]
    #[case(100.0, 8.0)]
    fn test_precipitation_threshold(#[case] cloud: f64, #[case] expected_mm: f64) {
        let config = WeatherSimulatorConfig::default();
        let conditions = config.conditions_at(12.0, 15.0, 3.0, 90.0, cloud);
        assert!((conditions.precipitation_mm - expected_mm).abs() < 1e-9);
    }

    #[test]
    fn test_humidity_falls_with_heat() {
        let config = WeatherSimulatorConfig::default();
        let cool = config.conditions_at(12.0, 10.0, 3.0, 0.0, 0.0);
        let warm = config.conditions_at(12.0, 20.0, 3.0, 0.0, 0.0);
        assert!(warm.humidity_percent < cool.humidity_percent);
        assert!((cool.humidity_percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_overcast_blocks_irradiance() {
        let config = WeatherSimulatorConfig::default();
        let conditions = config.conditions_at(13.0, 15.0, 3.0, 0.0, 100.0);
        assert_eq!(conditions.solar_irradiance_wm2, 0.0);
    }

    #[test]
    fn test_same_seed_same_weather() {
        let mut a = seeded(9);
        let mut b = seeded(9);
        for _ in 0..96 {
            a.advance_time_step();
            b.advance_time_step();
        }
        assert_eq!(a.current().conditions, b.current().conditions);
    }

    #[test]
    fn test_forecast_horizons_and_confidence() {
        let sim = seeded(4);
        let forecast = sim.get_forecast(100);

        assert_eq!(forecast[0].horizon, ForecastHorizon::Short);
        assert_eq!(forecast[23].horizon, ForecastHorizon::Short);
        assert_eq!(forecast[24].horizon, ForecastHorizon::Medium);
        assert_eq!(forecast[71].horizon, ForecastHorizon::Medium);
        assert_eq!(forecast[72].horizon, ForecastHorizon::Long);

        // 0.1 × √100 = 1.0
        assert_eq!(forecast[99].confidence, 0.0);
        assert!(forecast.windows(2).all(|w| w[1].confidence <= w[0].confidence));
    }

    #[test]
    fn test_forecast_has_no_noise() {
        let sim = seeded(12);
        let a = sim.get_forecast(48);
        let b = sim.get_forecast(48);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.conditions, y.conditions);
        }
    }

    proptest! {
        #[test]
        fn prop_clouds_never_add_irradiance(seed in any::<u64>(), ticks in 1usize..300) {
            let mut sim = seeded(seed);
            for _ in 0..ticks {
                sim.advance_time_step();
                let c = &sim.current().conditions;
                prop_assert!(c.solar_irradiance_wm2 <= sim.clear_sky_irradiance() + 1e-9);
                prop_assert!((0.0..=100.0).contains(&c.cloud_cover_percent));
                prop_assert!((0.0..360.0).contains(&c.wind_direction_deg));
                prop_assert!(c.wind_speed_ms >= 0.0);
                if c.cloud_cover_percent <= 70.0 {
                    prop_assert_eq!(c.precipitation_mm, 0.0);
                }
            }
        }
    }
}
