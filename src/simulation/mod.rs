//! # Asset and Environment Simulation
//!
//! Discrete-time simulators that tick independently, one 15-minute step at a
//! time by default.
//!
//! ## Components
//!
//! - **Battery**: state of charge, temperature and health of one storage asset
//! - **Market**: wholesale price series with a daily shape, noise and rolling history
//! - **Weather**: correlated temperature, humidity, wind, cloud, rain and irradiance
//!
//! Market and weather randomness comes from a seedable `StdRng` by default, or
//! from any injected `rand::Rng`.
//!
//! ## Usage
//!
//! ```rust
//! use bess_advisor::simulation::{MarketSimulator, MarketSimulatorConfig};
//! use chrono::Utc;
//!
//! let config = MarketSimulatorConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//! let mut market = MarketSimulator::new(config, Utc::now());
//!
//! market.advance_time_step();
//! assert!(market.current_price() >= 0.0);
//! let next_day = market.get_forecast(24);
//! assert_eq!(next_day.len(), 24);
//! ```

pub mod battery;
pub mod market;
pub mod weather;

pub use battery::{BatterySimulator, BatterySimulatorConfig};
pub use market::{MarketSimulator, MarketSimulatorConfig};
pub use weather::{WeatherSimulator, WeatherSimulatorConfig};
