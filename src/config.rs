use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::decision::DecisionConfig;
use crate::learning::LearningConfig;
use crate::simulation::{BatterySimulatorConfig, MarketSimulatorConfig, WeatherSimulatorConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub controller: ControllerConfig,
    pub battery: BatterySimulatorConfig,
    pub market: MarketSimulatorConfig,
    pub weather: WeatherSimulatorConfig,
    pub decision: DecisionConfig,
    pub learning: LearningConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ControllerConfig {
    /// Wall-clock delay between simulated ticks
    #[validate(range(min = 1))]
    pub tick_interval_ms: u64,
    /// Stop after this many cycles; run until shutdown when absent
    pub max_cycles: Option<u64>,
    /// Simulated clock at cycle zero
    pub start_time: DateTime<Utc>,
    /// Seeds market and weather randomness when the sections leave theirs unset
    pub random_seed: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            max_cycles: None,
            start_time: Utc
                .timestamp_opt(1_718_409_600, 0)
                .single()
                .unwrap_or_else(Utc::now),
            random_seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("BESS__").split("__"));
        let mut cfg: Config = figment.extract()?;
        cfg.apply_seed();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Spread the controller seed over simulators that have none of their own.
    fn apply_seed(&mut self) {
        if let Some(seed) = self.controller.random_seed {
            self.market.random_seed.get_or_insert(seed);
            self.weather.random_seed.get_or_insert(seed.wrapping_add(1));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.controller.validate().context("invalid [controller] config")?;
        self.battery.validate().context("invalid [battery] config")?;
        self.market.validate().context("invalid [market] config")?;
        self.weather.validate().context("invalid [weather] config")?;
        self.decision.validate().context("invalid [decision] config")?;
        self.learning.validate().context("invalid [learning] config")?;
        if !self.learning.base_weights.is_usable() {
            anyhow::bail!("invalid [learning] config: base_weights must be non-negative with a positive sum");
        }
        Ok(())
    }
}
