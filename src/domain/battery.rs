use serde::{Deserialize, Serialize};

/// Battery health classification derived from state of health
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Warning,
    Critical,
    Failed,
}

impl HealthStatus {
    pub fn from_health_percent(health_percent: f64) -> Self {
        if health_percent >= 90.0 {
            HealthStatus::Healthy
        } else if health_percent >= 70.0 {
            HealthStatus::Degraded
        } else if health_percent >= 50.0 {
            HealthStatus::Warning
        } else if health_percent > 0.0 {
            HealthStatus::Critical
        } else {
            HealthStatus::Failed
        }
    }
}

/// Battery operational status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Idle,
    Offline,
}

impl std::fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatteryStatus::Charging => write!(f, "charging"),
            BatteryStatus::Discharging => write!(f, "discharging"),
            BatteryStatus::Idle => write!(f, "idle"),
            BatteryStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Physical state of one storage asset.
///
/// Owned by a single `BatterySimulator` and only mutated through its
/// operations; everything else sees clones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatteryState {
    /// Rated power (MW)
    pub capacity_power_mw: f64,
    /// Usable energy capacity (MWh)
    pub capacity_energy_mwh: f64,
    /// State of charge, 0-100
    pub charge_percent: f64,
    /// State of health, 0-100
    pub health_percent: f64,
    pub temperature_c: f64,
    /// Equivalent full cycles, never decreases
    pub cycle_count: f64,
    /// Round-trip efficiency in (0, 1]
    pub efficiency: f64,
    pub charge_rate_mw: f64,
    pub discharge_rate_mw: f64,
}

impl BatteryState {
    pub fn stored_energy_mwh(&self) -> f64 {
        self.capacity_energy_mwh * self.charge_percent / 100.0
    }

    pub fn headroom_mwh(&self) -> f64 {
        self.capacity_energy_mwh * (100.0 - self.charge_percent) / 100.0
    }

    pub fn efficiency_percent(&self) -> f64 {
        self.efficiency * 100.0
    }

    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::from_health_percent(self.health_percent)
    }
}
