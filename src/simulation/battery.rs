//! # Battery Simulation
//!
//! Time-stepped model of one grid-scale storage asset. Power requests are
//! clamped to rated power and to the energy that fits in (or is available
//! for) one tick; thermal and health side effects follow every transfer.
//!
//! ## Model
//!
//! - Temperature: `ambient + |P| / P_rated × rise_at_rated`
//! - Health: `100 − cycles × degradation − max(0, T − 25) × temp_coefficient`
//! - Idle ticks self-discharge (pro-rated from a daily rate) and cool toward
//!   ambient at a fixed rate.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use crate::domain::{BatteryState, BatteryStatus, HealthStatus};

/// Temperature above which health degrades
const HEALTH_REFERENCE_TEMP_C: f64 = 25.0;

/// Battery simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BatterySimulatorConfig {
    /// Rated charge/discharge power (MW)
    #[validate(range(exclusive_min = 0.0))]
    pub capacity_power_mw: f64,
    /// Usable energy capacity (MWh)
    #[validate(range(exclusive_min = 0.0))]
    pub capacity_energy_mwh: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub initial_charge_percent: f64,
    /// Round-trip efficiency (0, 1]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub efficiency: f64,
    pub ambient_temp_c: f64,
    /// A warning is logged above this temperature
    pub warning_temp_c: f64,
    /// Temperature rise over ambient at rated power (°C)
    #[validate(range(min = 0.0))]
    pub temp_rise_at_rated_c: f64,
    /// Passive cooling per tick (°C)
    #[validate(range(min = 0.0))]
    pub cooling_rate_c_per_tick: f64,
    /// Health lost per equivalent full cycle (percentage points)
    #[validate(range(min = 0.0))]
    pub degradation_per_cycle: f64,
    /// Health lost per °C above 25°C (percentage points)
    #[validate(range(min = 0.0))]
    pub temp_coefficient: f64,
    /// Self-discharge (percentage points per day)
    #[validate(range(min = 0.0))]
    pub self_discharge_percent_per_day: f64,
    #[validate(range(min = 1))]
    pub tick_minutes: u32,
}

impl Default for BatterySimulatorConfig {
    fn default() -> Self {
        Self {
            capacity_power_mw: 10.0,
            capacity_energy_mwh: 40.0,
            initial_charge_percent: 50.0,
            efficiency: 0.92,
            ambient_temp_c: 25.0,
            warning_temp_c: 35.0,
            temp_rise_at_rated_c: 5.0,
            cooling_rate_c_per_tick: 0.5,
            degradation_per_cycle: 0.02,
            temp_coefficient: 0.1,
            self_discharge_percent_per_day: 0.1,
            tick_minutes: 15,
        }
    }
}

/// Battery simulator
#[derive(Debug, Clone)]
pub struct BatterySimulator {
    config: BatterySimulatorConfig,
    state: BatteryState,
    operational: bool,
}

impl BatterySimulator {
    pub fn new(config: BatterySimulatorConfig) -> Self {
        let state = BatteryState {
            capacity_power_mw: config.capacity_power_mw,
            capacity_energy_mwh: config.capacity_energy_mwh,
            charge_percent: config.initial_charge_percent.clamp(0.0, 100.0),
            health_percent: 100.0,
            temperature_c: config.ambient_temp_c,
            cycle_count: 0.0,
            efficiency: config.efficiency,
            charge_rate_mw: 0.0,
            discharge_rate_mw: 0.0,
        };

        Self {
            config,
            state,
            operational: true,
        }
    }

    pub fn state(&self) -> &BatteryState {
        &self.state
    }

    pub fn config(&self) -> &BatterySimulatorConfig {
        &self.config
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Take the asset offline (or back online). Offline transfers are no-ops.
    pub fn set_operational(&mut self, operational: bool) {
        self.operational = operational;
    }

    pub fn status(&self) -> BatteryStatus {
        if !self.operational {
            BatteryStatus::Offline
        } else if self.state.charge_rate_mw > 0.0 {
            BatteryStatus::Charging
        } else if self.state.discharge_rate_mw > 0.0 {
            BatteryStatus::Discharging
        } else {
            BatteryStatus::Idle
        }
    }

    pub fn health_status(&self) -> HealthStatus {
        self.state.health_status()
    }

    pub fn is_over_temperature(&self) -> bool {
        self.state.temperature_c > self.config.warning_temp_c
    }

    pub fn tick_hours(&self) -> f64 {
        self.config.tick_minutes.max(1) as f64 / 60.0
    }

    fn capacity_mwh(&self) -> f64 {
        self.state.capacity_energy_mwh.max(1e-6)
    }

    /// Charge for one tick. Returns the power actually applied (MW).
    ///
    /// The request is clamped to rated power and to the headroom that fits
    /// in one tick; it is never rejected.
    pub fn charge(&mut self, amount_mw: f64) -> f64 {
        if !self.operational || !(amount_mw > 0.0) {
            return 0.0;
        }

        let dt_h = self.tick_hours();
        let headroom_mw = self.state.headroom_mwh() / dt_h;
        let power_mw = amount_mw
            .min(self.state.capacity_power_mw)
            .min(headroom_mw)
            .max(0.0);
        if power_mw <= 0.0 {
            return 0.0;
        }

        let cap_mwh = self.capacity_mwh();
        let energy_mwh = power_mw * dt_h;
        // Conversion losses are taken on the way in
        let stored_mwh = energy_mwh * self.state.efficiency;
        self.state.charge_percent =
            (self.state.charge_percent + stored_mwh / cap_mwh * 100.0).clamp(0.0, 100.0);
        self.state.cycle_count += energy_mwh / cap_mwh;
        self.state.charge_rate_mw = power_mw;
        self.state.discharge_rate_mw = 0.0;

        self.update_temperature(power_mw);
        self.update_health();

        debug!(
            requested_mw = amount_mw,
            applied_mw = power_mw,
            charge_percent = self.state.charge_percent,
            "battery charged"
        );
        power_mw
    }

    /// Discharge for one tick. Returns the power actually applied (MW).
    pub fn discharge(&mut self, amount_mw: f64) -> f64 {
        if !self.operational || !(amount_mw > 0.0) {
            return 0.0;
        }

        let dt_h = self.tick_hours();
        let available_mw = self.state.stored_energy_mwh() / dt_h;
        let power_mw = amount_mw
            .min(self.state.capacity_power_mw)
            .min(available_mw)
            .max(0.0);
        if power_mw <= 0.0 {
            return 0.0;
        }

        let cap_mwh = self.capacity_mwh();
        let energy_mwh = power_mw * dt_h;
        self.state.charge_percent =
            (self.state.charge_percent - energy_mwh / cap_mwh * 100.0).clamp(0.0, 100.0);
        self.state.cycle_count += energy_mwh / cap_mwh;
        self.state.discharge_rate_mw = power_mw;
        self.state.charge_rate_mw = 0.0;

        self.update_temperature(-power_mw);
        self.update_health();

        debug!(
            requested_mw = amount_mw,
            applied_mw = power_mw,
            charge_percent = self.state.charge_percent,
            "battery discharged"
        );
        power_mw
    }

    /// Set the temperature implied by a power flow (sign ignored).
    pub fn update_temperature(&mut self, power_mw: f64) {
        let rated = self.state.capacity_power_mw.max(1e-6);
        self.state.temperature_c =
            self.config.ambient_temp_c + (power_mw.abs() / rated) * self.config.temp_rise_at_rated_c;

        if self.is_over_temperature() {
            warn!(
                temperature_c = self.state.temperature_c,
                limit_c = self.config.warning_temp_c,
                "battery temperature above warning threshold"
            );
        }
    }

    /// Recompute state of health from cycle count and temperature.
    pub fn update_health(&mut self) {
        let cycle_loss = self.state.cycle_count * self.config.degradation_per_cycle;
        let thermal_loss =
            (self.state.temperature_c - HEALTH_REFERENCE_TEMP_C).max(0.0) * self.config.temp_coefficient;
        self.state.health_percent = (100.0 - cycle_loss - thermal_loss).clamp(0.0, 100.0);
    }

    /// Advance one idle tick: self-discharge and passive cooling.
    pub fn advance_time_step(&mut self) {
        let tick_fraction_of_day = self.config.tick_minutes as f64 / (24.0 * 60.0);
        let loss_pct = self.config.self_discharge_percent_per_day * tick_fraction_of_day;
        self.state.charge_percent = (self.state.charge_percent - loss_pct).clamp(0.0, 100.0);

        self.state.temperature_c = (self.state.temperature_c - self.config.cooling_rate_c_per_tick)
            .max(self.config.ambient_temp_c);

        // Rates describe the tick that just ended
        self.state.charge_rate_mw = 0.0;
        self.state.discharge_rate_mw = 0.0;
    }
}
