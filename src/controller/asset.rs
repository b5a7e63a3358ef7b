use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use super::service::{DecisionResponse, DecisionService};
use crate::domain::{
    ActionRecord, ActionType, BatteryState, BatteryStatus, ResultDelta, SystemState,
};
use crate::learning::FeedbackOutcome;
use crate::simulation::{BatterySimulator, MarketSimulator, WeatherSimulator};

/// Everything that happened in one simulated tick
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub decision: DecisionResponse,
    /// Power the battery actually accepted after clamping (MW)
    pub applied_power_mw: f64,
    pub result: ResultDelta,
    pub feedback: FeedbackOutcome,
    pub battery_status: BatteryStatus,
}

/// Drives one battery against simulated market and weather.
///
/// Each cycle: observe, decide, execute, measure, learn, then advance all
/// three simulators by one tick.
pub struct AssetController<R: Rng = StdRng> {
    battery: BatterySimulator,
    market: MarketSimulator<R>,
    weather: WeatherSimulator<R>,
    service: DecisionService,
    cycles: u64,
}

impl<R: Rng> AssetController<R> {
    pub fn new(
        battery: BatterySimulator,
        market: MarketSimulator<R>,
        weather: WeatherSimulator<R>,
        service: DecisionService,
    ) -> Self {
        Self {
            battery,
            market,
            weather,
            service,
            cycles: 0,
        }
    }

    pub fn battery(&self) -> &BatterySimulator {
        &self.battery
    }

    pub fn market(&self) -> &MarketSimulator<R> {
        &self.market
    }

    pub fn weather(&self) -> &WeatherSimulator<R> {
        &self.weather
    }

    pub fn service(&self) -> &DecisionService {
        &self.service
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Decision input built from the current simulator snapshots
    pub fn system_state(&self) -> SystemState {
        let clock = self.market.clock();
        let battery = self.battery.state();
        SystemState {
            battery_charge: battery.charge_percent,
            market_price: self.market.current_price(),
            solar_irradiance: self.weather.current().conditions.solar_irradiance_wm2,
            temperature: battery.temperature_c,
            time_of_day: clock.hour() as f64,
            day_of_week: clock.weekday().num_days_from_sunday() as f64,
            efficiency: battery.efficiency_percent(),
        }
    }

    pub fn run_cycle(&mut self) -> CycleReport {
        let timestamp = self.market.clock();
        let state = self.system_state();
        let decision = self.service.decide(&state, timestamp);

        let before = self.battery.state().clone();
        let applied_power_mw = match decision.action.kind {
            ActionType::Charge => self.battery.charge(decision.action.power_mw),
            ActionType::Discharge => self.battery.discharge(decision.action.power_mw),
            ActionType::Hold => 0.0,
        };
        let battery_status = self.battery.status();
        let result = measure(
            &before,
            self.battery.state(),
            decision.action.kind,
            applied_power_mw,
            state.market_price,
            self.battery.tick_hours(),
        );

        let record = ActionRecord::new(timestamp, state, decision.action, result);
        let feedback = self.service.feedback().record(record);

        self.battery.advance_time_step();
        self.market.advance_time_step();
        self.weather.advance_time_step();
        self.cycles += 1;

        info!(
            cycle = self.cycles,
            action = %decision.action.kind,
            applied_mw = applied_power_mw,
            price = state.market_price,
            revenue = result.revenue,
            charge_percent = self.battery.state().charge_percent,
            weights_updated = feedback.weights_updated,
            "Cycle complete"
        );

        CycleReport {
            cycle: self.cycles,
            timestamp,
            decision,
            applied_power_mw,
            result,
            feedback,
            battery_status,
        }
    }

    pub fn run_cycles(&mut self, n: usize) -> Vec<CycleReport> {
        (0..n).map(|_| self.run_cycle()).collect()
    }
}

/// Realized revenue over one tick plus the change in battery condition.
///
/// Discharge earns the delivered share of energy; charge pays for the full
/// energy drawn.
fn measure(
    before: &BatteryState,
    after: &BatteryState,
    kind: ActionType,
    applied_power_mw: f64,
    price: f64,
    tick_hours: f64,
) -> ResultDelta {
    let energy_mwh = applied_power_mw * tick_hours;
    let revenue = match kind {
        ActionType::Discharge => energy_mwh * price * after.efficiency,
        ActionType::Charge => -energy_mwh * price,
        ActionType::Hold => 0.0,
    };

    ResultDelta {
        revenue,
        efficiency_delta: after.efficiency_percent() - before.efficiency_percent(),
        health_delta: after.health_percent - before.health_percent,
        temperature_delta: after.temperature_c - before.temperature_c,
    }
}
