pub mod asset;
pub mod service;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::decision::DecisionEngine;
use crate::learning::FeedbackLoop;
use crate::repo::Repositories;
use crate::simulation::{BatterySimulator, MarketSimulator, WeatherSimulator};

pub use asset::{AssetController, CycleReport};
pub use service::{parse_system_state, DecisionResponse, DecisionService, SYSTEM_STATE_FIELDS};

/// Wire simulators, engine and feedback loop from configuration.
pub fn build_controller(cfg: &Config, repos: &Repositories) -> AssetController {
    let start = cfg.controller.start_time;
    let feedback = Arc::new(FeedbackLoop::new(
        &cfg.learning,
        repos.weights.clone(),
        repos.history.clone(),
    ));
    let service = DecisionService::new(DecisionEngine::new(cfg.decision.clone()), feedback);

    AssetController::new(
        BatterySimulator::new(cfg.battery.clone()),
        MarketSimulator::new(cfg.market.clone(), start),
        WeatherSimulator::new(cfg.weather.clone(), start),
        service,
    )
}

/// Run one cycle per tick interval until `shutdown` resolves or the
/// configured cycle limit is reached. Returns the number of cycles run.
pub async fn run_loop<F>(controller: &mut AssetController, cfg: &Config, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    let mut interval =
        tokio::time::interval(Duration::from_millis(cfg.controller.tick_interval_ms.max(1)));
    tokio::pin!(shutdown);

    loop {
        if let Some(max) = cfg.controller.max_cycles {
            if controller.cycles() >= max {
                info!(cycles = max, "cycle limit reached");
                break;
            }
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(cycles = controller.cycles(), "controller loop stopping");
                break;
            }
            _ = interval.tick() => {
                controller.run_cycle();
            }
        }
    }

    controller.cycles()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    fn memory_config(max_cycles: Option<u64>) -> Config {
        let mut cfg = Config::default();
        cfg.storage.backend = StorageBackend::Memory;
        cfg.controller.tick_interval_ms = 1;
        cfg.controller.max_cycles = max_cycles;
        cfg.market.random_seed = Some(3);
        cfg.weather.random_seed = Some(4);
        cfg
    }

    #[tokio::test]
    async fn test_loop_stops_at_cycle_limit() {
        let cfg = memory_config(Some(5));
        let repos = Repositories::new(&cfg.storage);
        let mut controller = build_controller(&cfg, &repos);

        let cycles = run_loop(&mut controller, &cfg, std::future::pending()).await;
        assert_eq!(cycles, 5);
        assert_eq!(repos.history.load_history().unwrap().unwrap().actions.len(), 5);
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let cfg = memory_config(None);
        let repos = Repositories::new(&cfg.storage);
        let mut controller = build_controller(&cfg, &repos);

        let cycles = run_loop(&mut controller, &cfg, async {}).await;
        assert_eq!(cycles, 0);
    }
}
