use anyhow::Result;
use bess_advisor::{config, controller, repo, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to read .env: {e}");
        }
    }
    init_tracing();

    let cfg = Config::load()?;

    if cfg.market.random_seed.is_none() || cfg.weather.random_seed.is_none() {
        warn!("No random seed configured; runs will not be reproducible");
    }

    let repos = repo::Repositories::new(&cfg.storage);
    let mut advisor = controller::build_controller(&cfg, &repos);

    info!(
        start = %cfg.controller.start_time,
        backend = ?cfg.storage.backend,
        data_dir = %cfg.storage.data_dir.display(),
        max_cycles = ?cfg.controller.max_cycles,
        "starting battery advisor"
    );

    let cycles = controller::run_loop(&mut advisor, &cfg, telemetry::shutdown_signal()).await;

    let weights = advisor.service().feedback().weights();
    info!(
        cycles,
        charge_percent = advisor.battery().state().charge_percent,
        health_percent = advisor.battery().state().health_percent,
        revenue_weight = weights.revenue_weight,
        health_weight = weights.health_weight,
        efficiency_weight = weights.efficiency_weight,
        "shutdown complete"
    );
    Ok(())
}
