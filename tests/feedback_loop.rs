//! Weight adaptation and persistence across restarts.

use std::sync::Arc;

use bess_advisor::config::{Config, StorageBackend};
use bess_advisor::controller::{build_controller, parse_system_state, DecisionService};
use bess_advisor::decision::DecisionEngine;
use bess_advisor::domain::{ActionRecord, ModelWeights};
use bess_advisor::learning::{FeedbackLoop, LearningConfig};
use bess_advisor::repo::{JsonFileStore, Repositories, WeightStore};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::tempdir;

fn file_config(dir: &std::path::Path, seed: u64) -> Config {
    let mut cfg = Config::default();
    cfg.storage.backend = StorageBackend::Json;
    cfg.storage.data_dir = dir.to_path_buf();
    cfg.market.random_seed = Some(seed);
    cfg.weather.random_seed = Some(seed + 1);
    cfg
}

#[test]
fn test_weights_stay_normalized_over_a_simulated_week() {
    let dir = tempdir().unwrap();
    let mut cfg = file_config(dir.path(), 11);
    cfg.storage.backend = StorageBackend::Memory;
    let repos = Repositories::new(&cfg.storage);
    let mut controller = build_controller(&cfg, &repos);

    // One week at 15-minute ticks
    for report in controller.run_cycles(7 * 96) {
        let w = report.feedback.weights;
        assert!((w.sum() - 1.0).abs() < 1e-9, "weights drifted: {w:?}");
        for part in [w.revenue_weight, w.health_weight, w.efficiency_weight] {
            assert!((0.0..=1.0).contains(&part));
        }
        let soc = controller.battery().state().charge_percent;
        assert!((0.0..=100.0).contains(&soc));
    }

    let history = controller.service().feedback().history();
    assert_eq!(history.actions.len(), 672);
    assert_eq!(history.metrics.len(), 100);
}

#[test]
fn test_weights_survive_restart() {
    let dir = tempdir().unwrap();
    let cfg = file_config(dir.path(), 5);

    let saved = {
        let repos = Repositories::new(&cfg.storage);
        let mut controller = build_controller(&cfg, &repos);
        controller.run_cycles(48);
        controller.service().feedback().weights()
    };

    let store = JsonFileStore::new(dir.path());
    assert_eq!(store.load_weights().unwrap(), Some(saved));

    let repos = Repositories::new(&cfg.storage);
    let restored = build_controller(&cfg, &repos);
    let reloaded = restored.service().feedback().weights();
    assert!((reloaded.revenue_weight - saved.revenue_weight).abs() < 1e-12);
    assert!((reloaded.health_weight - saved.health_weight).abs() < 1e-12);
    assert!((reloaded.efficiency_weight - saved.efficiency_weight).abs() < 1e-12);
    assert_eq!(restored.service().feedback().actions().len(), 48);
}

#[test]
fn test_corrupt_weights_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("weights.json"), b"not json at all").unwrap();

    let store = Arc::new(JsonFileStore::new(dir.path()));
    let feedback = FeedbackLoop::new(&LearningConfig::default(), store.clone(), store);
    assert_eq!(feedback.weights(), ModelWeights::default());
}

#[test]
fn test_decisions_use_adapted_weights() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));
    let feedback = Arc::new(FeedbackLoop::new(
        &LearningConfig::default(),
        store.clone(),
        store,
    ));
    let service = DecisionService::new(DecisionEngine::default(), feedback.clone());

    let request = json!({
        "batteryCharge": 85,
        "marketPrice": 150,
        "solarIrradiance": 900,
        "temperature": 25,
        "timeOfDay": 14,
        "dayOfWeek": 3,
        "efficiency": 93
    });
    let state = parse_system_state(&request).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 6, 12, 14, 0, 0).unwrap();

    let first = service.decide_request(&request, start).unwrap();
    let record = ActionRecord::new(start, state, first.action, Default::default());
    feedback.record(ActionRecord {
        result: bess_advisor::domain::ResultDelta {
            revenue: 100.0,
            health_delta: -0.05,
            ..Default::default()
        },
        ..record
    });

    let later = start + Duration::minutes(15);
    let record = ActionRecord::new(later, state, first.action, Default::default());
    let outcome = feedback.record(ActionRecord {
        result: bess_advisor::domain::ResultDelta {
            revenue: 300.0,
            health_delta: -0.05,
            ..Default::default()
        },
        ..record
    });
    assert!(outcome.weights_updated);

    let second = service.decide_request(&request, later).unwrap();
    assert_eq!(second.model_weights, outcome.weights);
    assert_ne!(second.model_weights, first.model_weights);
}
