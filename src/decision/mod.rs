//! # Decision Engine
//!
//! Scores CHARGE, DISCHARGE and HOLD for a `SystemState` under the current
//! `ModelWeights`, applies temperature and efficiency guards, and returns a
//! sized, priced action with a confidence.

pub mod config;
pub mod engine;
mod explain;
pub mod scoring;

pub use config::DecisionConfig;
pub use engine::{Decision, DecisionEngine, SafetyOverride};
pub use scoring::{QValues, ScoreBreakdown};
