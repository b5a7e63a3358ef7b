//! Battery energy-storage advisor.
//!
//! Simulates a grid-scale battery, a wholesale market and local weather,
//! recommends CHARGE / DISCHARGE / HOLD each tick, and adapts its scoring
//! weights from the outcomes.

pub mod config;
pub mod controller;
pub mod decision;
pub mod domain;
pub mod error;
pub mod learning;
pub mod repo;
pub mod simulation;
pub mod telemetry;
pub mod utils;
