//! # Weight Adaptation
//!
//! Recomputes rolling `PerformanceMetrics` from the action history and nudges
//! `ModelWeights` by exponential smoothing. This is a bounded update of three
//! scalars, not model training.

pub mod adapter;
pub mod config;
pub mod feedback;
pub mod metrics;

pub use adapter::{AdaptError, MetricChanges, WeightAdapter};
pub use config::LearningConfig;
pub use feedback::{FeedbackLoop, FeedbackOutcome};
pub use metrics::compute_metrics;
