use thiserror::Error;

use crate::domain::{ModelWeights, PerformanceMetrics};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdaptError {
    #[error("Need at least 2 metrics samples, have {available}")]
    InsufficientHistory { available: usize },

    #[error("Relative change of {metric} is undefined ({previous} -> {latest})")]
    DegenerateMetrics {
        metric: &'static str,
        previous: f64,
        latest: f64,
    },

    #[error("Adapted weights cannot be normalized: {0:?}")]
    DegenerateWeights(ModelWeights),
}

/// Fractional changes between the two latest metrics samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricChanges {
    pub revenue: f64,
    pub health: f64,
    pub roi: f64,
}

/// Exponential-smoothing update of the three scoring weights.
///
/// Each weight moves toward `base × (1 + change)` of the metric it tracks:
/// revenue drives `revenue_weight`, health score drives `health_weight` and
/// ROI drives `efficiency_weight`.
#[derive(Debug, Clone)]
pub struct WeightAdapter {
    alpha: f64,
    base: ModelWeights,
}

impl Default for WeightAdapter {
    fn default() -> Self {
        Self::new(0.1, ModelWeights::default())
    }
}

impl WeightAdapter {
    pub fn new(alpha: f64, base: ModelWeights) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            base,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// `history` must be oldest-first; only the last two samples are used.
    pub fn adapt(
        &self,
        current: &ModelWeights,
        history: &[PerformanceMetrics],
    ) -> Result<ModelWeights, AdaptError> {
        let [previous, latest] = match history {
            [.., previous, latest] => [previous, latest],
            _ => {
                return Err(AdaptError::InsufficientHistory {
                    available: history.len(),
                })
            }
        };

        let changes = metric_changes(previous, latest)?;

        let blend = |old: f64, base: f64, change: f64| {
            let candidate = (base * (1.0 + change)).max(0.0);
            old * (1.0 - self.alpha) + candidate * self.alpha
        };

        let raw = ModelWeights::new(
            blend(current.revenue_weight, self.base.revenue_weight, changes.revenue),
            blend(current.health_weight, self.base.health_weight, changes.health),
            blend(current.efficiency_weight, self.base.efficiency_weight, changes.roi),
        );

        raw.normalized().ok_or(AdaptError::DegenerateWeights(raw))
    }
}

pub fn metric_changes(
    previous: &PerformanceMetrics,
    latest: &PerformanceMetrics,
) -> Result<MetricChanges, AdaptError> {
    Ok(MetricChanges {
        revenue: relative_change("daily_revenue", previous.daily_revenue, latest.daily_revenue)?,
        health: relative_change("health_score", previous.health_score, latest.health_score)?,
        roi: relative_change("roi", previous.roi, latest.roi)?,
    })
}

/// `(latest - previous) / |previous|`. An unchanged zero counts as no change;
/// any other zero baseline or non-finite result is degenerate.
fn relative_change(metric: &'static str, previous: f64, latest: f64) -> Result<f64, AdaptError> {
    if previous == 0.0 && latest == 0.0 {
        return Ok(0.0);
    }
    let change = (latest - previous) / previous.abs();
    if change.is_finite() {
        Ok(change)
    } else {
        Err(AdaptError::DegenerateMetrics {
            metric,
            previous,
            latest,
        })
    }
}
