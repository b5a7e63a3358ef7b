//! Rolling performance metrics over recent action records.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{ActionRecord, PerformanceMetrics};

/// Summarize records with `now - window < timestamp <= now`.
///
/// An empty window yields all-zero metrics. ROI divides each record's revenue
/// by the magnitude of its health change, using 1 when the change is zero.
pub fn compute_metrics<'a, I>(records: I, now: DateTime<Utc>, window: Duration) -> PerformanceMetrics
where
    I: IntoIterator<Item = &'a ActionRecord>,
{
    let cutoff = now - window;

    let mut count = 0usize;
    let mut daily_revenue = 0.0;
    let mut efficiency_sum = 0.0;
    let mut health_sum = 0.0;
    let mut cycle_count = 0u32;
    let mut roi = 0.0;

    for record in records
        .into_iter()
        .filter(|r| r.timestamp > cutoff && r.timestamp <= now)
    {
        let result = &record.result;
        count += 1;
        daily_revenue += result.revenue;
        efficiency_sum += result.efficiency_delta;
        health_sum += result.health_delta;
        if !record.action.kind.is_hold() {
            cycle_count += 1;
        }

        let divisor = if result.health_delta == 0.0 {
            1.0
        } else {
            result.health_delta.abs()
        };
        roi += result.revenue / divisor;
    }

    let mean = |sum: f64| if count == 0 { 0.0 } else { sum / count as f64 };

    PerformanceMetrics {
        timestamp: now,
        daily_revenue,
        average_efficiency: mean(efficiency_sum),
        cycle_count,
        health_score: mean(health_sum),
        roi,
    }
}
