use chrono::{DateTime, Utc};
use lumen_common::types::{AnomalyLevel, AnomalyResult, ExpectedRange, MetricSnapshot};

/// Scores how far `current` lies outside `range`, in `[0,1]`.
///
/// Zero inside the range. Outside, the distance to the nearest bound is
/// divided by the range width (or by `max(|min|, 1)` for a zero-width range)
/// and clamped to 1. Invalid ranges and non-finite values score 0.
pub fn anomaly_score(current: f64, range: &ExpectedRange) -> f64 {
    if !current.is_finite() || !range.is_valid() || range.contains(current) {
        return 0.0;
    }

    let distance = if current < range.min {
        range.min - current
    } else {
        current - range.max
    };
    let width = range.width();
    let scale = if width > 0.0 {
        width
    } else {
        range.min.abs().max(1.0)
    };

    (distance / scale).clamp(0.0, 1.0)
}

pub fn describe(metric_name: &str, current: f64, range: &ExpectedRange, score: f64) -> String {
    if score <= 0.0 {
        return format!(
            "{metric_name} at {current:.2} is within expected range [{:.2}, {:.2}]",
            range.min, range.max
        );
    }
    let side = if current < range.min { "below" } else { "above" };
    format!(
        "{metric_name} at {current:.2} is {side} expected range [{:.2}, {:.2}] ({} concern, score {score:.2})",
        range.min,
        range.max,
        AnomalyLevel::from_score(score),
    )
}

/// Builds the anomaly record for one snapshot.
pub fn detect(snapshot: &MetricSnapshot, range: ExpectedRange, now: DateTime<Utc>) -> AnomalyResult {
    let score = anomaly_score(snapshot.current_value, &range);
    AnomalyResult {
        metric_id: snapshot.metric_id.clone(),
        metric_name: snapshot.metric_name.clone(),
        current_value: snapshot.current_value,
        expected_range: range,
        anomaly_score: score,
        level: AnomalyLevel::from_score(score),
        detected_at: now,
        description: describe(&snapshot.metric_name, snapshot.current_value, &range, score),
    }
}

/// Runs [`detect`] over many snapshots and keeps the anomalous ones,
/// highest score first.
pub fn detect_all(
    inputs: &[(MetricSnapshot, ExpectedRange)],
    now: DateTime<Utc>,
) -> Vec<AnomalyResult> {
    let mut results: Vec<AnomalyResult> = inputs
        .iter()
        .map(|(snapshot, range)| detect(snapshot, *range, now))
        .filter(|r| r.anomaly_score > 0.0)
        .collect();
    results.sort_by(|a, b| b.anomaly_score.total_cmp(&a.anomaly_score));
    results
}
