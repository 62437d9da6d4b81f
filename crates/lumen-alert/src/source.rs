use chrono::{DateTime, Utc};
use lumen_common::types::{ExpectedRange, MetricSnapshot, TimeWindow, WindowValues};
use std::collections::HashMap;

use crate::error::SourceError;

/// Capability that supplies metric values to the engine.
///
/// Production code injects a real implementation; tests use
/// [`StaticMetricSource`]. The engine never branches on which one it got.
pub trait MetricSource: Send + Sync {
    /// The metric's current value.
    fn current_value(&self, metric_id: &str) -> Result<f64, SourceError>;

    /// The metric's values at the start and end of `window`, ending now.
    fn window(&self, metric_id: &str, window: &TimeWindow) -> Result<WindowValues, SourceError>;

    /// Expected range used by anomaly conditions that do not configure one.
    fn expected_range(&self, _metric_id: &str) -> Result<Option<ExpectedRange>, SourceError> {
        Ok(None)
    }

    /// Reloads backing data before an evaluation cycle. No-op by default.
    fn refresh(&self) -> Result<(), SourceError> {
        Ok(())
    }

    fn snapshot(
        &self,
        metric_id: &str,
        metric_name: &str,
        now: DateTime<Utc>,
    ) -> Result<MetricSnapshot, SourceError> {
        Ok(MetricSnapshot {
            metric_id: metric_id.to_string(),
            metric_name: metric_name.to_string(),
            current_value: self.current_value(metric_id)?,
            timestamp: now,
        })
    }
}

/// In-memory [`MetricSource`] with fixed values.
#[derive(Debug, Clone, Default)]
pub struct StaticMetricSource {
    values: HashMap<String, f64>,
    windows: HashMap<(String, String), WindowValues>,
    ranges: HashMap<String, ExpectedRange>,
}

impl StaticMetricSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, metric_id: &str, value: f64) -> Self {
        self.values.insert(metric_id.to_string(), value);
        self
    }

    pub fn with_window(mut self, metric_id: &str, window: &str, start: f64, end: f64) -> Self {
        self.windows.insert(
            (metric_id.to_string(), window.to_string()),
            WindowValues { start, end },
        );
        self
    }

    pub fn with_range(mut self, metric_id: &str, min: f64, max: f64) -> Self {
        self.ranges
            .insert(metric_id.to_string(), ExpectedRange::new(min, max));
        self
    }
}

impl MetricSource for StaticMetricSource {
    fn current_value(&self, metric_id: &str) -> Result<f64, SourceError> {
        self.values
            .get(metric_id)
            .copied()
            .ok_or_else(|| SourceError::MetricNotFound(metric_id.to_string()))
    }

    fn window(&self, metric_id: &str, window: &TimeWindow) -> Result<WindowValues, SourceError> {
        let key = (metric_id.to_string(), window.to_string());
        self.windows
            .get(&key)
            .copied()
            .ok_or_else(|| SourceError::WindowUnavailable {
                metric_id: metric_id.to_string(),
                window: window.to_string(),
            })
    }

    fn expected_range(&self, metric_id: &str) -> Result<Option<ExpectedRange>, SourceError> {
        Ok(self.ranges.get(metric_id).copied())
    }
}
