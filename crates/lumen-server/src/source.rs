use lumen_alert::{MetricSource, SourceError};
use lumen_common::types::{ExpectedRange, TimeWindow, WindowValues};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Sigma multiplier used when an expected range is derived from history.
pub const HISTORY_SIGMA: f64 = 2.0;

/// On-disk metrics document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsDocument {
    #[serde(default)]
    pub metrics: HashMap<String, MetricEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub value: f64,
    /// Window string (`"24h"`) to start/end values.
    #[serde(default)]
    pub windows: HashMap<String, WindowValues>,
    #[serde(default)]
    pub expected_range: Option<ExpectedRange>,
    /// Recent values; used for the expected range when none is given.
    #[serde(default)]
    pub history: Vec<f64>,
}

impl MetricEntry {
    fn window(&self, window: &TimeWindow) -> Option<WindowValues> {
        if let Some(values) = self.windows.get(&window.to_string()) {
            return Some(*values);
        }
        // "1d" serves a "24h" condition
        self.windows.iter().find_map(|(key, values)| {
            key.parse::<TimeWindow>()
                .ok()
                .filter(|w| w.as_secs() == window.as_secs())
                .map(|_| *values)
        })
    }

    fn expected_range(&self) -> Option<ExpectedRange> {
        self.expected_range
            .or_else(|| ExpectedRange::from_history(&self.history, HISTORY_SIGMA))
    }
}

/// [`MetricSource`] backed by a JSON file, re-read on every [`refresh`](MetricSource::refresh).
///
/// A reload that fails keeps the previously loaded document.
#[derive(Debug)]
pub struct FileMetricSource {
    path: PathBuf,
    document: RwLock<MetricsDocument>,
}

impl FileMetricSource {
    /// Loads `path` once; fails if the file is missing or malformed.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = read_document(&path).map_err(|e| {
            anyhow::anyhow!("Failed to load metrics file '{}': {}", path.display(), e)
        })?;
        tracing::info!(path = %path.display(), metrics = document.metrics.len(), "Metrics file loaded");
        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metric_count(&self) -> usize {
        self.read(|doc| doc.metrics.len())
    }

    fn read<T>(&self, f: impl FnOnce(&MetricsDocument) -> T) -> T {
        let doc = self.document.read().unwrap_or_else(PoisonError::into_inner);
        f(&doc)
    }

    fn entry<T>(
        &self,
        metric_id: &str,
        f: impl FnOnce(&MetricEntry) -> Result<T, SourceError>,
    ) -> Result<T, SourceError> {
        self.read(|doc| {
            let entry = doc
                .metrics
                .get(metric_id)
                .ok_or_else(|| SourceError::MetricNotFound(metric_id.to_string()))?;
            f(entry)
        })
    }
}

fn read_document(path: &Path) -> Result<MetricsDocument, SourceError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SourceError::Other(e.to_string()))
}

impl MetricSource for FileMetricSource {
    fn current_value(&self, metric_id: &str) -> Result<f64, SourceError> {
        self.entry(metric_id, |e| Ok(e.value))
    }

    fn window(&self, metric_id: &str, window: &TimeWindow) -> Result<WindowValues, SourceError> {
        self.entry(metric_id, |e| {
            e.window(window).ok_or_else(|| SourceError::WindowUnavailable {
                metric_id: metric_id.to_string(),
                window: window.to_string(),
            })
        })
    }

    fn expected_range(&self, metric_id: &str) -> Result<Option<ExpectedRange>, SourceError> {
        self.entry(metric_id, |e| Ok(e.expected_range()))
    }

    fn refresh(&self) -> Result<(), SourceError> {
        let document = read_document(&self.path)?;
        let count = document.metrics.len();
        *self.document.write().unwrap_or_else(PoisonError::into_inner) = document;
        tracing::debug!(path = %self.path.display(), metrics = count, "Metrics file reloaded");
        Ok(())
    }
}
