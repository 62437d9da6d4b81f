#![allow(dead_code)]

use anyhow::Result;
use lumen_server::config::ServerConfig;
use lumen_server::scheduler::EvaluationScheduler;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub config: ServerConfig,
    pub scheduler: EvaluationScheduler,
}

impl TestContext {
    pub fn metrics_path(&self) -> &str {
        &self.config.metrics_file
    }

    pub fn rewrite_metrics(&self, metrics: &Value) -> Result<()> {
        std::fs::write(self.metrics_path(), serde_json::to_string(metrics)?)?;
        Ok(())
    }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<String> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path.to_string_lossy().into_owned())
}

/// Writes `rules` and `metrics` into a fresh temp dir and builds a scheduler from them.
pub fn build_test_context(rules: &Value, metrics: &Value) -> Result<TestContext> {
    lumen_common::id::init(1, 1);

    let temp_dir = tempfile::tempdir()?;
    let rules_file = write_file(temp_dir.path(), "rules.json", &serde_json::to_string(rules)?)?;
    let metrics_file = write_file(
        temp_dir.path(),
        "metrics.json",
        &serde_json::to_string(metrics)?,
    )?;

    let config = ServerConfig {
        evaluation_interval_secs: 1,
        rules_file: Some(rules_file),
        metrics_file,
        max_alerts: 100,
        ..ServerConfig::default()
    };
    let scheduler = EvaluationScheduler::from_config(&config)?;

    Ok(TestContext {
        temp_dir,
        config,
        scheduler,
    })
}
