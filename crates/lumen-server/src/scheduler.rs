use anyhow::Result;
use chrono::{DateTime, Utc};
use lumen_alert::{evaluate_cycle, scan_anomalies, CycleReport, MetricSource};
use lumen_storage::{AlertStore, RuleStore};
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::config::ServerConfig;
use crate::rule_builder;
use crate::source::FileMetricSource;

/// Periodically evaluates the enabled rules and records the resulting statuses.
#[derive(Clone)]
pub struct EvaluationScheduler {
    rule_store: Arc<RuleStore>,
    alert_store: Arc<AlertStore>,
    source: Arc<dyn MetricSource>,
    interval_secs: u64,
}

impl EvaluationScheduler {
    pub fn new(
        rule_store: Arc<RuleStore>,
        alert_store: Arc<AlertStore>,
        source: Arc<dyn MetricSource>,
        interval_secs: u64,
    ) -> Self {
        Self {
            rule_store,
            alert_store,
            source,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Builds the stores and the file metric source described by `config`,
    /// seeding the rule store from `rules_file` when set.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let rule_store = Arc::new(RuleStore::new());
        if let Some(rules_file) = &config.rules_file {
            rule_builder::reload_rule_store(&rule_store, rules_file)?;
        }
        let alert_store = Arc::new(AlertStore::new(config.max_alerts));
        let source = Arc::new(FileMetricSource::open(&config.metrics_file)?);
        Ok(Self::new(
            rule_store,
            alert_store,
            source,
            config.evaluation_interval_secs,
        ))
    }

    pub fn rule_store(&self) -> &Arc<RuleStore> {
        &self.rule_store
    }

    pub fn alert_store(&self) -> &Arc<AlertStore> {
        &self.alert_store
    }

    /// Runs one evaluation cycle synchronously.
    ///
    /// A failed source refresh is logged and the cycle runs on the data
    /// the source still holds.
    pub fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        if let Err(e) = self.source.refresh() {
            tracing::warn!(error = %e, "Metric source refresh failed, using previous data");
        }

        let rules = self.rule_store.list_enabled();
        let report = evaluate_cycle(&rules, self.source.as_ref(), now);
        self.alert_store.record_all(report.statuses.iter().cloned());

        for anomaly in scan_anomalies(&rules, self.source.as_ref(), now) {
            tracing::info!(
                metric_id = %anomaly.metric_id,
                score = anomaly.anomaly_score,
                concern = %anomaly.level,
                "{}",
                anomaly.description
            );
        }

        tracing::info!(
            evaluated = report.statuses.len(),
            triggered = report.triggered().count(),
            failed = report.failures.len(),
            open_alerts = self.alert_store.open_count(),
            "Evaluation cycle completed"
        );
        report
    }

    /// Ticks forever; each cycle runs on the blocking pool so a panic in
    /// one cycle is logged and the loop keeps going.
    pub async fn run(&self) {
        tracing::info!(
            interval_secs = self.interval_secs,
            rules = self.rule_store.len(),
            "Evaluation scheduler started"
        );

        let mut tick = interval(Duration::from_secs(self.interval_secs));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let scheduler = self.clone();
            let handle = tokio::task::spawn_blocking(move || scheduler.run_cycle(Utc::now()));
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Evaluation cycle panicked");
            }
        }
    }
}
