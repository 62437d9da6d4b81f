use chrono::{DateTime, Utc};
use lumen_common::types::{
    AlertStatus, AnomalyResult, Condition, ConditionKind, ConditionResult, MetricSnapshot, Rule,
};
use std::collections::HashSet;

use crate::aggregate::aggregate;
use crate::anomaly;
use crate::condition::{evaluate_condition, ConditionInputs};
use crate::error::{AlertError, Result, SourceError};
use crate::source::MetricSource;

/// A rule whose evaluation failed during a cycle.
#[derive(Debug)]
pub struct RuleFailure {
    pub rule_id: String,
    pub rule_name: String,
    pub error: AlertError,
}

/// Everything one evaluation cycle produced.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// One status per successfully evaluated enabled rule, in rule order.
    pub statuses: Vec<AlertStatus>,
    pub failures: Vec<RuleFailure>,
}

impl CycleReport {
    pub fn triggered(&self) -> impl Iterator<Item = &AlertStatus> {
        self.statuses.iter().filter(|s| s.triggered)
    }
}

/// Evaluates one rule against fresh values from `source`.
///
/// Every condition reads its own value; change-rate conditions read the
/// configured window instead and use its end value as the current value.
/// Any fetch error fails the whole rule.
pub fn evaluate_rule<S>(rule: &Rule, source: &S, now: DateTime<Utc>) -> Result<AlertStatus>
where
    S: MetricSource + ?Sized,
{
    let results = rule
        .conditions
        .iter()
        .map(|condition| -> Result<ConditionResult> {
            let inputs = fetch_inputs(condition, source).map_err(|e| AlertError::Source {
                rule_id: rule.id.clone(),
                metric_id: condition.metric_id.clone(),
                source: e,
            })?;
            Ok(evaluate_condition(condition, &inputs))
        })
        .collect::<Result<Vec<ConditionResult>>>()?;

    Ok(aggregate(rule, results, now))
}

fn fetch_inputs<S>(condition: &Condition, source: &S) -> std::result::Result<ConditionInputs, SourceError>
where
    S: MetricSource + ?Sized,
{
    match &condition.kind {
        ConditionKind::ChangeRate { window, .. } => {
            let values = source.window(&condition.metric_id, window)?;
            Ok(ConditionInputs::windowed(values))
        }
        ConditionKind::Anomaly { range, .. } => {
            let mut inputs = ConditionInputs::current(source.current_value(&condition.metric_id)?);
            if range.is_none() {
                inputs.expected_range = source.expected_range(&condition.metric_id)?;
            }
            Ok(inputs)
        }
        ConditionKind::Comparison { .. } => Ok(ConditionInputs::current(
            source.current_value(&condition.metric_id)?,
        )),
        // never triggers, so a missing metric must not fail the rule
        ConditionKind::Unknown { .. } => {
            let current = source.current_value(&condition.metric_id).unwrap_or_else(|e| {
                tracing::debug!(metric_id = %condition.metric_id, error = %e, "Value unavailable for unknown-operator condition");
                0.0
            });
            Ok(ConditionInputs::current(current))
        }
    }
}

/// Evaluates every enabled rule. Disabled rules are skipped; a failing rule
/// is recorded in [`CycleReport::failures`] and does not stop the others.
pub fn evaluate_cycle<S>(rules: &[Rule], source: &S, now: DateTime<Utc>) -> CycleReport
where
    S: MetricSource + ?Sized,
{
    let mut report = CycleReport::default();

    for rule in rules.iter().filter(|r| r.enabled) {
        match evaluate_rule(rule, source, now) {
            Ok(status) => {
                if status.triggered {
                    tracing::info!(
                        rule_id = %rule.id,
                        severity = %status.severity,
                        message = %status.message,
                        "Rule triggered"
                    );
                }
                report.statuses.push(status);
            }
            Err(e) => {
                tracing::warn!(rule_id = %rule.id, rule_name = %rule.name, error = %e, "Rule evaluation failed");
                report.failures.push(RuleFailure {
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    error: e,
                });
            }
        }
    }

    tracing::debug!(
        evaluated = report.statuses.len(),
        triggered = report.triggered().count(),
        failed = report.failures.len(),
        skipped = rules.len() - report.statuses.len() - report.failures.len(),
        "Evaluation cycle finished"
    );
    report
}

/// Runs an anomaly detection pass over the anomaly conditions of the
/// enabled rules. Each metric is scored once; metrics without a range or
/// whose value cannot be read are skipped. Only anomalous results are
/// returned, highest score first.
pub fn scan_anomalies<S>(rules: &[Rule], source: &S, now: DateTime<Utc>) -> Vec<AnomalyResult>
where
    S: MetricSource + ?Sized,
{
    let mut seen = HashSet::new();
    let mut inputs: Vec<(MetricSnapshot, _)> = Vec::new();

    for condition in rules
        .iter()
        .filter(|r| r.enabled)
        .flat_map(|r| r.conditions.iter())
    {
        let ConditionKind::Anomaly { range, .. } = &condition.kind else {
            continue;
        };
        if !seen.insert(condition.metric_id.as_str()) {
            continue;
        }
        let range = match range {
            Some(r) => Some(*r),
            None => source.expected_range(&condition.metric_id).unwrap_or_else(|e| {
                tracing::warn!(metric_id = %condition.metric_id, error = %e, "Expected range unavailable");
                None
            }),
        };
        let Some(range) = range else {
            continue;
        };
        match source.snapshot(&condition.metric_id, &condition.metric_name, now) {
            Ok(snapshot) => inputs.push((snapshot, range)),
            Err(e) => {
                tracing::warn!(metric_id = %condition.metric_id, error = %e, "Skipping anomaly scan for metric");
            }
        }
    }

    anomaly::detect_all(&inputs, now)
}
