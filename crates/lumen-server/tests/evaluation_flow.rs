mod common;

use anyhow::{anyhow, Result};
use chrono::Utc;
use common::build_test_context;
use lumen_alert::AlertError;
use lumen_storage::{AckOutcome, AlertFilter};
use serde_json::json;
use std::time::Duration;

fn business_rules() -> serde_json::Value {
    json!({
        "rules": [
            {
                "id": "revenue-drop",
                "name": "Daily revenue drop",
                "severity": "high",
                "conditions": [{
                    "metric_id": "revenue.daily",
                    "metric_name": "Daily revenue",
                    "operator": "change_rate",
                    "value": 20,
                    "time_window": "24h",
                    "direction": "decrease"
                }]
            },
            {
                "id": "checkout-latency",
                "name": "Checkout latency",
                "priority": "warning",
                "condition_logic": "or",
                "conditions": [
                    {"metric_id": "checkout.latency_ms", "operator": ">", "value": 800},
                    {"metric_id": "checkout.latency_ms", "operator": "anomaly", "value": 0.4}
                ]
            },
            {
                "id": "signups-low",
                "name": "Signups below target",
                "enabled": false,
                "conditions": [{"metric_id": "signups.daily", "operator": "<", "value": 100}]
            }
        ]
    })
}

fn business_metrics() -> serde_json::Value {
    json!({
        "metrics": {
            "revenue.daily": {
                "name": "Daily revenue",
                "value": 7600,
                "windows": {"1d": {"start": 10000, "end": 7600}}
            },
            "checkout.latency_ms": {
                "value": 640,
                "history": [410, 395, 430, 420, 405, 415]
            },
            "signups.daily": {"value": 84}
        }
    })
}

#[test]
fn one_cycle_evaluates_enabled_rules_and_records_statuses() -> Result<()> {
    let ctx = build_test_context(&business_rules(), &business_metrics())?;
    let report = ctx.scheduler.run_cycle(Utc::now());

    assert!(report.failures.is_empty());
    let ids: Vec<&str> = report.statuses.iter().map(|s| s.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["revenue-drop", "checkout-latency"]);
    assert!(report.statuses.iter().all(|s| s.triggered));

    // "1d" window serves the "24h" condition: 10000 -> 7600 is a 24% drop
    let revenue = &report.statuses[0];
    let rate = revenue.condition_results[0]
        .change_rate
        .ok_or_else(|| anyhow!("change rate should be reported"))?;
    assert!((rate + 24.0).abs() < 1e-9);

    // history-derived range puts 640 far above normal
    let latency = &report.statuses[1];
    assert!(!latency.condition_results[0].triggered);
    assert!(latency.condition_results[1].triggered);
    assert_eq!(latency.condition_results[1].anomaly_score, Some(1.0));

    let store = ctx.scheduler.alert_store();
    assert_eq!(store.len(), 2);
    assert_eq!(store.open_count(), 2);
    assert!(store.latest_for_rule("signups-low").is_none());
    Ok(())
}

#[test]
fn acknowledging_a_recorded_alert_is_idempotent() -> Result<()> {
    let ctx = build_test_context(&business_rules(), &business_metrics())?;
    ctx.scheduler.run_cycle(Utc::now());

    let store = ctx.scheduler.alert_store();
    let open = store.list(&AlertFilter {
        triggered_only: true,
        unacknowledged_only: true,
        ..AlertFilter::default()
    });
    let target = open
        .first()
        .ok_or_else(|| anyhow!("expected an open alert"))?;

    let first_at = Utc::now();
    let first = store.acknowledge(&target.id, "ops", first_at)?;
    assert!(matches!(first, AckOutcome::Acknowledged(_)));
    let second = store.acknowledge(&target.id, "ops", first_at + chrono::Duration::minutes(5))?;
    assert!(matches!(second, AckOutcome::AlreadyAcknowledged(_)));
    assert_eq!(second.status().acknowledged_at, Some(first_at));
    assert_eq!(store.open_count(), 1);
    Ok(())
}

#[test]
fn refresh_reads_rewritten_metrics_and_keeps_last_good_copy() -> Result<()> {
    let rules = json!({
        "rules": [{
            "id": "orders-high",
            "name": "Orders spike",
            "conditions": [{"metric_id": "orders", "operator": ">", "value": 150}]
        }]
    });
    let ctx = build_test_context(&rules, &json!({"metrics": {"orders": {"value": 100}}}))?;

    let report = ctx.scheduler.run_cycle(Utc::now());
    assert!(!report.statuses[0].triggered);

    ctx.rewrite_metrics(&json!({"metrics": {"orders": {"value": 200}}}))?;
    let report = ctx.scheduler.run_cycle(Utc::now());
    assert!(report.statuses[0].triggered);

    std::fs::write(ctx.metrics_path(), "{not json")?;
    let report = ctx.scheduler.run_cycle(Utc::now());
    assert!(report.failures.is_empty());
    assert!(report.statuses[0].triggered);
    assert_eq!(report.statuses[0].condition_results[0].current_value, 200.0);
    Ok(())
}

#[test]
fn missing_metric_fails_only_its_rule() -> Result<()> {
    let rules = json!({
        "rules": [
            {
                "id": "ghost",
                "name": "Unknown metric",
                "conditions": [{"metric_id": "does.not.exist", "operator": ">", "value": 1}]
            },
            {
                "id": "orders-high",
                "name": "Orders spike",
                "conditions": [{"metric_id": "orders", "operator": ">", "value": 150}]
            }
        ]
    });
    let ctx = build_test_context(&rules, &json!({"metrics": {"orders": {"value": 200}}}))?;
    let report = ctx.scheduler.run_cycle(Utc::now());

    assert_eq!(report.statuses.len(), 1);
    assert_eq!(report.statuses[0].rule_id, "orders-high");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].rule_id, "ghost");
    let AlertError::Source { metric_id, .. } = &report.failures[0].error;
    assert_eq!(metric_id, "does.not.exist");
    Ok(())
}

#[tokio::test]
async fn scheduler_loop_runs_cycles_until_stopped() -> Result<()> {
    let ctx = build_test_context(&business_rules(), &business_metrics())?;
    let scheduler = ctx.scheduler.clone();
    let handle = tokio::spawn(async move { scheduler.run().await });

    let store = ctx.scheduler.alert_store().clone();
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while store.len() < 2 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    handle.abort();

    assert!(waited.is_ok(), "first cycle should run immediately");
    assert!(store.open_count() >= 2);
    Ok(())
}
