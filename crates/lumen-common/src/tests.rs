use crate::error::ParseError;
use crate::types::*;
use chrono::{Duration, TimeZone, Utc};

fn status() -> AlertStatus {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    AlertStatus {
        id: "1".into(),
        rule_id: "revenue-drop".into(),
        rule_name: "Revenue drop".into(),
        triggered: true,
        triggered_at: Some(now),
        severity: Severity::High,
        message: "Rule Revenue drop triggered".into(),
        acknowledged: false,
        acknowledged_by: None,
        acknowledged_at: None,
        condition_results: Vec::new(),
        evaluated_at: now,
    }
}

#[test]
fn compare_op_parses_symbols_and_names() {
    assert_eq!(">".parse::<CompareOp>().unwrap(), CompareOp::GreaterThan);
    assert_eq!("gte".parse::<CompareOp>().unwrap(), CompareOp::GreaterEqual);
    assert_eq!("not_equal".parse::<CompareOp>().unwrap(), CompareOp::NotEqual);
    assert_eq!(
        "~=".parse::<CompareOp>(),
        Err(ParseError::UnknownOperator("~=".into()))
    );
}

#[test]
fn compare_op_matches_native_comparison() {
    assert!(!CompareOp::GreaterThan.check(45.0, 50.0));
    assert!(CompareOp::LessThan.check(45.0, 50.0));
    assert!(CompareOp::GreaterEqual.check(50.0, 50.0));
    assert!(CompareOp::LessEqual.check(50.0, 50.0));
    assert!(CompareOp::Equal.check(50.0, 50.0));
    assert!(CompareOp::NotEqual.check(49.5, 50.0));
    assert!(!CompareOp::NotEqual.check(50.0, 50.0));
}

#[test]
fn compare_op_deserializes_from_alias() {
    let op: CompareOp = serde_json::from_str(r#""greater_than""#).unwrap();
    assert_eq!(op, CompareOp::GreaterThan);
    assert_eq!(serde_json::to_string(&op).unwrap(), r#"">""#);
}

#[test]
fn severity_ordering_and_parsing() {
    assert!(Severity::Info < Severity::Low);
    assert!(Severity::Warning < Severity::High);
    assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
    assert!("urgent".parse::<Severity>().is_err());
}

#[test]
fn time_window_parsing() {
    let w: TimeWindow = "30m".parse().unwrap();
    assert_eq!(w.as_secs(), 1_800);
    assert_eq!(w.as_duration(), Duration::minutes(30));
    assert_eq!("7d".parse::<TimeWindow>().unwrap().as_secs(), 604_800);
    assert_eq!("2w".parse::<TimeWindow>().unwrap().to_string(), "2w");

    for bad in ["", "h", "24", "24x", "-1h", "0m", "1.5h"] {
        assert!(bad.parse::<TimeWindow>().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn time_window_serde_uses_string_form() {
    let w: TimeWindow = serde_json::from_str(r#""24h""#).unwrap();
    assert_eq!(w.as_secs(), 86_400);
    assert_eq!(serde_json::to_string(&w).unwrap(), r#""24h""#);
    assert!(serde_json::from_str::<TimeWindow>(r#""soon""#).is_err());
}

#[test]
fn expected_range_validity() {
    assert!(ExpectedRange::new(1.0, 2.0).is_valid());
    assert!(ExpectedRange::new(2.0, 2.0).is_valid());
    assert!(!ExpectedRange::new(3.0, 2.0).is_valid());
    assert!(!ExpectedRange::new(f64::NAN, 2.0).is_valid());
    assert!(ExpectedRange::new(1.0, 2.0).contains(1.0));
    assert!(!ExpectedRange::new(1.0, 2.0).contains(2.5));
}

#[test]
fn expected_range_from_history() {
    let range = ExpectedRange::from_history(&[10.0, 12.0, 14.0, f64::NAN], 1.0).unwrap();
    let sd = (8.0_f64 / 3.0).sqrt();
    assert!((range.min - (12.0 - sd)).abs() < 1e-9);
    assert!((range.max - (12.0 + sd)).abs() < 1e-9);

    assert!(ExpectedRange::from_history(&[10.0], 2.0).is_none());
    assert!(ExpectedRange::from_history(&[10.0, 11.0], -1.0).is_none());
}

#[test]
fn condition_reports_operator_and_value() {
    let c = Condition {
        metric_id: "m1".into(),
        metric_name: "Revenue".into(),
        kind: ConditionKind::ChangeRate {
            window: "24h".parse().unwrap(),
            threshold: 30.0,
            direction: ChangeDirection::Any,
        },
    };
    assert_eq!(c.operator(), "change_rate");
    assert_eq!(c.value(), 30.0);

    let unknown = Condition {
        metric_id: "m1".into(),
        metric_name: "Revenue".into(),
        kind: ConditionKind::Unknown {
            operator: "between".into(),
        },
    };
    assert_eq!(unknown.operator(), "between");
    assert_eq!(unknown.value(), 0.0);
}

#[test]
fn rule_deserializes_with_defaults_and_priority_alias() {
    let rule: Rule = serde_json::from_str(
        r#"{
            "id": "r1",
            "name": "Churn spike",
            "priority": "high",
            "conditions": [
                {"metric_id": "churn", "metric_name": "Churn",
                 "kind": {"kind": "comparison", "op": ">", "value": 5.0}}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(rule.severity, Severity::High);
    assert_eq!(rule.condition_logic, ConditionLogic::And);
    assert!(rule.enabled);
    assert_eq!(rule.metric_ids().collect::<Vec<_>>(), vec!["churn"]);
}

#[test]
fn acknowledge_is_idempotent() {
    let mut s = status();
    let first = Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap();
    let second = first + Duration::minutes(10);

    assert!(s.is_open());
    assert!(s.acknowledge("alice", first));
    assert!(!s.acknowledge("bob", second));

    assert!(s.acknowledged);
    assert_eq!(s.acknowledged_by.as_deref(), Some("alice"));
    assert_eq!(s.acknowledged_at, Some(first));
    assert!(!s.is_open());
}

#[test]
fn anomaly_level_bands() {
    assert_eq!(AnomalyLevel::from_score(0.0), AnomalyLevel::Low);
    assert_eq!(AnomalyLevel::from_score(0.39), AnomalyLevel::Low);
    assert_eq!(AnomalyLevel::from_score(0.4), AnomalyLevel::Medium);
    assert_eq!(AnomalyLevel::from_score(0.69), AnomalyLevel::Medium);
    assert_eq!(AnomalyLevel::from_score(0.7), AnomalyLevel::High);
    assert_eq!(AnomalyLevel::from_score(1.0), AnomalyLevel::High);
}
