use chrono::{DateTime, Utc};
use lumen_common::types::{AlertStatus, ConditionLogic, ConditionResult, Rule};

/// Combines the condition results of `rule` into one [`AlertStatus`].
///
/// `results` must hold one entry per condition, in condition order. A rule
/// without conditions never triggers. Severity is copied from the rule.
pub fn aggregate(rule: &Rule, results: Vec<ConditionResult>, now: DateTime<Utc>) -> AlertStatus {
    debug_assert_eq!(rule.conditions.len(), results.len());

    let triggered = !results.is_empty()
        && match rule.condition_logic {
            ConditionLogic::And => results.iter().all(|r| r.triggered),
            ConditionLogic::Or => results.iter().any(|r| r.triggered),
        };

    let message = if triggered {
        let summary: Vec<String> = results
            .iter()
            .filter(|r| r.triggered)
            .map(summarize)
            .collect();
        format!("Rule {} triggered: {}", rule.name, summary.join("; "))
    } else {
        "Normal".to_string()
    };

    AlertStatus {
        id: lumen_common::id::next_id(),
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        triggered,
        triggered_at: triggered.then_some(now),
        severity: rule.severity,
        message,
        acknowledged: false,
        acknowledged_by: None,
        acknowledged_at: None,
        condition_results: results,
        evaluated_at: now,
    }
}

fn summarize(result: &ConditionResult) -> String {
    if let Some(rate) = result.change_rate {
        return format!(
            "{} changed by {:.1}% (threshold: {:.1}%)",
            result.metric_name, rate, result.value
        );
    }
    if let Some(score) = result.anomaly_score {
        return format!(
            "{} is anomalous at {:.2} (score {:.2})",
            result.metric_name, result.current_value, score
        );
    }
    format!(
        "{} is {} {} {}",
        result.metric_name, result.current_value, result.operator, result.value
    )
}
