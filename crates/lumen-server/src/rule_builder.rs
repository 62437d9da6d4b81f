use anyhow::Result;
use lumen_common::types::{
    ChangeDirection, CompareOp, Condition, ConditionKind, ConditionLogic, Rule, Severity,
    TimeWindow,
};
use lumen_storage::RuleStore;

use crate::config::{RulesSeedFile, SeedCondition, SeedRule};

const OP_CHANGE_RATE: &str = "change_rate";
const OP_ANOMALY: &str = "anomaly";

// ---- Seed row -> Condition ----

/// Convert one seed condition into a typed [`Condition`].
///
/// Operators the engine does not know become [`ConditionKind::Unknown`];
/// malformed change-rate or anomaly settings are errors.
pub fn build_condition(seed: &SeedCondition) -> Result<Condition> {
    let kind = match seed.operator.trim() {
        OP_CHANGE_RATE => {
            let raw = seed
                .time_window
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("change_rate condition requires time_window"))?;
            let window: TimeWindow = raw.parse()?;
            let direction: ChangeDirection = match seed.direction.as_deref() {
                Some(d) => d.parse()?,
                None => ChangeDirection::default(),
            };
            ConditionKind::ChangeRate {
                window,
                threshold: seed.value,
                direction,
            }
        }
        OP_ANOMALY => {
            if !(0.0..=1.0).contains(&seed.value) {
                anyhow::bail!("anomaly min score {} outside [0, 1]", seed.value);
            }
            ConditionKind::Anomaly {
                range: seed.expected_range,
                min_score: seed.value,
            }
        }
        other => match other.parse::<CompareOp>() {
            Ok(op) => ConditionKind::Comparison {
                op,
                value: seed.value,
            },
            Err(_) => {
                tracing::debug!(metric_id = %seed.metric_id, operator = %other, "Unknown operator, condition will never trigger");
                ConditionKind::Unknown {
                    operator: other.to_string(),
                }
            }
        },
    };

    Ok(Condition {
        metric_id: seed.metric_id.clone(),
        metric_name: seed
            .metric_name
            .clone()
            .unwrap_or_else(|| seed.metric_id.clone()),
        kind,
    })
}

// ---- Seed row -> Rule ----

pub fn build_rule(seed: &SeedRule) -> Result<Rule> {
    let severity: Severity = seed.severity.parse().unwrap_or_else(|_| {
        tracing::warn!(rule_name = %seed.name, severity = %seed.severity, "Unknown severity, using info");
        Severity::Info
    });
    let condition_logic: ConditionLogic = seed.condition_logic.parse()?;
    let conditions = seed
        .conditions
        .iter()
        .map(build_condition)
        .collect::<Result<Vec<_>>>()?;

    Ok(Rule {
        id: seed
            .id
            .clone()
            .unwrap_or_else(lumen_common::id::next_id),
        name: seed.name.clone(),
        description: seed.description.clone(),
        conditions,
        condition_logic,
        severity,
        enabled: seed.enabled,
    })
}

/// Convert seed rows into rules, skipping invalid ones with warnings.
pub fn build_rules(seeds: &[SeedRule]) -> Vec<Rule> {
    let mut rules = Vec::with_capacity(seeds.len());
    for seed in seeds {
        match build_rule(seed) {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                tracing::warn!(
                    rule_id = seed.id.as_deref().unwrap_or("-"),
                    rule_name = %seed.name,
                    error = %e,
                    "Skipping invalid alert rule"
                );
            }
        }
    }
    rules
}

pub fn parse_rules_seed(content: &str) -> Result<Vec<Rule>> {
    let seed: RulesSeedFile = serde_json::from_str(content)?;
    Ok(build_rules(&seed.rules))
}

pub fn load_rules_file(path: &str) -> Result<Vec<Rule>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read rules file '{}': {}", path, e))?;
    parse_rules_seed(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse rules file '{}': {}", path, e))
}

// ---- Store reload ----

/// Replace the store's rules with the contents of `path`. Returns the number of loaded rules.
pub fn reload_rule_store(rule_store: &RuleStore, path: &str) -> Result<usize> {
    let rules = load_rules_file(path)?;
    let count = rule_store.replace_all(rules);
    tracing::info!(rule_count = count, path = %path, "Rule store reloaded from seed file");
    Ok(count)
}
