use lumen_common::types::{Condition, ConditionKind, ConditionResult, ExpectedRange, WindowValues};

use crate::{anomaly, change_rate};

/// Values a condition is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionInputs {
    pub current_value: f64,
    /// Start/end values, needed by change-rate conditions.
    pub window: Option<WindowValues>,
    /// Fallback range for anomaly conditions without a configured one.
    pub expected_range: Option<ExpectedRange>,
}

impl ConditionInputs {
    pub fn current(value: f64) -> Self {
        Self {
            current_value: value,
            ..Self::default()
        }
    }

    pub fn windowed(values: WindowValues) -> Self {
        Self {
            current_value: values.end,
            window: Some(values),
            expected_range: None,
        }
    }
}

/// Evaluates one condition. Pure; never fails.
pub fn evaluate_condition(condition: &Condition, inputs: &ConditionInputs) -> ConditionResult {
    let mut change = None;
    let mut score = None;

    let triggered = match &condition.kind {
        ConditionKind::Comparison { op, value } => op.check(inputs.current_value, *value),
        ConditionKind::ChangeRate {
            threshold,
            direction,
            ..
        } => match inputs.window {
            Some(values) => {
                let verdict = change_rate::detect(values, *threshold, *direction);
                change = verdict.rate;
                verdict.triggered
            }
            None => false,
        },
        ConditionKind::Anomaly { range, min_score } => {
            let s = range
                .or(inputs.expected_range)
                .map_or(0.0, |r| anomaly::anomaly_score(inputs.current_value, &r));
            score = Some(s);
            s > 0.0 && s >= *min_score
        }
        ConditionKind::Unknown { operator } => {
            tracing::debug!(
                metric_id = %condition.metric_id,
                operator = %operator,
                "Unknown condition operator, treating as not triggered"
            );
            false
        }
    };

    ConditionResult {
        metric_id: condition.metric_id.clone(),
        metric_name: condition.metric_name.clone(),
        operator: condition.operator(),
        value: condition.value(),
        current_value: inputs.current_value,
        triggered,
        change_rate: change,
        anomaly_score: score,
    }
}
