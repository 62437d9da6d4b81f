use lumen_common::types::{ChangeDirection, WindowValues};

/// Outcome of a change-rate check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeRateVerdict {
    /// Percentage change from start to end; `None` when undefined.
    pub rate: Option<f64>,
    pub triggered: bool,
}

/// Percentage change from `start` to `end`.
///
/// Positive when the value grew, negative when it fell. Undefined (`None`)
/// for a zero baseline or non-finite inputs.
///
/// Divides by `|start|`, so for a negative baseline the sign still follows
/// the direction of movement (-100 to -50 is +50%).
pub fn change_rate(start: f64, end: f64) -> Option<f64> {
    if !start.is_finite() || !end.is_finite() || start.abs() < f64::EPSILON {
        return None;
    }
    // Multiply before dividing so whole-number inputs give exact percentages.
    Some((end - start) * 100.0 / start.abs())
}

/// Checks a window's change against a percentage `threshold`.
pub fn detect(values: WindowValues, threshold: f64, direction: ChangeDirection) -> ChangeRateVerdict {
    let rate = change_rate(values.start, values.end);
    let triggered = rate.is_some_and(|r| match direction {
        ChangeDirection::Any => r.abs() >= threshold,
        ChangeDirection::Increase => r >= threshold,
        ChangeDirection::Decrease => -r >= threshold,
    });
    ChangeRateVerdict { rate, triggered }
}
