use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A metric's current reading, as handed over by a metric source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub metric_id: String,
    pub metric_name: String,
    pub current_value: f64,
    pub timestamp: DateTime<Utc>,
}

/// A metric's value at the start and at the end of a time window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowValues {
    pub start: f64,
    pub end: f64,
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use lumen_common::types::Severity;
///
/// let sev: Severity = "Warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "warning");
/// assert!(Severity::Critical > Severity::Medium);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    Warning,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::Warning => "warning",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

impl FromStr for Severity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "warning" => Ok(Severity::Warning),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(ParseError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Numeric comparison between a current value and a configured threshold.
///
/// Serialized as its symbol (`">"`, `"<="`, ...); the long names accepted by
/// [`FromStr`] are also accepted when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = ">", alias = "gt", alias = "greater_than")]
    GreaterThan,
    #[serde(rename = "<", alias = "lt", alias = "less_than")]
    LessThan,
    #[serde(rename = ">=", alias = "gte", alias = "greater_equal")]
    GreaterEqual,
    #[serde(rename = "<=", alias = "lte", alias = "less_equal")]
    LessEqual,
    #[serde(rename = "==", alias = "eq", alias = "equal")]
    Equal,
    #[serde(rename = "!=", alias = "ne", alias = "not_equal")]
    NotEqual,
}

impl CompareOp {
    /// Returns `true` when `current <op> threshold` holds.
    #[allow(clippy::float_cmp)]
    pub fn check(&self, current: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => current > threshold,
            Self::LessThan => current < threshold,
            Self::GreaterEqual => current >= threshold,
            Self::LessEqual => current <= threshold,
            Self::Equal => current == threshold,
            Self::NotEqual => current != threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }

    /// Phrase used in alert messages, e.g. "above".
    pub fn describe(&self) -> &'static str {
        match self {
            Self::GreaterThan => "above",
            Self::LessThan => "below",
            Self::GreaterEqual => "at or above",
            Self::LessEqual => "at or below",
            Self::Equal => "equal to",
            Self::NotEqual => "not equal to",
        }
    }
}

impl FromStr for CompareOp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" | "gt" | "greater_than" => Ok(Self::GreaterThan),
            "<" | "lt" | "less_than" => Ok(Self::LessThan),
            ">=" | "gte" | "greater_equal" => Ok(Self::GreaterEqual),
            "<=" | "lte" | "less_equal" => Ok(Self::LessEqual),
            "==" | "eq" | "equal" => Ok(Self::Equal),
            "!=" | "ne" | "not_equal" => Ok(Self::NotEqual),
            _ => Err(ParseError::UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How condition results of one rule are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionLogic {
    #[default]
    And,
    Or,
}

impl FromStr for ConditionLogic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(ParseError::UnknownLogic(s.to_string())),
        }
    }
}

impl fmt::Display for ConditionLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
        }
    }
}

/// Which movement a change-rate condition reacts to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    /// Absolute percentage change, growth or decline.
    #[default]
    Any,
    Increase,
    Decrease,
}

impl FromStr for ChangeDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "absolute" => Ok(Self::Any),
            "increase" | "up" | "growth" => Ok(Self::Increase),
            "decrease" | "down" | "decline" => Ok(Self::Decrease),
            _ => Err(ParseError::UnknownDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    fn suffix(self) -> char {
        match self {
            Self::Seconds => 's',
            Self::Minutes => 'm',
            Self::Hours => 'h',
            Self::Days => 'd',
            Self::Weeks => 'w',
        }
    }

    fn secs(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
            Self::Days => 86_400,
            Self::Weeks => 604_800,
        }
    }
}

/// A look-back window such as `"24h"` used by change-rate conditions.
///
/// # Examples
///
/// ```
/// use lumen_common::types::TimeWindow;
///
/// let window: TimeWindow = "24h".parse().unwrap();
/// assert_eq!(window.as_secs(), 86_400);
/// assert_eq!(window.to_string(), "24h");
/// assert!("0h".parse::<TimeWindow>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
    amount: u32,
    unit: TimeUnit,
}

impl TimeWindow {
    pub fn as_secs(&self) -> u64 {
        u64::from(self.amount) * self.unit.secs()
    }

    pub fn as_duration(&self) -> Duration {
        // u32::MAX weeks still fits chrono's range
        Duration::seconds(self.as_secs() as i64)
    }
}

impl FromStr for TimeWindow {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ParseError::InvalidTimeWindow(s.to_string());

        let suffix = trimmed.chars().last().ok_or_else(invalid)?;
        let unit = match suffix.to_ascii_lowercase() {
            's' => TimeUnit::Seconds,
            'm' => TimeUnit::Minutes,
            'h' => TimeUnit::Hours,
            'd' => TimeUnit::Days,
            'w' => TimeUnit::Weeks,
            _ => return Err(invalid()),
        };
        let digits = &trimmed[..trimmed.len() - suffix.len_utf8()];
        let amount: u32 = digits.parse().map_err(|_| invalid())?;
        if amount == 0 {
            return Err(invalid());
        }
        Ok(Self { amount, unit })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.to_string()
    }
}

/// The band a metric is expected to stay in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRange {
    pub min: f64,
    pub max: f64,
}

impl ExpectedRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both bounds finite and `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Derives `mean ± k_sigma · σ` from a history sample.
    ///
    /// Non-finite samples are ignored. Returns `None` with fewer than two
    /// usable samples or a negative/non-finite `k_sigma`.
    pub fn from_history(values: &[f64], k_sigma: f64) -> Option<Self> {
        if !k_sigma.is_finite() || k_sigma < 0.0 {
            return None;
        }
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.len() < 2 {
            return None;
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let spread = k_sigma * variance.sqrt();
        Some(Self {
            min: mean - spread,
            max: mean + spread,
        })
    }
}

/// What a condition tests. One variant per operator family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionKind {
    Comparison {
        op: CompareOp,
        value: f64,
    },
    ChangeRate {
        window: TimeWindow,
        /// Percentage, e.g. `30.0` for 30%.
        threshold: f64,
        #[serde(default)]
        direction: ChangeDirection,
    },
    Anomaly {
        #[serde(default)]
        range: Option<ExpectedRange>,
        /// Minimum anomaly score in `[0,1]`; any positive score triggers at 0.
        #[serde(default)]
        min_score: f64,
    },
    /// An operator the engine does not understand. Never triggers.
    Unknown { operator: String },
}

/// A single test against one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub metric_id: String,
    pub metric_name: String,
    pub kind: ConditionKind,
}

impl Condition {
    /// Operator tag as it appears in rule configuration.
    pub fn operator(&self) -> String {
        match &self.kind {
            ConditionKind::Comparison { op, .. } => op.symbol().to_string(),
            ConditionKind::ChangeRate { .. } => "change_rate".to_string(),
            ConditionKind::Anomaly { .. } => "anomaly".to_string(),
            ConditionKind::Unknown { operator } => operator.clone(),
        }
    }

    /// The configured number: comparison value, change threshold or minimum score.
    pub fn value(&self) -> f64 {
        match &self.kind {
            ConditionKind::Comparison { value, .. } => *value,
            ConditionKind::ChangeRate { threshold, .. } => *threshold,
            ConditionKind::Anomaly { min_score, .. } => *min_score,
            ConditionKind::Unknown { .. } => 0.0,
        }
    }
}

/// Outcome of evaluating one [`Condition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub metric_id: String,
    pub metric_name: String,
    pub operator: String,
    pub value: f64,
    pub current_value: f64,
    pub triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_score: Option<f64>,
}

fn default_enabled() -> bool {
    true
}

/// A named set of conditions combined with AND/OR logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub condition_logic: ConditionLogic,
    #[serde(alias = "priority")]
    pub severity: Severity,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Rule {
    pub fn metric_ids(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|c| c.metric_id.as_str())
    }
}

/// Verdict produced for one rule in one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertStatus {
    pub id: String,
    pub rule_id: String,
    pub rule_name: String,
    pub triggered: bool,
    pub triggered_at: Option<DateTime<Utc>>,
    pub severity: Severity,
    pub message: String,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub condition_results: Vec<ConditionResult>,
    pub evaluated_at: DateTime<Utc>,
}

impl AlertStatus {
    /// Marks the status acknowledged.
    ///
    /// Only the first call has an effect; it returns `true`. Later calls keep
    /// the original `acknowledged_by` and `acknowledged_at` and return `false`.
    pub fn acknowledge(&mut self, by: impl Into<String>, at: DateTime<Utc>) -> bool {
        if self.acknowledged {
            return false;
        }
        self.acknowledged = true;
        self.acknowledged_by = Some(by.into());
        self.acknowledged_at = Some(at);
        true
    }

    /// Triggered and not yet acknowledged.
    pub fn is_open(&self) -> bool {
        self.triggered && !self.acknowledged
    }
}

/// Score at or above which an anomaly is of high concern.
pub const HIGH_CONCERN_SCORE: f64 = 0.7;
/// Score at or above which an anomaly is of medium concern.
pub const MEDIUM_CONCERN_SCORE: f64 = 0.4;

/// Qualitative band of an anomaly score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyLevel {
    Low,
    Medium,
    High,
}

impl AnomalyLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONCERN_SCORE {
            Self::High
        } else if score >= MEDIUM_CONCERN_SCORE {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for AnomalyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("low"),
            Self::Medium => f.write_str("medium"),
            Self::High => f.write_str("high"),
        }
    }
}

/// One anomaly detection result for a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub metric_id: String,
    pub metric_name: String,
    pub current_value: f64,
    pub expected_range: ExpectedRange,
    /// Always within `[0,1]`.
    pub anomaly_score: f64,
    pub level: AnomalyLevel,
    pub detected_at: DateTime<Utc>,
    pub description: String,
}
