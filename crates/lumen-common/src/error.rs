/// Errors raised while parsing rule configuration values.
///
/// # Examples
///
/// ```rust
/// use lumen_common::error::ParseError;
///
/// let err = ParseError::InvalidTimeWindow("24x".to_string());
/// assert!(err.to_string().contains("24x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A window string that is not `<amount><s|m|h|d|w>` with a positive amount.
    #[error("invalid time window '{0}' (expected e.g. 30m, 24h, 7d)")]
    InvalidTimeWindow(String),

    #[error("unknown compare operator: {0}")]
    UnknownOperator(String),

    #[error("unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("unknown condition logic: {0}")]
    UnknownLogic(String),

    #[error("unknown change direction: {0}")]
    UnknownDirection(String),
}
