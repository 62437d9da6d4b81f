/// Errors returned by a [`MetricSource`](crate::MetricSource).
///
/// # Examples
///
/// ```rust
/// use lumen_alert::SourceError;
///
/// let err = SourceError::MetricNotFound("revenue".to_string());
/// assert!(err.to_string().contains("revenue"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source: metric '{0}' not found")]
    MetricNotFound(String),

    /// The source has no start/end values for the requested window.
    #[error("Source: no {window} window for metric '{metric_id}'")]
    WindowUnavailable { metric_id: String, window: String },

    #[error("Source: I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source: {0}")]
    Other(String),
}

/// Errors that abort the evaluation of a single rule.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Alert: rule '{rule_id}' could not read metric '{metric_id}': {source}")]
    Source {
        rule_id: String,
        metric_id: String,
        source: SourceError,
    },
}

pub type Result<T> = std::result::Result<T, AlertError>;
