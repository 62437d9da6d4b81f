//! Rule evaluation engine for metric alerts.
//!
//! Each condition of a [`Rule`](lumen_common::types::Rule) is evaluated on
//! its own against a freshly fetched value ([`condition`]); comparison
//! conditions compare directly, change-rate conditions go through
//! [`change_rate`], anomaly conditions through [`anomaly`]. The per-condition
//! results are then folded into one
//! [`AlertStatus`](lumen_common::types::AlertStatus) by [`aggregate`].
//!
//! All evaluation is pure: the engine keeps no state between calls, and
//! metric values come from an injected [`MetricSource`].

pub mod aggregate;
pub mod anomaly;
pub mod change_rate;
pub mod condition;
pub mod engine;
pub mod error;
pub mod source;


pub use engine::{evaluate_cycle, evaluate_rule, scan_anomalies, CycleReport, RuleFailure};
pub use error::{AlertError, SourceError};
pub use source::{MetricSource, StaticMetricSource};
