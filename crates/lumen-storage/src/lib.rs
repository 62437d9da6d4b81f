//! In-memory stores that sit around the alert engine.
//!
//! [`RuleStore`] is the CRUD-managed rule set read on every evaluation
//! cycle. [`AlertStore`] keeps recent [`AlertStatus`](lumen_common::types::AlertStatus)
//! records and is the only place they are mutated, through
//! [`AlertStore::acknowledge`].
//!
//! Both are `Send + Sync` and meant to be shared behind an `Arc`.

pub mod alerts;
pub mod error;
pub mod rules;


pub use alerts::{AckOutcome, AlertFilter, AlertStore, DEFAULT_MAX_ALERTS};
pub use error::{Result, StorageError};
pub use rules::{RuleFilter, RuleStore};
