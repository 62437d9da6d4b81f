//! Shared data model for the lumen alerting engine.
//!
//! Everything here is plain data: metric snapshots, rule and condition
//! definitions, and the verdict records produced by `lumen-alert`.

pub mod error;
pub mod id;
pub mod types;

#[cfg(test)]
mod tests;
