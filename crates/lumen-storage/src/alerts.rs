use chrono::{DateTime, Utc};
use lumen_common::types::{AlertStatus, Severity};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, StorageError};

const ENTITY: &str = "alert";

/// Default bound on the number of kept statuses.
pub const DEFAULT_MAX_ALERTS: usize = 1000;

/// Result of [`AlertStore::acknowledge`].
#[derive(Debug, Clone, PartialEq)]
pub enum AckOutcome {
    /// This call acknowledged the alert.
    Acknowledged(AlertStatus),
    /// The alert had been acknowledged before; nothing changed.
    AlreadyAcknowledged(AlertStatus),
}

impl AckOutcome {
    pub fn status(&self) -> &AlertStatus {
        match self {
            Self::Acknowledged(s) | Self::AlreadyAcknowledged(s) => s,
        }
    }
}

/// Status list filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub rule_id_eq: Option<String>,
    pub triggered_only: bool,
    pub unacknowledged_only: bool,
    pub min_severity: Option<Severity>,
    pub limit: Option<usize>,
}

impl AlertFilter {
    fn matches(&self, status: &AlertStatus) -> bool {
        if self.rule_id_eq.as_ref().is_some_and(|id| *id != status.rule_id) {
            return false;
        }
        if self.triggered_only && !status.triggered {
            return false;
        }
        if self.unacknowledged_only && status.acknowledged {
            return false;
        }
        if self.min_severity.is_some_and(|min| status.severity < min) {
            return false;
        }
        true
    }
}

/// Recent alert statuses, bounded in size.
#[derive(Debug)]
pub struct AlertStore {
    alerts: RwLock<Vec<AlertStatus>>,
    max_alerts: usize,
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALERTS)
    }
}

impl AlertStore {
    /// `max_alerts` is raised to 1 if zero.
    pub fn new(max_alerts: usize) -> Self {
        Self {
            alerts: RwLock::new(Vec::new()),
            max_alerts: max_alerts.max(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<AlertStatus>> {
        self.alerts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<AlertStatus>> {
        self.alerts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a status.
    ///
    /// At 90% capacity untriggered statuses are dropped; if the store is
    /// still full, the oldest entries go.
    pub fn record(&self, status: AlertStatus) {
        let mut alerts = self.write();

        if alerts.len() >= self.max_alerts.saturating_mul(9) / 10 {
            alerts.retain(|a| a.triggered);
        }
        let overflow = (alerts.len() + 1).saturating_sub(self.max_alerts);
        if overflow > 0 {
            tracing::debug!(evicted = overflow, "Alert store full, evicting oldest statuses");
            alerts.drain(..overflow);
        }

        alerts.push(status);
    }

    pub fn record_all(&self, statuses: impl IntoIterator<Item = AlertStatus>) {
        for status in statuses {
            self.record(status);
        }
    }

    pub fn get(&self, id: &str) -> Option<AlertStatus> {
        self.read().iter().find(|a| a.id == id).cloned()
    }

    /// Acknowledges the status with `id`.
    ///
    /// The first call sets `acknowledged_by` and `acknowledged_at`; repeated
    /// or concurrent calls for the same id leave them untouched.
    pub fn acknowledge(&self, id: &str, by: &str, at: DateTime<Utc>) -> Result<AckOutcome> {
        let mut alerts = self.write();
        let status = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StorageError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })?;

        if status.acknowledge(by, at) {
            tracing::info!(alert_id = %id, rule_id = %status.rule_id, acknowledged_by = %by, "Alert acknowledged");
            Ok(AckOutcome::Acknowledged(status.clone()))
        } else {
            Ok(AckOutcome::AlreadyAcknowledged(status.clone()))
        }
    }

    /// Matching statuses, newest first.
    pub fn list(&self, filter: &AlertFilter) -> Vec<AlertStatus> {
        let alerts = self.read();
        let matching = alerts.iter().rev().filter(|a| filter.matches(a)).cloned();
        match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }

    /// Most recent status recorded for a rule.
    pub fn latest_for_rule(&self, rule_id: &str) -> Option<AlertStatus> {
        self.read().iter().rev().find(|a| a.rule_id == rule_id).cloned()
    }

    /// Triggered statuses not yet acknowledged.
    pub fn open_count(&self) -> usize {
        self.read().iter().filter(|a| a.is_open()).count()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
