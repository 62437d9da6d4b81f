use lumen_common::types::{Rule, Severity};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, StorageError};

const ENTITY: &str = "rule";

/// Rule list filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    pub name_contains: Option<String>,
    /// Glob matched against the metric ids a rule's conditions reference
    /// (e.g. `"revenue.*"`). A rule matches if any of its metrics does.
    pub metric_pattern: Option<String>,
    pub severity_eq: Option<Severity>,
    pub enabled_eq: Option<bool>,
}

impl RuleFilter {
    fn matches(&self, rule: &Rule) -> bool {
        if let Some(needle) = &self.name_contains {
            if !rule.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(pattern) = &self.metric_pattern {
            if !rule.metric_ids().any(|m| metric_matches(pattern, m)) {
                return false;
            }
        }
        if self.severity_eq.is_some_and(|s| s != rule.severity) {
            return false;
        }
        if self.enabled_eq.is_some_and(|e| e != rule.enabled) {
            return false;
        }
        true
    }
}

fn metric_matches(pattern: &str, metric_id: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    glob_match::glob_match(pattern, metric_id)
}

/// Rule set managed by a CRUD layer and read by the evaluation scheduler.
///
/// Rules keep their insertion order.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: RwLock<Vec<Rule>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Rule>> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Rule>> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a rule. Fails if a rule with the same id exists.
    pub fn insert(&self, rule: Rule) -> Result<()> {
        let mut rules = self.write();
        if rules.iter().any(|r| r.id == rule.id) {
            return Err(StorageError::Duplicate {
                entity: ENTITY,
                id: rule.id,
            });
        }
        tracing::debug!(rule_id = %rule.id, "Rule inserted");
        rules.push(rule);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Rule> {
        self.read().iter().find(|r| r.id == id).cloned()
    }

    /// Replaces the stored rule with the same id and returns the old one.
    pub fn update(&self, rule: Rule) -> Result<Rule> {
        let mut rules = self.write();
        let existing = rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| StorageError::NotFound {
                entity: ENTITY,
                id: rule.id.clone(),
            })?;
        Ok(std::mem::replace(existing, rule))
    }

    /// Removes and returns the rule.
    pub fn delete(&self, id: &str) -> Result<Rule> {
        let mut rules = self.write();
        let pos = rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })?;
        Ok(rules.remove(pos))
    }

    /// Enables or disables a rule and returns the updated rule.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<Rule> {
        let mut rules = self.write();
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })?;
        rule.enabled = enabled;
        Ok(rule.clone())
    }

    pub fn list(&self, filter: &RuleFilter) -> Vec<Rule> {
        self.read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub fn list_enabled(&self) -> Vec<Rule> {
        self.list(&RuleFilter {
            enabled_eq: Some(true),
            ..RuleFilter::default()
        })
    }

    /// Replaces the whole rule set. Later duplicates of an id are dropped.
    /// Returns the number of rules kept.
    pub fn replace_all(&self, rules: Vec<Rule>) -> usize {
        let mut kept: Vec<Rule> = Vec::with_capacity(rules.len());
        for rule in rules {
            if kept.iter().any(|r| r.id == rule.id) {
                tracing::warn!(rule_id = %rule.id, "Duplicate rule id, keeping the first definition");
                continue;
            }
            kept.push(rule);
        }
        let count = kept.len();
        *self.write() = kept;
        count
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
