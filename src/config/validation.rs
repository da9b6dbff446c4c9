//! Configuration validation
//!
//! Catches rule-file problems before a run instead of item by item:
//! - Missing JIRA project key
//! - Rules with empty labels or an unrecognized type
//! - Filters naming an unknown category
//! - One label mapped to two different values of the same rule kind

use super::sync_config::{Rule, SyncConfig};
use crate::model::ItemKind;
use std::collections::HashMap;

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a sync configuration, returning every problem found
pub fn validate_config(config: &SyncConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match config.jira_project_key.as_deref() {
        None => errors.push(ValidationError::new(
            "jira_project_key",
            "No JIRA project key configured; items cannot be created",
        )),
        Some(key) if key.trim().is_empty() => errors.push(ValidationError::new(
            "jira_project_key",
            "JIRA project key cannot be empty",
        )),
        Some(_) => {}
    }

    let mut type_by_label: HashMap<&str, &str> = HashMap::new();
    let mut status_by_label: HashMap<&str, &str> = HashMap::new();

    for (idx, rule) in config.rules.iter().enumerate() {
        let field = format!("rules[{}]", idx);
        let (label, value, seen, kind) = match rule {
            Rule::LabelToIssueType { label, issue_type } => {
                (label, issue_type, &mut type_by_label, "issue type")
            }
            Rule::LabelToStatus { label, status } => (label, status, &mut status_by_label, "status"),
            Rule::Unrecognized => {
                errors.push(ValidationError::new(field, "Unrecognized rule type is ignored"));
                continue;
            }
        };

        if label.trim().is_empty() {
            errors.push(ValidationError::new(field.clone(), "Rule label cannot be empty"));
        }
        if value.trim().is_empty() {
            errors.push(ValidationError::new(
                field.clone(),
                format!("Rule {} cannot be empty", kind),
            ));
        }

        if let Some(previous) = seen.insert(label.as_str(), value.as_str()) {
            if previous != value.as_str() {
                errors.push(ValidationError::new(
                    field,
                    format!(
                        "Label '{}' maps to {} '{}' and '{}'",
                        label, kind, previous, value
                    ),
                ));
            }
        }
    }

    for (idx, filter) in config.filters.iter().enumerate() {
        let known = [ItemKind::Epic, ItemKind::Issue]
            .iter()
            .any(|kind| kind.matches_category(&filter.issue_type));
        if !known {
            errors.push(ValidationError::new(
                format!("filters[{}].issue_type", idx),
                format!(
                    "Unknown category '{}'. Must be one of: epic, non-epic",
                    filter.issue_type
                ),
            ));
        }
    }

    if config.epic_issue_type.trim().is_empty() {
        errors.push(ValidationError::new(
            "epic_issue_type",
            "Epic issue type cannot be empty",
        ));
    }

    errors
}
