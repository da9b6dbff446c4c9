//! Error types for gitlab-jira-sync
//!
//! Defines the error enum covering configuration, transport, storage and
//! rule-evaluation failures. Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Comprehensive error type for sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parsing errors (mapping file lines, API payloads)
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success responses from GitLab or JIRA
    #[error("Integration error: {0}")]
    Integration(String),

    /// Two rules of the same kind matched one item with different values
    #[error(
        "Ambiguous {rule} mapping for item {item_id}: label '{first_label}' maps to '{first_value}' \
         but label '{second_label}' maps to '{second_value}'"
    )]
    AmbiguousMapping {
        item_id: String,
        rule: &'static str,
        first_label: String,
        first_value: String,
        second_label: String,
        second_value: String,
    },

    /// A rule lookup was attempted on an item without any labels
    #[error("Item {item_id} has no labels, cannot resolve {rule}")]
    MissingLabels { item_id: String, rule: &'static str },

    /// No label-to-type rule matched an item that needs a destination type
    #[error("Issue type not determined for item {item_id}: no rule matches labels {labels:?}")]
    NoTypeMapping { item_id: String, labels: Vec<String> },

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl SyncError {
    /// Whether this error means the rule configuration is broken for an item
    pub fn is_rule_error(&self) -> bool {
        matches!(
            self,
            SyncError::AmbiguousMapping { .. }
                | SyncError::MissingLabels { .. }
                | SyncError::NoTypeMapping { .. }
        )
    }
}
