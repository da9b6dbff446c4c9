//! Rules file handling
//!
//! A missing or malformed file is not fatal for a sync run: `load_or_default`
//! logs the problem and falls back to empty rules and filters.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A declarative label mapping rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// GitLab label selects the JIRA issue type
    LabelToIssueType { label: String, issue_type: String },

    /// GitLab label selects the JIRA status
    LabelToStatus { label: String, status: String },

    /// Any other `type`; kept so one unknown rule doesn't discard the file
    #[serde(other)]
    Unrecognized,
}

impl Rule {
    pub fn label(&self) -> Option<&str> {
        match self {
            Rule::LabelToIssueType { label, .. } | Rule::LabelToStatus { label, .. } => {
                Some(label)
            }
            Rule::Unrecognized => None,
        }
    }
}

/// Required-label filter for one category ("epic" or "non-epic")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub issue_type: String,

    /// Label every item of the category must carry; `None` imposes nothing
    #[serde(default)]
    pub label: Option<String>,
}

impl Filter {
    pub fn new(issue_type: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            issue_type: issue_type.into(),
            label: label.map(String::from),
        }
    }
}

/// Per-run limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLimits {
    /// Epics created in JIRA per run
    #[serde(default = "default_max_created")]
    pub max_epics_created: u32,

    /// Issues created in JIRA per run
    #[serde(default = "default_max_created")]
    pub max_issues_created: u32,

    /// Epics fetched from GitLab per run
    #[serde(default = "default_epic_fetch_limit")]
    pub epic_fetch_limit: u32,

    /// Issues fetched from GitLab per run
    #[serde(default = "default_issue_fetch_limit")]
    pub issue_fetch_limit: u32,
}

fn default_max_created() -> u32 {
    1
}

fn default_epic_fetch_limit() -> u32 {
    100
}

fn default_issue_fetch_limit() -> u32 {
    1000
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            max_epics_created: default_max_created(),
            max_issues_created: default_max_created(),
            epic_fetch_limit: default_epic_fetch_limit(),
            issue_fetch_limit: default_issue_fetch_limit(),
        }
    }
}

/// The `gitlab_to_jira` section of the rules file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// JIRA project that receives created issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_project_key: Option<String>,

    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub filters: Vec<Filter>,

    #[serde(default)]
    pub limits: SyncLimits,

    /// JIRA issue type used for every epic
    #[serde(default = "default_epic_issue_type")]
    pub epic_issue_type: String,

    /// JIRA custom field holding the epic name
    #[serde(default = "default_epic_name_field")]
    pub epic_name_field: String,

    /// Transition issues to their rule-resolved status after each write
    #[serde(default)]
    pub apply_status: bool,
}

fn default_epic_issue_type() -> String {
    "Epic".to_string()
}

fn default_epic_name_field() -> String {
    "customfield_10104".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            jira_project_key: None,
            rules: Vec::new(),
            filters: Vec::new(),
            limits: SyncLimits::default(),
            epic_issue_type: default_epic_issue_type(),
            epic_name_field: default_epic_name_field(),
            apply_status: false,
        }
    }
}

/// Top-level layout of the rules file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gitlab_to_jira: SyncConfig,
}

impl SyncConfig {
    /// Load configuration from a file, failing on any problem
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::SyncError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading sync configuration");

        let content = fs::read_to_string(path)?;
        let file: ConfigFile = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        let config = file.gitlab_to_jira;

        for rule in &config.rules {
            if *rule == Rule::Unrecognized {
                tracing::warn!(path = %path.display(), "Ignoring rule with unrecognized type");
            }
        }

        tracing::debug!(
            rules = config.rules.len(),
            filters = config.filters.len(),
            project = ?config.jira_project_key,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration, degrading to defaults when the file is missing or malformed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Error loading rules, continuing with empty rules and filters"
                );
                Self::default()
            }
        }
    }

    /// Save configuration (format chosen by extension)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = ConfigFile {
            gitlab_to_jira: self.clone(),
        };
        let content = if is_yaml(path) {
            serde_yaml::to_string(&file)?
        } else {
            serde_json::to_string_pretty(&file)?
        };
        fs::write(path, content)?;

        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
