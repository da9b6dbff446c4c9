//! Configuration system
//!
//! Loads the `gitlab_to_jira` rules file (JSON, or YAML by extension) with:
//! - Label-to-issue-type and label-to-status rules
//! - Per-category required-label filters
//! - The JIRA project key and per-run creation/fetch limits
//!
//! Connection settings for both trackers come from the CLI and environment.

mod integrations;
mod sync_config;
pub mod validation;

pub use integrations::{GitLabIntegration, JiraIntegration};
pub use sync_config::{ConfigFile, Filter, Rule, SyncConfig, SyncLimits};
pub use validation::{validate_config, ValidationError};
