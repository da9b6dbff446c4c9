//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use gitlab_jira_sync::model::ItemKind;
use std::path::PathBuf;

/// Sync GitLab epics and issues into JIRA
#[derive(Parser, Debug)]
#[command(name = "gitlab-jira-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Rules file (JSON, or YAML by extension)
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Mapping store (JSON Lines)
    #[arg(short, long, global = true, default_value = "issue_mapping.jsonl")]
    pub mapping: PathBuf,

    // =========================================================================
    // CONNECTION FLAGS
    // =========================================================================
    /// GitLab server URL (e.g., https://gitlab.example.com)
    #[arg(long, global = true, env = "GITLAB_BASE_URL")]
    pub gitlab_url: Option<String>,

    /// GitLab access token
    #[arg(long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// GitLab group holding the epics and the project
    #[arg(long, global = true, env = "GITLAB_GROUP")]
    pub group: Option<String>,

    /// GitLab project whose issues are synchronized
    #[arg(long, global = true, env = "GITLAB_PROJECT")]
    pub project: Option<String>,

    /// JIRA server URL (e.g., https://jira.example.com)
    #[arg(long, global = true, env = "JIRA_URL")]
    pub jira_url: Option<String>,

    /// JIRA access token
    #[arg(long, global = true, env = "JIRA_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,

    /// JIRA project key (overrides the rules file; without any, only mapped items are updated)
    #[arg(short = 'k', long, global = true)]
    pub project_key: Option<String>,

    /// Accept invalid TLS certificates from JIRA
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one sync pass (epics, then issues)
    Sync {
        /// Only synchronize one category (epics or issues)
        #[arg(long)]
        only: Option<ItemKind>,

        /// Transition issues to the status their labels map to
        #[arg(long)]
        apply_status: bool,

        /// Maximum JIRA epics to create in this run
        #[arg(long)]
        max_epics: Option<u32>,

        /// Maximum JIRA issues to create in this run
        #[arg(long)]
        max_issues: Option<u32>,
    },

    /// Show recorded GitLab-to-JIRA mappings
    Mappings {
        /// Only show one kind (epic or issue)
        #[arg(long)]
        kind: Option<ItemKind>,

        /// Only show the mapping for this GitLab id
        #[arg(long)]
        source_id: Option<String>,
    },

    /// Show the loaded rules and filters, with validation problems
    Rules,

    /// List the projects of the GitLab group
    Projects,
}

impl Cli {
    /// Required connection value, naming the flag and env var when absent
    pub fn require<'a>(value: &'a Option<String>, flag: &str, env: &str) -> anyhow::Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing {} (or set {})", flag, env))
    }
}
