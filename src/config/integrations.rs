//! Connection settings for the GitLab source and JIRA destination

use serde::{Deserialize, Serialize};

/// GitLab connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabIntegration {
    /// GitLab instance URL (e.g., "https://gitlab.com")
    pub url: String,

    /// Personal or group access token
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl GitLabIntegration {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// JIRA connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIntegration {
    /// JIRA instance URL
    pub url: String,

    /// Bearer token
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Custom field that carries the epic name on epic creation
    pub epic_name_field: String,

    /// Accept invalid TLS certificates (self-hosted instances)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl JiraIntegration {
    pub fn new(url: impl Into<String>, epic_name_field: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            epic_name_field: epic_name_field.into(),
            accept_invalid_certs: false,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}
