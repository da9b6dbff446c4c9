//! JIRA Integration Adapter
//!
//! Creates, updates and transitions mirrored issues using the REST API (v2).

use super::client::DestinationClient;
use crate::config::JiraIntegration;
use crate::model::{IssueDraft, ItemKind};
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout for single reads
const GET_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout for create/update operations
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);
/// JIRA rejects epics without a description; GitLab allows them
const EMPTY_EPIC_DESCRIPTION: &str = "<empty>";

/// JIRA API client
pub struct JiraAdapter {
    client: Client,
    config: JiraIntegration,
    base_url: String,
    auth_token: Option<String>,
}

/// Response body of issue creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraCreatedIssue {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraTransition {
    pub id: String,
    pub name: String,
    pub to: JiraStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraTransitionsResponse {
    pub transitions: Vec<JiraTransition>,
}

#[derive(Debug, Clone, Serialize)]
struct JiraTransitionRequest {
    transition: JiraTransitionId,
}

#[derive(Debug, Clone, Serialize)]
struct JiraTransitionId {
    id: String,
}

impl JiraAdapter {
    /// Create a new JIRA adapter
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: JiraIntegration) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        if config.accept_invalid_certs {
            warn!(url = %config.url, "TLS certificate verification disabled for JIRA");
        }

        let base_url = format!("{}/rest/api/2", config.url.trim_end_matches('/'));
        let auth_token = config.token.clone();

        Ok(Self {
            client,
            config,
            base_url,
            auth_token,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Get available transitions for an issue
    pub async fn get_transitions(&self, key: &str) -> Result<Vec<JiraTransition>> {
        let url = format!("{}/issue/{}/transitions", self.base_url, key);

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.timeout(GET_TIMEOUT).send().await?;

        match response.status() {
            StatusCode::OK => {
                let result: JiraTransitionsResponse = response.json().await?;
                Ok(result.transitions)
            }
            StatusCode::NOT_FOUND => Err(crate::SyncError::Integration(format!(
                "JIRA issue not found: {}",
                key
            ))),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(crate::SyncError::Integration(format!(
                    "JIRA API error: HTTP {}: {}",
                    status, error_body
                )))
            }
        }
    }

    /// Apply a transition by id
    pub async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        let url = format!("{}/issue/{}/transitions", self.base_url, key);

        let body = JiraTransitionRequest {
            transition: JiraTransitionId {
                id: transition_id.to_string(),
            },
        };

        info!(key = %key, transition_id = %transition_id, "Transitioning JIRA issue");

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.timeout(WRITE_TIMEOUT).send().await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(crate::SyncError::Integration(format!(
                    "JIRA transition failed: HTTP {}: {}",
                    status, error_body
                )))
            }
        }
    }

    fn payload(&self, project_key: Option<&str>, draft: &IssueDraft<'_>) -> Value {
        issue_payload(project_key, draft, &self.config.epic_name_field)
    }
}

#[async_trait]
impl DestinationClient for JiraAdapter {
    async fn create(&self, project_key: &str, draft: &IssueDraft<'_>) -> Result<String> {
        let url = format!("{}/issue", self.base_url);
        let body = self.payload(Some(project_key), draft);

        debug!(project = %project_key, title = %draft.title, "Creating JIRA issue");

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.timeout(WRITE_TIMEOUT).send().await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => {
                let created: JiraCreatedIssue = response.json().await?;
                info!(key = %created.key, "Created JIRA issue");
                Ok(created.key)
            }
            StatusCode::UNAUTHORIZED => Err(crate::SyncError::Auth(
                "JIRA authentication failed".to_string(),
            )),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(crate::SyncError::Integration(format!(
                    "JIRA API error creating issue: HTTP {}: {}",
                    status, error_body
                )))
            }
        }
    }

    async fn update(&self, destination_id: &str, draft: &IssueDraft<'_>) -> Result<String> {
        let url = format!("{}/issue/{}", self.base_url, destination_id);
        let body = self.payload(None, draft);

        debug!(key = %destination_id, title = %draft.title, "Updating JIRA issue");

        let mut request = self.client.put(&url).json(&body);
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.timeout(WRITE_TIMEOUT).send().await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => {
                info!(key = %destination_id, "Updated JIRA issue");
                Ok(destination_id.to_string())
            }
            StatusCode::NOT_FOUND => Err(crate::SyncError::Integration(format!(
                "JIRA issue not found: {}",
                destination_id
            ))),
            StatusCode::UNAUTHORIZED => Err(crate::SyncError::Auth(
                "JIRA authentication failed".to_string(),
            )),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(crate::SyncError::Integration(format!(
                    "JIRA API error updating {}: HTTP {}: {}",
                    destination_id, status, error_body
                )))
            }
        }
    }

    async fn transition(&self, destination_id: &str, status: &str) -> Result<()> {
        let transitions = self.get_transitions(destination_id).await?;
        match find_transition(&transitions, status) {
            Some(t) => self.transition_issue(destination_id, &t.id).await,
            None => {
                warn!(
                    key = %destination_id,
                    target = %status,
                    available = ?transitions.iter().map(|t| &t.to.name).collect::<Vec<_>>(),
                    "No transition available to target status"
                );
                Err(crate::SyncError::Integration(format!(
                    "No transition to '{}' for issue {}",
                    status, destination_id
                )))
            }
        }
    }
}

/// Request body for create (`project_key` set) or update (`project_key` absent)
fn issue_payload(project_key: Option<&str>, draft: &IssueDraft<'_>, epic_name_field: &str) -> Value {
    let description = match (draft.kind, draft.description) {
        (ItemKind::Epic, None) | (ItemKind::Epic, Some("")) => EMPTY_EPIC_DESCRIPTION,
        (_, description) => description.unwrap_or_default(),
    };

    let mut fields = json!({
        "summary": draft.title,
        "description": description,
    });

    if let Some(issue_type) = draft.issue_type {
        fields["issuetype"] = json!({ "name": issue_type });
    }
    if let Some(key) = project_key {
        fields["project"] = json!({ "key": key });
    }
    if draft.kind == ItemKind::Epic {
        fields[epic_name_field] = json!(draft.title);
    }

    json!({ "fields": fields })
}

/// Transition whose target status matches `status`, ignoring case
fn find_transition<'a>(transitions: &'a [JiraTransition], status: &str) -> Option<&'a JiraTransition> {
    transitions
        .iter()
        .find(|t| t.to.name.eq_ignore_ascii_case(status))
}
