//! GitLab Integration Adapter
//!
//! Reads group epics and project issues through the GitLab REST API (v4).

use super::client::SourceClient;
use crate::config::GitLabIntegration;
use crate::model::SourceItem;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Per-request timeout for list operations
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
/// GitLab refuses `per_page` above this; only one page is ever read
const MAX_PER_PAGE: u32 = 100;

/// GitLab API client
pub struct GitLabAdapter {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

/// Epic or issue as returned by the GitLab API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabItem {
    /// Instance-wide id; used as the mapping key
    pub id: u64,
    /// Id within the group or project
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl From<GitLabItem> for SourceItem {
    fn from(item: GitLabItem) -> Self {
        SourceItem {
            id: item.id.to_string(),
            title: item.title,
            description: item.description,
            labels: item.labels.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabProject {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path_with_namespace: Option<String>,
}

impl GitLabAdapter {
    /// Create a new GitLab adapter
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: GitLabIntegration) -> Result<Self> {
        let client = Client::builder().timeout(LIST_TIMEOUT).build()?;

        let base_url = format!("{}/api/v4", config.url.trim_end_matches('/'));

        Ok(Self {
            client,
            base_url,
            auth_token: config.token,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Projects of a group
    pub async fn list_group_projects(&self, group: &str) -> Result<Vec<GitLabProject>> {
        let url = format!("{}/groups/{}/projects", self.base_url, encode_group(group));
        debug!(group = %group, "Listing GitLab group projects");
        self.get_json(&url, &[("per_page", MAX_PER_PAGE.to_string())])
            .await
    }

    /// Resolve a project name within a group to its numeric id
    pub async fn project_id(&self, group: &str, project: &str) -> Result<u64> {
        let projects = self.list_group_projects(group).await?;
        find_project_id(&projects, project).ok_or_else(|| {
            crate::SyncError::Integration(format!(
                "GitLab project '{}' not found in group '{}'",
                project, group
            ))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T> {
        let mut request = self.client.get(url).query(params);
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.timeout(LIST_TIMEOUT).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(crate::SyncError::Auth(
                "GitLab authentication failed".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(crate::SyncError::Integration(format!(
                "GitLab resource not found: {}",
                url
            ))),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(crate::SyncError::Integration(format!(
                    "GitLab API error: HTTP {}: {}",
                    status, error_body
                )))
            }
        }
    }
}

#[async_trait]
impl SourceClient for GitLabAdapter {
    async fn list_epics(&self, group: &str, limit: u32) -> Result<Vec<SourceItem>> {
        let url = format!("{}/groups/{}/epics", self.base_url, encode_group(group));
        let epics: Vec<GitLabItem> = self
            .get_json(&url, &[("per_page", per_page(limit).to_string())])
            .await?;

        info!(group = %group, count = epics.len(), "Retrieved GitLab epics");
        Ok(epics.into_iter().map(SourceItem::from).collect())
    }

    async fn list_issues(&self, group: &str, project: &str, limit: u32) -> Result<Vec<SourceItem>> {
        let project_id = self.project_id(group, project).await?;
        let url = format!("{}/projects/{}/issues", self.base_url, project_id);
        let issues: Vec<GitLabItem> = self
            .get_json(&url, &[("per_page", per_page(limit).to_string())])
            .await?;

        info!(
            group = %group,
            project = %project,
            count = issues.len(),
            "Retrieved GitLab issues"
        );
        Ok(issues.into_iter().map(SourceItem::from).collect())
    }
}

/// Case-insensitive project name match
fn find_project_id(projects: &[GitLabProject], name: &str) -> Option<u64> {
    projects
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.id)
}

fn per_page(limit: u32) -> u32 {
    limit.clamp(1, MAX_PER_PAGE)
}

/// Group paths like `parent/child` must be URL-encoded in the path segment
fn encode_group(group: &str) -> String {
    urlencoding::encode(group).into_owned()
}
