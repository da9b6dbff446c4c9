//! Tracker client traits
//!
//! The reconciler talks to GitLab and JIRA only through these traits, so a
//! run can be driven by the REST adapters or by in-memory fakes.

use crate::model::{IssueDraft, SourceItem};
use crate::Result;
use async_trait::async_trait;

/// Read side: where epics and issues come from
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Up to `limit` epics of a group
    async fn list_epics(&self, group: &str, limit: u32) -> Result<Vec<SourceItem>>;

    /// Up to `limit` issues of a project within a group
    async fn list_issues(&self, group: &str, project: &str, limit: u32) -> Result<Vec<SourceItem>>;
}

/// Write side: where mirrored issues live
#[async_trait]
pub trait DestinationClient: Send + Sync {
    /// Create an issue in `project_key`, returning its key
    async fn create(&self, project_key: &str, draft: &IssueDraft<'_>) -> Result<String>;

    /// Refresh an existing issue, returning its key
    async fn update(&self, destination_id: &str, draft: &IssueDraft<'_>) -> Result<String>;

    /// Move an issue to the named status
    async fn transition(&self, destination_id: &str, status: &str) -> Result<()>;
}
