//! External Integrations
//!
//! Adapters for GitLab (source) and JIRA (destination).
//!
//! # Sync Flow
//!
//! 1. **Fetch**: list epics of a group, then issues of a project (one bounded page each)
//! 2. **Reconcile**: the [`crate::sync`] module decides create / update / skip per item
//! 3. **Write**: create or update the mirrored JIRA issue

pub mod client;
pub mod gitlab;
pub mod jira;

pub use client::{DestinationClient, SourceClient};

// GitLab exports
pub use gitlab::{GitLabAdapter, GitLabItem, GitLabProject};

// JIRA exports
pub use jira::{JiraAdapter, JiraCreatedIssue, JiraStatus, JiraTransition};
