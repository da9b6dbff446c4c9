//! gitlab-jira-sync - one-shot batch sync of GitLab epics and issues into JIRA
//!
//! Each run reads epics of a GitLab group and issues of one GitLab project,
//! keeps the items whose labels pass the configured filters, and creates or
//! updates the matching JIRA issues. A durable mapping file remembers which
//! JIRA issue belongs to which GitLab item, so re-running never duplicates.
//!
//! # Architecture
//!
//! - **config**: Rules file (label rules, filters, limits) and validation
//! - **rules**: Label-driven issue type / status resolution and filters
//! - **storage**: Append-only JSONL mapping store
//! - **integrations**: GitLab and JIRA REST adapters behind client traits
//! - **sync**: Reconciler deciding create / update / skip per item

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod rules;
pub mod storage;

// Components
pub mod integrations;
pub mod sync;

// Re-exports
pub use error::{Result, SyncError};
