//! GitLab to JIRA reconciliation
//!
//! One run walks epics, then issues. For every fetched item:
//!
//! 1. **Filter**: items missing a required label are skipped untouched
//! 2. **Lookup**: a recorded mapping means the JIRA issue already exists
//! 3. **Write**: update mapped items; create unmapped ones while the per-run
//!    creation budget lasts, recording the new mapping
//!
//! Failures are isolated per item. Only a failed fetch abandons a category.

mod reconciler;
mod report;

pub use reconciler::{CreationBudget, ItemResult, Reconciler, SyncSettings};
pub use report::{CategoryReport, ItemFailure, ItemOutcome, SkipReason, SyncReport};
