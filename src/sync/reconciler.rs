//! Reconciler: decides create / update / skip for each GitLab item

use super::report::{CategoryReport, ItemOutcome, SkipReason, SyncReport};
use crate::config::{SyncConfig, SyncLimits};
use crate::integrations::{DestinationClient, SourceClient};
use crate::model::{IssueDraft, ItemKind, SourceItem};
use crate::rules::RuleSet;
use crate::storage::MappingStore;
use crate::SyncError;
use tracing::{debug, error, info, warn};

/// Settings for one run
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// JIRA project receiving created issues; without one only updates run
    pub project_key: Option<String>,

    /// GitLab group holding the epics and the project
    pub gitlab_group: String,

    /// GitLab project whose issues are synchronized
    pub gitlab_project: String,

    pub limits: SyncLimits,

    /// JIRA issue type used for every epic
    pub epic_issue_type: String,

    /// Transition issues to their rule-resolved status
    pub apply_status: bool,
}

impl SyncSettings {
    pub fn new(
        project_key: impl Into<String>,
        gitlab_group: impl Into<String>,
        gitlab_project: impl Into<String>,
    ) -> Self {
        Self {
            project_key: Some(project_key.into()),
            gitlab_group: gitlab_group.into(),
            gitlab_project: gitlab_project.into(),
            limits: SyncLimits::default(),
            epic_issue_type: "Epic".to_string(),
            apply_status: false,
        }
    }

    /// Settings from the rules file
    ///
    /// A missing project key does not stop the run: mapped items are still
    /// updated and every create fails with a `Config` error.
    pub fn from_config(
        config: &SyncConfig,
        gitlab_group: impl Into<String>,
        gitlab_project: impl Into<String>,
    ) -> Self {
        Self {
            project_key: config
                .jira_project_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            gitlab_group: gitlab_group.into(),
            gitlab_project: gitlab_project.into(),
            limits: config.limits,
            epic_issue_type: config.epic_issue_type.clone(),
            apply_status: config.apply_status,
        }
    }

    pub fn with_limits(mut self, limits: SyncLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_epic_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.epic_issue_type = issue_type.into();
        self
    }

    pub fn with_apply_status(mut self, enabled: bool) -> Self {
        self.apply_status = enabled;
        self
    }

    fn creation_cap(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::Epic => self.limits.max_epics_created,
            ItemKind::Issue => self.limits.max_issues_created,
        }
    }

    fn fetch_limit(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::Epic => self.limits.epic_fetch_limit,
            ItemKind::Issue => self.limits.issue_fetch_limit,
        }
    }
}

/// Creations allowed in one category for one run
///
/// Bounds how much a single invocation can write to JIRA. Every create
/// attempt consumes one unit, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationBudget {
    cap: u32,
    used: u32,
}

impl CreationBudget {
    pub fn new(cap: u32) -> Self {
        Self { cap, used: 0 }
    }

    pub fn has_room(&self) -> bool {
        self.used < self.cap
    }

    pub fn consume(&mut self) {
        self.used += 1;
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}

/// Outcome of one item plus any status-rule trouble seen along the way
#[derive(Debug)]
pub struct ItemResult {
    pub outcome: ItemOutcome,
    pub status_warning: Option<String>,
}

impl From<ItemOutcome> for ItemResult {
    fn from(outcome: ItemOutcome) -> Self {
        Self {
            outcome,
            status_warning: None,
        }
    }
}

/// Drives one sync run against a source, a destination and the mapping store
pub struct Reconciler<'a, S, D> {
    source: &'a S,
    destination: &'a D,
    rules: &'a RuleSet,
    store: &'a mut MappingStore,
    settings: &'a SyncSettings,
}

impl<'a, S, D> Reconciler<'a, S, D>
where
    S: SourceClient,
    D: DestinationClient,
{
    pub fn new(
        source: &'a S,
        destination: &'a D,
        rules: &'a RuleSet,
        store: &'a mut MappingStore,
        settings: &'a SyncSettings,
    ) -> Self {
        Self {
            source,
            destination,
            rules,
            store,
            settings,
        }
    }

    /// Synchronize the given categories in order, each with a fresh budget
    pub async fn run(&mut self, kinds: &[ItemKind]) -> SyncReport {
        let mut report = SyncReport::default();

        if self.settings.project_key.is_none() {
            warn!("No JIRA project key configured, only already mapped items will be updated");
        }

        for &kind in kinds {
            let mut budget = CreationBudget::new(self.settings.creation_cap(kind));
            let category = self.sync_category(kind, &mut budget).await;
            report.categories.push(category);
        }

        info!(
            changes = report.total_changes(),
            errors = report.has_errors(),
            "Sync run complete"
        );

        report
    }

    pub async fn sync_epics(&mut self, budget: &mut CreationBudget) -> CategoryReport {
        self.sync_category(ItemKind::Epic, budget).await
    }

    pub async fn sync_issues(&mut self, budget: &mut CreationBudget) -> CategoryReport {
        self.sync_category(ItemKind::Issue, budget).await
    }

    async fn sync_category(&mut self, kind: ItemKind, budget: &mut CreationBudget) -> CategoryReport {
        let mut report = CategoryReport::new(kind);
        let limit = self.settings.fetch_limit(kind);

        if limit == 0 {
            debug!(kind = %kind, "Fetch limit is zero, nothing to do");
            return report;
        }

        let fetched = match kind {
            ItemKind::Epic => self.source.list_epics(&self.settings.gitlab_group, limit).await,
            ItemKind::Issue => {
                self.source
                    .list_issues(&self.settings.gitlab_group, &self.settings.gitlab_project, limit)
                    .await
            }
        };

        let mut items = match fetched {
            Ok(items) => items,
            Err(e) => {
                error!(kind = %kind, error = %e, "Fetching from GitLab failed, skipping category");
                report.aborted = Some(e.to_string());
                return report;
            }
        };
        items.truncate(limit as usize);
        report.fetched = items.len() as u32;

        info!(kind = %kind, count = items.len(), "Reconciling GitLab items");

        for item in &items {
            let result = self.sync_item(kind, item, budget).await;
            report.record(&item.id, &result.outcome);
            if result.status_warning.is_some() {
                report.status_warnings += 1;
            }
        }

        info!(
            kind = %kind,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped(),
            failed = report.failed,
            "Category reconciled"
        );

        report
    }

    /// Reconcile a single item
    pub async fn sync_item(
        &mut self,
        kind: ItemKind,
        item: &SourceItem,
        budget: &mut CreationBudget,
    ) -> ItemResult {
        if !self.rules.is_synchronizable(item, kind) {
            info!(
                item_id = %item.id,
                kind = %kind,
                title = %item.title,
                required = ?self.rules.required_labels(kind),
                "Item not synchronizable"
            );
            return ItemOutcome::Skipped(SkipReason::Filtered).into();
        }

        let mapped = self.store.lookup(&item.id, kind).map(str::to_string);

        let outcome = match mapped {
            Some(destination_id) => {
                debug!(
                    item_id = %item.id,
                    kind = %kind,
                    destination_id = %destination_id,
                    "Found mapping"
                );
                self.update_item(kind, item, &destination_id).await
            }
            None => self.create_item(kind, item, budget).await,
        };

        if let ItemOutcome::Failed(ref e) = outcome {
            if e.is_rule_error() {
                warn!(item_id = %item.id, kind = %kind, error = %e, "Rule configuration broken for item");
            } else {
                error!(item_id = %item.id, kind = %kind, error = %e, "Item sync failed");
            }
        }

        let status_warning = match (kind, outcome.destination_id()) {
            (ItemKind::Issue, Some(destination_id)) => self.sync_status(item, destination_id).await,
            _ => None,
        };

        ItemResult {
            outcome,
            status_warning,
        }
    }

    async fn update_item(&self, kind: ItemKind, item: &SourceItem, destination_id: &str) -> ItemOutcome {
        // The issue type chosen at creation is kept; only epics restate theirs.
        let issue_type = match kind {
            ItemKind::Epic => Some(self.settings.epic_issue_type.as_str()),
            ItemKind::Issue => None,
        };
        let draft = IssueDraft::from_item(kind, issue_type, item);

        match self.destination.update(destination_id, &draft).await {
            Ok(destination_id) => ItemOutcome::Updated { destination_id },
            Err(e) => ItemOutcome::Failed(e),
        }
    }

    async fn create_item(
        &mut self,
        kind: ItemKind,
        item: &SourceItem,
        budget: &mut CreationBudget,
    ) -> ItemOutcome {
        if !budget.has_room() {
            info!(
                item_id = %item.id,
                kind = %kind,
                max = budget.cap(),
                "Not creating, creation cap reached"
            );
            return ItemOutcome::Skipped(SkipReason::BudgetExhausted);
        }

        let Some(project_key) = self.settings.project_key.as_deref() else {
            return ItemOutcome::Failed(SyncError::Config(
                "No JIRA project key configured, cannot create".to_string(),
            ));
        };

        let issue_type = match kind {
            ItemKind::Epic => self.settings.epic_issue_type.clone(),
            ItemKind::Issue => match self.rules.resolve_type(item) {
                Ok(Some(issue_type)) => issue_type,
                Ok(None) => {
                    return ItemOutcome::Failed(SyncError::NoTypeMapping {
                        item_id: item.id.clone(),
                        labels: item.labels.iter().cloned().collect(),
                    })
                }
                Err(e) => return ItemOutcome::Failed(e),
            },
        };

        budget.consume();
        let draft = IssueDraft::from_item(kind, Some(&issue_type), item);

        let destination_id = match self
            .destination
            .create(project_key, &draft)
            .await
        {
            Ok(key) => key,
            Err(e) => return ItemOutcome::Failed(e),
        };

        if let Err(e) = self.store.record(&destination_id, &item.id, kind) {
            error!(
                item_id = %item.id,
                kind = %kind,
                destination_id = %destination_id,
                error = %e,
                "JIRA issue created but mapping not recorded; next run will create it again"
            );
            return ItemOutcome::Failed(e);
        }

        info!(
            item_id = %item.id,
            kind = %kind,
            destination_id = %destination_id,
            issue_type = %issue_type,
            "Created JIRA issue"
        );
        ItemOutcome::Created { destination_id }
    }

    /// Evaluate the status rules; apply the result only when enabled
    async fn sync_status(&self, item: &SourceItem, destination_id: &str) -> Option<String> {
        if !self.rules.has_status_rules() {
            return None;
        }

        let status = match self.rules.resolve_status(item) {
            Ok(Some(status)) => status,
            Ok(None) => return None,
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "Status not determined based on rules");
                return Some(e.to_string());
            }
        };

        if !self.settings.apply_status {
            debug!(
                item_id = %item.id,
                destination_id = %destination_id,
                status = %status,
                "Resolved status (not applied)"
            );
            return None;
        }

        match self.destination.transition(destination_id, &status).await {
            Ok(()) => {
                info!(destination_id = %destination_id, status = %status, "Applied status");
                None
            }
            Err(e) => {
                warn!(destination_id = %destination_id, status = %status, error = %e, "Applying status failed");
                Some(e.to_string())
            }
        }
    }
}
