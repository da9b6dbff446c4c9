//! Per-item outcomes and per-run summaries

use crate::model::ItemKind;
use crate::SyncError;
use std::fmt;

/// Why an item was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A required filter label is missing
    Filtered,
    /// The per-run creation cap was reached; the item stays unmapped
    BudgetExhausted,
}

/// Terminal state of one item
#[derive(Debug)]
pub enum ItemOutcome {
    Created { destination_id: String },
    Updated { destination_id: String },
    Skipped(SkipReason),
    Failed(SyncError),
}

impl ItemOutcome {
    /// JIRA key written during this run, if any
    pub fn destination_id(&self) -> Option<&str> {
        match self {
            ItemOutcome::Created { destination_id } | ItemOutcome::Updated { destination_id } => {
                Some(destination_id.as_str())
            }
            _ => None,
        }
    }
}

/// An item that could not be synchronized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item_id: String,
    pub message: String,
    /// The rule configuration is broken for this item
    pub rule_error: bool,
}

/// Counts for one category (epics or issues)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub kind: ItemKind,
    pub fetched: u32,
    pub filtered: u32,
    pub over_budget: u32,
    pub created: u32,
    pub updated: u32,
    pub failed: u32,
    /// Status rules that could not be evaluated or applied
    pub status_warnings: u32,
    /// Set when fetching failed and nothing was reconciled
    pub aborted: Option<String>,
    pub failures: Vec<ItemFailure>,
}

impl CategoryReport {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            fetched: 0,
            filtered: 0,
            over_budget: 0,
            created: 0,
            updated: 0,
            failed: 0,
            status_warnings: 0,
            aborted: None,
            failures: Vec::new(),
        }
    }

    pub fn skipped(&self) -> u32 {
        self.filtered + self.over_budget
    }

    /// Tally one item's outcome
    pub fn record(&mut self, item_id: &str, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Created { .. } => self.created += 1,
            ItemOutcome::Updated { .. } => self.updated += 1,
            ItemOutcome::Skipped(SkipReason::Filtered) => self.filtered += 1,
            ItemOutcome::Skipped(SkipReason::BudgetExhausted) => self.over_budget += 1,
            ItemOutcome::Failed(error) => {
                self.failed += 1;
                self.failures.push(ItemFailure {
                    item_id: item_id.to_string(),
                    message: error.to_string(),
                    rule_error: error.is_rule_error(),
                });
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.failed > 0 || self.aborted.is_some()
    }
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            ItemKind::Epic => "epics",
            ItemKind::Issue => "issues",
        };
        if let Some(ref reason) = self.aborted {
            return write!(f, "{:<7} aborted: {}", label, reason);
        }
        write!(
            f,
            "{:<7} fetched {}, skipped {} (filtered {}, over cap {}), created {}, updated {}, failed {}",
            label,
            self.fetched,
            self.skipped(),
            self.filtered,
            self.over_budget,
            self.created,
            self.updated,
            self.failed
        )?;
        if self.status_warnings > 0 {
            write!(f, ", status warnings {}", self.status_warnings)?;
        }
        Ok(())
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub categories: Vec<CategoryReport>,
}

impl SyncReport {
    pub fn category(&self, kind: ItemKind) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.kind == kind)
    }

    /// Items created plus items updated
    pub fn total_changes(&self) -> u32 {
        self.categories.iter().map(|c| c.created + c.updated).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.categories.iter().any(CategoryReport::has_errors)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in &self.categories {
            writeln!(f, "{}", category)?;
            for failure in &category.failures {
                let tag = if failure.rule_error { " [rules]" } else { "" };
                writeln!(f, "  ! {}{}: {}", failure.item_id, tag, failure.message)?;
            }
        }
        Ok(())
    }
}
