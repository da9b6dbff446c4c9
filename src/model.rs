//! Core data types shared by the rule set, mapping store and reconciler

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Entity kind of a synchronized item
///
/// Part of the mapping key: the same GitLab id may exist once as an epic
/// and once as an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Epic,
    Issue,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Epic => "epic",
            ItemKind::Issue => "issue",
        }
    }

    /// Whether a filter's `issue_type` names this kind's category
    ///
    /// Filters use "epic" and "non-epic"; "issue" is accepted as an alias.
    pub fn matches_category(&self, category: &str) -> bool {
        match self {
            ItemKind::Epic => category.eq_ignore_ascii_case("epic"),
            ItemKind::Issue => {
                category.eq_ignore_ascii_case("non-epic") || category.eq_ignore_ascii_case("issue")
            }
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = crate::SyncError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "epic" | "epics" => Ok(ItemKind::Epic),
            "issue" | "issues" | "non-epic" => Ok(ItemKind::Issue),
            other => Err(crate::SyncError::Parse(format!(
                "Unknown item kind '{}' (expected epic or issue)",
                other
            ))),
        }
    }
}

/// An epic or issue fetched from GitLab for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub labels: BTreeSet<String>,
}

impl SourceItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            labels: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// Fields sent to JIRA for one create or update call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueDraft<'a> {
    pub kind: ItemKind,
    /// Destination issue type; `None` leaves the existing type untouched
    pub issue_type: Option<&'a str>,
    pub title: &'a str,
    pub description: Option<&'a str>,
}

impl<'a> IssueDraft<'a> {
    pub fn from_item(kind: ItemKind, issue_type: Option<&'a str>, item: &'a SourceItem) -> Self {
        Self {
            kind,
            issue_type,
            title: &item.title,
            description: item.description.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_categories() {
        assert!(ItemKind::Epic.matches_category("epic"));
        assert!(!ItemKind::Epic.matches_category("non-epic"));
        assert!(ItemKind::Issue.matches_category("non-epic"));
        assert!(ItemKind::Issue.matches_category("issue"));
        assert!(!ItemKind::Issue.matches_category("epic"));
    }

    #[test]
    fn test_item_kind_parse() {
        assert_eq!("epics".parse::<ItemKind>().unwrap(), ItemKind::Epic);
        assert_eq!("Issue".parse::<ItemKind>().unwrap(), ItemKind::Issue);
        assert!("story".parse::<ItemKind>().is_err());
    }

    #[test]
    fn test_item_kind_serde() {
        assert_eq!(serde_json::to_string(&ItemKind::Epic).unwrap(), "\"epic\"");
        let kind: ItemKind = serde_json::from_str("\"issue\"").unwrap();
        assert_eq!(kind, ItemKind::Issue);
    }

    #[test]
    fn test_source_item_builder() {
        let item = SourceItem::new("7", "Title")
            .with_description("Body")
            .with_labels(["a", "b", "a"]);
        assert_eq!(item.labels.len(), 2);
        assert!(item.has_label("b"));
        assert_eq!(item.description.as_deref(), Some("Body"));
    }
}
