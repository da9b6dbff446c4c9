//! Rule evaluation
//!
//! Decides whether an item is synchronizable and which JIRA issue type and
//! status its labels select.

use crate::config::{Filter, Rule, SyncConfig};
use crate::model::{ItemKind, SourceItem};
use crate::{Result, SyncError};

/// Label rules and required-label filters for one run
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    filters: Vec<Filter>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, filters: Vec<Filter>) -> Self {
        Self { rules, filters }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.rules.clone(), config.filters.clone())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Labels an item of `kind` must carry, one per matching filter
    pub fn required_labels(&self, kind: ItemKind) -> Vec<&str> {
        self.filters
            .iter()
            .filter(|f| kind.matches_category(&f.issue_type))
            .filter_map(|f| f.label.as_deref())
            .collect()
    }

    /// Every required label of the item's category must be present (AND, not OR)
    pub fn is_synchronizable(&self, item: &SourceItem, kind: ItemKind) -> bool {
        self.required_labels(kind)
            .into_iter()
            .all(|label| item.has_label(label))
    }

    /// JIRA issue type selected by the item's labels
    pub fn resolve_type(&self, item: &SourceItem) -> Result<Option<String>> {
        self.resolve(item, "issue type", |rule| match rule {
            Rule::LabelToIssueType { label, issue_type } => Some((label, issue_type)),
            _ => None,
        })
    }

    pub fn has_status_rules(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule, Rule::LabelToStatus { .. }))
    }

    /// JIRA status selected by the item's labels
    pub fn resolve_status(&self, item: &SourceItem) -> Result<Option<String>> {
        self.resolve(item, "status", |rule| match rule {
            Rule::LabelToStatus { label, status } => Some((label, status)),
            _ => None,
        })
    }

    fn resolve<F>(&self, item: &SourceItem, rule_name: &'static str, select: F) -> Result<Option<String>>
    where
        F: Fn(&Rule) -> Option<(&String, &String)>,
    {
        if item.labels.is_empty() {
            return Err(SyncError::MissingLabels {
                item_id: item.id.clone(),
                rule: rule_name,
            });
        }

        let mut found: Option<(&str, &str)> = None;

        for item_label in &item.labels {
            for (label, value) in self.rules.iter().filter_map(&select) {
                if label != item_label {
                    continue;
                }
                match found {
                    None => found = Some((label.as_str(), value.as_str())),
                    Some((first_label, first_value)) if first_value != value.as_str() => {
                        return Err(SyncError::AmbiguousMapping {
                            item_id: item.id.clone(),
                            rule: rule_name,
                            first_label: first_label.to_string(),
                            first_value: first_value.to_string(),
                            second_label: label.clone(),
                            second_value: value.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(found.map(|(_, value)| value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_rule(label: &str, issue_type: &str) -> Rule {
        Rule::LabelToIssueType {
            label: label.to_string(),
            issue_type: issue_type.to_string(),
        }
    }

    fn status_rule(label: &str, status: &str) -> Rule {
        Rule::LabelToStatus {
            label: label.to_string(),
            status: status.to_string(),
        }
    }

    fn item(labels: &[&str]) -> SourceItem {
        SourceItem::new("101", "Item").with_labels(labels.iter().copied())
    }

    #[test]
    fn test_has_status_rules() {
        assert!(!RuleSet::default().has_status_rules());
        assert!(!RuleSet::new(vec![type_rule("bug", "Bug")], vec![]).has_status_rules());
        assert!(RuleSet::new(vec![status_rule("doing", "In Progress")], vec![]).has_status_rules());
    }

    #[test]
    fn test_no_filters_means_synchronizable() {
        let rules = RuleSet::default();
        assert!(rules.is_synchronizable(&item(&[]), ItemKind::Issue));
        assert!(rules.is_synchronizable(&item(&["x"]), ItemKind::Epic));
    }

    #[test]
    fn test_filters_without_label_impose_nothing() {
        let rules = RuleSet::new(vec![], vec![Filter::new("non-epic", None)]);
        assert!(rules.is_synchronizable(&item(&[]), ItemKind::Issue));
    }

    #[test]
    fn test_filters_require_every_label() {
        let rules = RuleSet::new(
            vec![],
            vec![Filter::new("non-epic", Some("A")), Filter::new("non-epic", Some("B"))],
        );
        assert!(!rules.is_synchronizable(&item(&["A"]), ItemKind::Issue));
        assert!(!rules.is_synchronizable(&item(&["B"]), ItemKind::Issue));
        assert!(rules.is_synchronizable(&item(&["A", "B"]), ItemKind::Issue));
        assert!(rules.is_synchronizable(&item(&["A", "B", "C"]), ItemKind::Issue));
    }

    #[test]
    fn test_filters_only_apply_to_their_category() {
        let rules = RuleSet::new(vec![], vec![Filter::new("epic", Some("sync"))]);
        assert!(!rules.is_synchronizable(&item(&["other"]), ItemKind::Epic));
        assert!(rules.is_synchronizable(&item(&["other"]), ItemKind::Issue));
        assert_eq!(rules.required_labels(ItemKind::Epic), vec!["sync"]);
        assert!(rules.required_labels(ItemKind::Issue).is_empty());
    }

    #[test]
    fn test_resolve_type() {
        let rules = RuleSet::new(
            vec![type_rule("bug", "Bug"), status_rule("doing", "In Progress")],
            vec![],
        );
        assert_eq!(
            rules.resolve_type(&item(&["bug", "doing"])).unwrap().as_deref(),
            Some("Bug")
        );
        assert_eq!(
            rules.resolve_status(&item(&["bug", "doing"])).unwrap().as_deref(),
            Some("In Progress")
        );
    }

    #[test]
    fn test_no_matching_rule_is_absence() {
        let rules = RuleSet::new(vec![type_rule("bug", "Bug")], vec![]);
        assert_eq!(rules.resolve_type(&item(&["docs"])).unwrap(), None);
        assert_eq!(rules.resolve_status(&item(&["bug"])).unwrap(), None);
    }

    #[test]
    fn test_ambiguous_type_mapping() {
        let rules = RuleSet::new(vec![type_rule("bug", "Bug"), type_rule("feature", "Story")], vec![]);
        let err = rules.resolve_type(&item(&["bug", "feature"])).unwrap_err();
        match err {
            SyncError::AmbiguousMapping {
                item_id,
                first_value,
                second_value,
                ..
            } => {
                assert_eq!(item_id, "101");
                assert_eq!(first_value, "Bug");
                assert_eq!(second_value, "Story");
            }
            other => panic!("expected AmbiguousMapping, got {:?}", other),
        }
    }

    #[test]
    fn test_two_labels_agreeing_on_a_value_are_not_ambiguous() {
        let rules = RuleSet::new(vec![type_rule("bug", "Bug"), type_rule("defect", "Bug")], vec![]);
        assert_eq!(
            rules.resolve_type(&item(&["bug", "defect"])).unwrap().as_deref(),
            Some("Bug")
        );
    }

    #[test]
    fn test_ambiguous_status_mapping() {
        let rules = RuleSet::new(
            vec![status_rule("doing", "In Progress"), status_rule("done", "Done")],
            vec![],
        );
        assert!(matches!(
            rules.resolve_status(&item(&["doing", "done"])),
            Err(SyncError::AmbiguousMapping { rule: "status", .. })
        ));
    }

    #[test]
    fn test_missing_labels() {
        let rules = RuleSet::new(vec![type_rule("bug", "Bug")], vec![]);
        assert!(matches!(
            rules.resolve_type(&item(&[])),
            Err(SyncError::MissingLabels { .. })
        ));
        assert!(matches!(
            rules.resolve_status(&item(&[])),
            Err(SyncError::MissingLabels { .. })
        ));
    }
}
