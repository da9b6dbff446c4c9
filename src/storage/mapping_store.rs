//! Mapping store
//!
//! Remembers which JIRA issue mirrors which GitLab item so repeated runs
//! update instead of duplicating. At most one entry exists per
//! `(source_id, kind)`; entries are never rewritten or removed.

use super::jsonl::{read_entries, JsonlWriter, MappingEntry};
use crate::model::ItemKind;
use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable `(source_id, kind) -> destination_id` association
///
/// `record` takes `&mut self`, so the lookup-then-append pair cannot
/// interleave with another writer holding the same store.
#[derive(Debug)]
pub struct MappingStore {
    path: Option<PathBuf>,
    entries: Vec<MappingEntry>,
    index: HashMap<(String, ItemKind), usize>,
}

impl MappingStore {
    /// Open (or create) the mapping log at `path` and index its entries
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::File::create(path)?;
            info!(path = %path.display(), "Created mapping store");
        }

        let mut store = Self {
            path: Some(path.to_path_buf()),
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for entry in read_entries(path)? {
            store.insert(entry);
        }

        debug!(
            path = %path.display(),
            entries = store.entries.len(),
            "Loaded mapping store"
        );

        Ok(store)
    }

    /// A store that lives only as long as this value
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Backing file, if durable
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// JIRA key mirroring the given GitLab item
    pub fn lookup(&self, source_id: &str, kind: ItemKind) -> Option<&str> {
        self.index
            .get(&(source_id.to_string(), kind))
            .map(|&idx| self.entries[idx].destination_id.as_str())
    }

    /// Record a new mapping
    ///
    /// Returns `false` without writing when `(source_id, kind)` is already
    /// mapped; the first recorded destination stays authoritative.
    pub fn record(&mut self, destination_id: &str, source_id: &str, kind: ItemKind) -> Result<bool> {
        if let Some(existing) = self.lookup(source_id, kind) {
            debug!(
                source_id = %source_id,
                kind = %kind,
                existing = %existing,
                ignored = %destination_id,
                "Mapping already recorded"
            );
            return Ok(false);
        }

        let entry = MappingEntry::new(destination_id, source_id, kind);

        if let Some(ref path) = self.path {
            let mut writer = JsonlWriter::append(path)?;
            writer.write(&entry)?;
            writer.sync()?;
        }

        info!(
            source_id = %source_id,
            kind = %kind,
            destination_id = %destination_id,
            "Recorded mapping"
        );
        self.insert(entry);

        Ok(true)
    }

    /// All entries in the order they were recorded (duplicates from hand edits included)
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of distinct mapped items
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn insert(&mut self, entry: MappingEntry) {
        let key = (entry.source_id.clone(), entry.kind);
        self.entries.push(entry);
        let idx = self.entries.len() - 1;
        self.index.entry(key).or_insert(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let mut store = MappingStore::in_memory();
        assert!(store.record("PLAT-1", "77", ItemKind::Epic).unwrap());

        assert_eq!(store.lookup("77", ItemKind::Epic), Some("PLAT-1"));
        assert_eq!(store.lookup("77", ItemKind::Issue), None);
        assert_eq!(store.lookup("78", ItemKind::Epic), None);
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut store = MappingStore::in_memory();
        assert!(store.record("PLAT-1", "77", ItemKind::Issue).unwrap());
        assert!(!store.record("PLAT-9", "77", ItemKind::Issue).unwrap());

        assert_eq!(store.len(), 1);
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.lookup("77", ItemKind::Issue), Some("PLAT-1"));
    }

    #[test]
    fn test_same_id_different_kinds() {
        let mut store = MappingStore::in_memory();
        store.record("PLAT-1", "5", ItemKind::Epic).unwrap();
        store.record("PLAT-2", "5", ItemKind::Issue).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup("5", ItemKind::Epic), Some("PLAT-1"));
        assert_eq!(store.lookup("5", ItemKind::Issue), Some("PLAT-2"));
    }

    #[test]
    fn test_durable_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state").join("issue_mapping.jsonl");

        {
            let mut store = MappingStore::open(&path).unwrap();
            assert!(store.is_empty());
            store.record("PLAT-1", "1", ItemKind::Epic).unwrap();
            store.record("PLAT-2", "2", ItemKind::Issue).unwrap();
        }

        let mut reopened = MappingStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.lookup("1", ItemKind::Epic), Some("PLAT-1"));
        assert_eq!(reopened.lookup("2", ItemKind::Issue), Some("PLAT-2"));

        assert!(!reopened.record("PLAT-3", "1", ItemKind::Epic).unwrap());
        let lines = std::fs::read_to_string(&path).unwrap();
        assert_eq!(lines.lines().count(), 2);
    }

    #[test]
    fn test_first_entry_wins_for_hand_edited_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("issue_mapping.jsonl");
        std::fs::write(
            &path,
            "{\"destination_id\":\"PLAT-1\",\"source_id\":\"9\",\"kind\":\"issue\"}\n\
             {\"destination_id\":\"PLAT-2\",\"source_id\":\"9\",\"kind\":\"issue\"}\n",
        )
        .unwrap();

        let store = MappingStore::open(&path).unwrap();
        assert_eq!(store.lookup("9", ItemKind::Issue), Some("PLAT-1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn test_record_after_hand_edit_without_final_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("issue_mapping.jsonl");
        std::fs::write(
            &path,
            "{\"destination_id\":\"PLAT-1\",\"source_id\":\"9\",\"kind\":\"issue\"}",
        )
        .unwrap();

        {
            let mut store = MappingStore::open(&path).unwrap();
            assert!(store.record("PLAT-2", "10", ItemKind::Issue).unwrap());
        }

        let reopened = MappingStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.lookup("9", ItemKind::Issue), Some("PLAT-1"));
        assert_eq!(reopened.lookup("10", ItemKind::Issue), Some("PLAT-2"));
    }

    #[test]
    fn test_in_memory_has_no_path() {
        let store = MappingStore::in_memory();
        assert!(store.path().is_none());
    }
}
