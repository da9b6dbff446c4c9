//! Storage layer
//!
//! Durable GitLab-to-JIRA identifier mapping: an append-only JSON Lines log
//! indexed in memory by `(source_id, kind)`.

mod jsonl;
mod mapping_store;

pub use jsonl::{read_entries, JsonlReader, JsonlWriter, MappingEntry};
pub use mapping_store::MappingStore;
