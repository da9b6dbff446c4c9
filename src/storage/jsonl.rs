//! JSONL (JSON Lines) reader and writer for mapping entries
//!
//! Each line is a separate JSON object holding one mapping entry.

use crate::model::ItemKind;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// One line of the mapping log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// JIRA issue key (e.g. "PLAT-12")
    pub destination_id: String,

    /// GitLab epic or issue id
    pub source_id: String,

    pub kind: ItemKind,

    /// When the entry was written; absent in hand-written files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl MappingEntry {
    pub fn new(destination_id: impl Into<String>, source_id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            destination_id: destination_id.into(),
            source_id: source_id.into(),
            kind,
            recorded_at: Some(Utc::now()),
        }
    }
}

/// JSONL reader for mapping entries
pub struct JsonlReader {
    reader: BufReader<File>,
}

impl JsonlReader {
    /// Open a JSONL file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }

    /// Read all entries in file order
    pub fn read_all(self) -> Result<Vec<MappingEntry>> {
        let mut entries = Vec::new();

        for (idx, line_result) in self.reader.lines().enumerate() {
            let line = line_result?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: MappingEntry = serde_json::from_str(&line).map_err(|e| {
                crate::SyncError::Parse(format!("Invalid mapping entry on line {}: {}", idx + 1, e))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

/// Append-only JSONL writer for mapping entries
pub struct JsonlWriter {
    writer: BufWriter<File>,
}

impl JsonlWriter {
    /// Append to an existing JSONL file, creating it if needed
    ///
    /// A file whose last line lacks its newline (hand edits) is terminated
    /// first so the next entry starts on a line of its own.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Write a single entry
    pub fn write(&mut self, entry: &MappingEntry) -> Result<()> {
        let json = serde_json::to_string(entry)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Flush the buffer and fsync the file
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read all entries from a JSONL file (convenience function)
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<MappingEntry>> {
    JsonlReader::open(path)?.read_all()
}
