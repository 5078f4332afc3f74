//! CLI command implementations.

pub mod find;
pub mod inspect;
pub mod verify;

use lcio_access::{DirectoryConfig, DirectoryEntry, DirectoryReader};
use lcio_sio::RecordReader;
use lcio_storage::FileBackend;
use serde::Serialize;
use std::path::Path;

/// Opens the file read-only and loads the directory at `offset`.
pub fn open_directory(
    path: &Path,
    offset: u64,
) -> Result<DirectoryReader<FileBackend>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No file found at {:?}", path).into());
    }
    let backend = FileBackend::open_read_only(path)?;
    let directory = DirectoryReader::open(
        RecordReader::new(backend),
        offset,
        DirectoryConfig::default(),
    )?;
    Ok(directory)
}

/// Printable form of one directory entry.
#[derive(Debug, Serialize)]
pub struct EntryInfo {
    /// Offset of the entry record.
    pub location: Option<u64>,
    /// Smallest key, as `run:event`.
    pub min: Option<String>,
    /// Largest key, as `run:event`.
    pub max: Option<String>,
    /// Number of events.
    pub events: u32,
    /// Number of run headers.
    pub run_headers: u32,
    /// Whether events were written in key order.
    pub ordered: bool,
    /// Offset of the segment's detailed index.
    pub index_location: u64,
    /// Previous-link.
    pub previous: u64,
    /// Next-link.
    pub next: u64,
}

impl From<&DirectoryEntry> for EntryInfo {
    fn from(entry: &DirectoryEntry) -> Self {
        Self {
            location: entry.location(),
            min: entry.min_key().map(|k| k.to_string()),
            max: entry.max_key().map(|k| k.to_string()),
            events: entry.event_count(),
            run_headers: entry.run_header_count(),
            ordered: entry.is_ordered(),
            index_location: entry.index_location(),
            previous: entry.previous_location(),
            next: entry.next_location(),
        }
    }
}

impl EntryInfo {
    /// One-line text rendering.
    pub fn line(&self) -> String {
        let range = match (&self.min, &self.max) {
            (Some(min), Some(max)) => format!("[{min} .. {max}]"),
            _ => "[empty]".to_string(),
        };
        format!(
            "@{} {} events={} runs={} ordered={} index=@{} prev=@{} next=@{}",
            self.location.unwrap_or(0),
            range,
            self.events,
            self.run_headers,
            self.ordered,
            self.index_location,
            self.previous,
            self.next
        )
    }
}
