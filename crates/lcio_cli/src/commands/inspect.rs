//! Inspect command implementation.

use super::{open_directory, EntryInfo};
use lcio_access::DirectoryReader;
use lcio_storage::{FileBackend, StorageBackend};
use serde::Serialize;
use std::path::Path;

/// Directory inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// File path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// The aggregate entry.
    pub aggregate: EntryInfo,
    /// Segment entries in write order.
    pub segments: Vec<EntryInfo>,
}

impl InspectResult {
    fn collect(
        path: &Path,
        directory: &DirectoryReader<FileBackend>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            path: path.display().to_string(),
            file_size: directory.reader().backend().size()?,
            aggregate: EntryInfo::from(directory.aggregate()),
            segments: directory.entries().iter().map(EntryInfo::from).collect(),
        })
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, offset: u64, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let directory = open_directory(path, offset)?;
    let result = InspectResult::collect(path, &directory)?;

    // Output
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("LCIO Directory Inspection");
    println!("=========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {}", format_size(result.file_size));
    println!();
    println!("Aggregate:");
    println!("  {}", result.aggregate.line());
    println!();
    println!("Segments ({}):", result.segments.len());
    for (i, segment) in result.segments.iter().enumerate() {
        println!("  [{}] {}", i, segment.line());
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
