//! Verify command implementation.

use super::open_directory;
use lcio_access::{DirectoryEntry, DirectoryReader};
use lcio_storage::StorageBackend;
use std::path::Path;

/// Verification result.
#[derive(Debug)]
pub struct VerifyResult {
    /// Number of segment entries in the chain.
    pub entries_checked: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path, offset: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying directory at {:?}, aggregate @{}", path, offset);
    println!();

    let result = match open_directory(path, offset) {
        Ok(directory) => check(&directory)?,
        Err(e) => VerifyResult {
            entries_checked: 0,
            errors: vec![format!("Failed to load chain: {}", e)],
        },
    };
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Directory verification passed");
        Ok(())
    } else {
        println!("✗ Directory verification failed");
        Err("Verification failed".into())
    }
}

/// Compares the stored aggregate with the merge of its chain.
pub fn check<B: StorageBackend>(
    directory: &DirectoryReader<B>,
) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let entries = directory.entries();
    let mut result = VerifyResult {
        entries_checked: entries.len(),
        errors: Vec::new(),
    };

    for pair in entries.windows(2) {
        if Some(pair[1].previous_location()) != pair[0].location() {
            result.errors.push(format!(
                "Entry @{} links to @{}, expected @{}",
                pair[1].location().unwrap_or(0),
                pair[1].previous_location(),
                pair[0].location().unwrap_or(0)
            ));
        }
    }

    let stored = directory.aggregate();
    let merged = directory.recompute_aggregate()?;
    compare(stored, &merged, &mut result.errors);

    Ok(result)
}

fn compare(stored: &DirectoryEntry, merged: &DirectoryEntry, errors: &mut Vec<String>) {
    if stored.range() != merged.range() {
        errors.push(format!(
            "Aggregate range {} does not match chain range {}",
            describe_range(stored),
            describe_range(merged)
        ));
    }
    if stored.is_ordered() != merged.is_ordered() {
        errors.push(format!(
            "Aggregate ordered flag is {}, chain gives {}",
            stored.is_ordered(),
            merged.is_ordered()
        ));
    }
    if stored.event_count() != merged.event_count() {
        errors.push(format!(
            "Aggregate counts {} events, chain holds {}",
            stored.event_count(),
            merged.event_count()
        ));
    }
    if stored.run_header_count() != merged.run_header_count() {
        errors.push(format!(
            "Aggregate counts {} run headers, chain holds {}",
            stored.run_header_count(),
            merged.run_header_count()
        ));
    }
}

fn describe_range(entry: &DirectoryEntry) -> String {
    entry
        .range()
        .map_or_else(|| "[empty]".to_string(), |r| r.to_string())
}

fn print_result(result: &VerifyResult) {
    println!("  Entries checked: {}", result.entries_checked);
    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in &result.errors {
            println!("    - {}", error);
        }
    }
}
