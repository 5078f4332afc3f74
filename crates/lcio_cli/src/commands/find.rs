//! Find command implementation.

use super::{open_directory, EntryInfo};
use lcio_access::RunEvent;
use std::path::Path;

/// Runs the find command.
///
/// Fails if no segment holds the key.
pub fn run(
    path: &Path,
    offset: u64,
    run: i32,
    event: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let directory = open_directory(path, offset)?;
    let key = RunEvent::new(run, event);

    match directory.find(key) {
        Some(entry) => {
            println!("{} found in segment:", key);
            println!("  {}", EntryInfo::from(entry).line());
            Ok(())
        }
        None => Err(format!("No segment holds {}", key).into()),
    }
}
