//! Error types for the random-access directory.

use crate::run_event::RunEvent;
use lcio_sio::{SioError, Version};
use thiserror::Error;

/// Result type for directory operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors that can occur while writing or reading the directory.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The record stream failed. Passed through unchanged.
    #[error("stream error: {0}")]
    Sio(#[from] SioError),

    /// A record did not carry the expected block name or version.
    #[error(
        "unexpected block {found_name:?} version {found_version}, \
         expected {expected_name:?} version {expected_version}"
    )]
    FormatMismatch {
        /// Block name this reader understands.
        expected_name: &'static str,
        /// Block version this reader understands.
        expected_version: Version,
        /// Block name found in the record.
        found_name: String,
        /// Block version found in the record.
        found_version: Version,
    },

    /// A stored or requested range has its bounds reversed.
    #[error("invalid key range: {min} is after {max}")]
    InvalidRange {
        /// Lower bound.
        min: RunEvent,
        /// Upper bound.
        max: RunEvent,
    },

    /// The entry has not been written yet, so it has no location.
    #[error("directory entry has not been written")]
    NotWritten,

    /// The entry was already written; entries are written exactly once.
    #[error("directory entry was already written at offset {location}")]
    AlreadyWritten {
        /// Where the entry lives.
        location: u64,
    },

    /// The offset links of the chain are inconsistent.
    #[error("directory chain corrupted at offset {offset}: {message}")]
    ChainCorrupted {
        /// Offset where the problem was found.
        offset: u64,
        /// Description of the problem.
        message: String,
    },
}

impl AccessError {
    /// Creates a chain corruption error.
    pub fn chain_corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::ChainCorrupted {
            offset,
            message: message.into(),
        }
    }
}
