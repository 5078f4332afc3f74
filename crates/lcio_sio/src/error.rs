//! Error types for record framing.

use lcio_storage::StorageError;
use thiserror::Error;

/// Result type for record operations.
pub type SioResult<T> = Result<T, SioError>;

/// Errors that can occur while writing or reading records.
#[derive(Debug, Error)]
pub enum SioError {
    /// The underlying byte store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record or block marker was not where it should be.
    #[error("bad marker at offset {offset}: expected {expected:08x}, found {found:08x}")]
    BadMarker {
        /// Absolute offset of the record being read.
        offset: u64,
        /// The marker that was expected.
        expected: u32,
        /// The marker that was found.
        found: u32,
    },

    /// A record claims more bytes than the stream holds.
    #[error("truncated record at offset {offset}: needs {needed} bytes, {available} available")]
    Truncated {
        /// Absolute offset of the record.
        offset: u64,
        /// Bytes the record header claims.
        needed: u64,
        /// Bytes left in the stream from `offset`.
        available: u64,
    },

    /// A record's internal lengths do not add up.
    #[error("malformed record at offset {offset}: {message}")]
    Malformed {
        /// Absolute offset of the record.
        offset: u64,
        /// What was inconsistent.
        message: String,
    },

    /// A block payload was read past its end.
    #[error("unexpected end of block data: requested {requested} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes requested.
        requested: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },

    /// A record or block name exceeds [`crate::MAX_NAME_LEN`].
    #[error("name is {len} bytes long, maximum is {max}")]
    NameTooLong {
        /// Length of the offending name.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A stored name is not valid UTF-8.
    #[error("record at offset {offset} has a name that is not UTF-8")]
    InvalidName {
        /// Absolute offset of the record.
        offset: u64,
    },

    /// A rewrite targeted a record with a different name.
    #[error("cannot rewrite record at offset {offset}: stored name {found:?}, new name {expected:?}")]
    NameMismatch {
        /// Absolute offset of the record.
        offset: u64,
        /// Name of the record being written.
        expected: String,
        /// Name stored at the offset.
        found: String,
    },

    /// A rewrite would change the size of the stored record.
    #[error("cannot rewrite record at offset {offset}: stored size {expected}, new size {actual}")]
    SizeMismatch {
        /// Absolute offset of the record.
        offset: u64,
        /// Encoded size of the stored record.
        expected: u64,
        /// Encoded size of the replacement.
        actual: u64,
    },

    /// A record has no blocks.
    #[error("record {record:?} has no blocks")]
    MissingBlock {
        /// Name of the record.
        record: String,
    },

    /// A feature of the format that this implementation does not handle.
    #[error("unsupported: {message}")]
    Unsupported {
        /// Description of the unsupported feature.
        message: String,
    },
}

impl SioError {
    /// Creates a malformed record error.
    pub fn malformed(offset: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            message: message.into(),
        }
    }

    /// Creates an unsupported feature error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}
