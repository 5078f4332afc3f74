//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{check_read, check_write, StorageResult};
use parking_lot::RwLock;

/// An event file held in memory.
///
/// Used by unit tests, and for assembling a file before the bytes are
/// handed elsewhere.
///
/// # Example
///
/// ```rust
/// use lcio_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// let aggregate = backend.append(&[0u8; 8]).unwrap();
/// backend.append(b"segment").unwrap();
/// backend.write_at(aggregate, &[1u8; 8]).unwrap();
/// assert_eq!(backend.size().unwrap(), 15);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    bytes: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates an empty file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps bytes produced elsewhere, typically by another backend.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            bytes: RwLock::new(data),
        }
    }

    /// Copies out the current file contents.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }

    /// Consumes the backend and returns the file contents.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.bytes.into_inner()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let bytes = self.bytes.read();
        check_read(offset, len, bytes.len() as u64)?;
        let start = offset as usize;
        Ok(bytes[start..start + len].to_vec())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let bytes = self.bytes.get_mut();
        let offset = bytes.len() as u64;
        bytes.extend_from_slice(data);
        Ok(offset)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let bytes = self.bytes.get_mut();
        check_write(offset, data.len(), bytes.len() as u64)?;
        let start = offset as usize;
        bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.bytes.read().len() as u64)
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
