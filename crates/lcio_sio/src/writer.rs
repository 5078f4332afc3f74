//! Writing and rewriting records.

use crate::error::{SioError, SioResult};
use crate::reader::read_header;
use crate::record::RecordBuilder;
use lcio_storage::StorageBackend;
use tracing::debug;

/// Appends records to a stream and rewrites them in place.
///
/// The writer owns its backend for the length of a write session; there is
/// exactly one writer per stream.
#[derive(Debug)]
pub struct RecordWriter<B> {
    backend: B,
}

impl<B: StorageBackend> RecordWriter<B> {
    /// Creates a writer that appends to the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Appends a record.
    ///
    /// Returns the absolute offset where the record starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or the append fails.
    pub fn create_record(&mut self, record: &RecordBuilder) -> SioResult<u64> {
        let bytes = record.encode()?;
        let offset = self.backend.append(&bytes)?;
        debug!(name = record.name(), offset, len = bytes.len(), "record written");
        Ok(offset)
    }

    /// Overwrites the record at `offset` with a new encoding.
    ///
    /// Each call replaces the whole record; calling it again with the same
    /// content leaves the stream unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No record starts at `offset`
    /// - The stored record has a different name ([`SioError::NameMismatch`])
    /// - The new encoding has a different length ([`SioError::SizeMismatch`])
    /// - The in-place write fails
    pub fn rewrite_record(&mut self, offset: u64, record: &RecordBuilder) -> SioResult<()> {
        let stored = read_header(&self.backend, offset)?;
        if stored.name != record.name() {
            return Err(SioError::NameMismatch {
                offset,
                expected: record.name().to_owned(),
                found: stored.name,
            });
        }

        let bytes = record.encode()?;
        if bytes.len() as u64 != stored.total_len() {
            return Err(SioError::SizeMismatch {
                offset,
                expected: stored.total_len(),
                actual: bytes.len() as u64,
            });
        }

        self.backend.write_at(offset, &bytes)?;
        debug!(name = record.name(), offset, "record rewritten");
        Ok(())
    }

    /// Returns the offset the next record will be written at.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream size cannot be determined.
    pub fn position(&self) -> SioResult<u64> {
        Ok(self.backend.size()?)
    }

    /// Flushes buffered writes to the OS.
    pub fn flush(&mut self) -> SioResult<()> {
        self.backend.flush()?;
        Ok(())
    }

    /// Flushes and syncs the stream to durable storage.
    pub fn sync(&mut self) -> SioResult<()> {
        self.backend.flush()?;
        self.backend.sync()?;
        Ok(())
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the writer and returns the backend.
    pub fn into_inner(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordOptions, RecordReader, Version};
    use lcio_storage::InMemoryBackend;

    fn counter(name: &str, value: i64) -> RecordBuilder {
        let mut record = RecordBuilder::new(name, RecordOptions::NONE);
        record
            .create_block(name, Version::new(1, 0))
            .write_i64(value);
        record
    }

    #[test]
    fn create_returns_offsets() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        let first = writer.create_record(&counter("C", 1)).unwrap();
        let second = writer.create_record(&counter("C", 2)).unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, counter("C", 1).encoded_len() as u64);
        assert_eq!(
            writer.position().unwrap(),
            second + counter("C", 2).encoded_len() as u64
        );
    }

    #[test]
    fn rewrite_in_place() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        let target = writer.create_record(&counter("C", 1)).unwrap();
        let after = writer.create_record(&counter("D", 7)).unwrap();
        let size = writer.position().unwrap();

        writer.rewrite_record(target, &counter("C", 99)).unwrap();
        // Idempotent
        writer.rewrite_record(target, &counter("C", 99)).unwrap();
        assert_eq!(writer.position().unwrap(), size);

        let reader = RecordReader::new(writer.into_inner());
        let value = |offset| {
            reader
                .read_record(offset)
                .unwrap()
                .block()
                .unwrap()
                .reader()
                .read_i64()
                .unwrap()
        };
        assert_eq!(value(target), 99);
        assert_eq!(value(after), 7);
    }

    #[test]
    fn rewrite_rejects_other_name() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        let offset = writer.create_record(&counter("C", 1)).unwrap();

        let result = writer.rewrite_record(offset, &counter("X", 1));
        assert!(matches!(result, Err(SioError::NameMismatch { .. })));
    }

    #[test]
    fn rewrite_rejects_other_size() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        let offset = writer.create_record(&counter("C", 1)).unwrap();

        let mut bigger = counter("C", 1);
        bigger.create_block("Extra", Version::new(1, 0)).write_i32(0);
        let result = writer.rewrite_record(offset, &bigger);
        assert!(matches!(result, Err(SioError::SizeMismatch { .. })));
    }

    #[test]
    fn rewrite_at_non_record_fails() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        writer.create_record(&counter("C", 1)).unwrap();

        let result = writer.rewrite_record(8, &counter("C", 2));
        assert!(matches!(result, Err(SioError::BadMarker { .. })));
    }

    #[test]
    fn flush_and_sync() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        writer.create_record(&counter("C", 1)).unwrap();
        assert!(writer.flush().is_ok());
        assert!(writer.sync().is_ok());
        assert!(writer.backend().size().unwrap() > 0);
    }
}
