//! Reading records back from a byte store.

use crate::error::{SioError, SioResult};
use crate::record::{Record, RecordHeader, RECORD_HEADER_SIZE};
use lcio_storage::StorageBackend;

/// Reads and validates the header of the record at `offset`.
///
/// Checks that the whole record fits in the stream before returning.
pub(crate) fn read_header<B: StorageBackend + ?Sized>(
    backend: &B,
    offset: u64,
) -> SioResult<RecordHeader> {
    let available = backend.size()?.saturating_sub(offset);
    if available < RECORD_HEADER_SIZE as u64 {
        return Err(SioError::Truncated {
            offset,
            needed: RECORD_HEADER_SIZE as u64,
            available,
        });
    }

    let prefix = backend.read_at(offset, RECORD_HEADER_SIZE)?;
    let (header_len, _, payload_len, _) = RecordHeader::parse_prefix(&prefix, offset)?;

    let needed = header_len as u64 + payload_len as u64;
    if available < needed {
        return Err(SioError::Truncated {
            offset,
            needed,
            available,
        });
    }

    let head = backend.read_at(offset, header_len)?;
    RecordHeader::parse(&head, offset)
}

/// Random and sequential access to the records of a stream.
#[derive(Debug)]
pub struct RecordReader<B> {
    backend: B,
}

impl<B: StorageBackend> RecordReader<B> {
    /// Creates a reader over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the reader and returns the backend.
    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Reads the record starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No record starts at `offset` (bad marker)
    /// - The record extends past the end of the stream
    /// - The record's lengths are inconsistent
    pub fn read_record(&self, offset: u64) -> SioResult<Record> {
        let header = read_header(&self.backend, offset)?;
        let data = self.backend.read_at(offset, header.total_len() as usize)?;
        Record::decode(&data, offset)
    }

    /// Iterates over every record from the start of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream size cannot be determined.
    pub fn records(&self) -> SioResult<RecordIter<'_, B>> {
        self.records_from(0)
    }

    /// Iterates over records starting at `offset`, which must be the start
    /// of a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream size cannot be determined.
    pub fn records_from(&self, offset: u64) -> SioResult<RecordIter<'_, B>> {
        Ok(RecordIter {
            reader: self,
            offset,
            end: self.backend.size()?,
            finished: false,
        })
    }
}

/// A sequential iterator over records.
///
/// Yields `(offset, Record)` pairs. The first error ends the iteration.
#[derive(Debug)]
pub struct RecordIter<'a, B> {
    reader: &'a RecordReader<B>,
    offset: u64,
    end: u64,
    finished: bool,
}

impl<B: StorageBackend> Iterator for RecordIter<'_, B> {
    type Item = SioResult<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.offset >= self.end {
            return None;
        }

        let offset = self.offset;
        match self.reader.read_record(offset) {
            Ok(record) => {
                self.offset += record.encoded_len();
                Some(Ok((offset, record)))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
