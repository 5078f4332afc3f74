//! Directory entries: the fixed-layout record summarizing a segment.
//!
//! ## Block Layout
//!
//! One `LCIORandomAccess` record holding one `LCIORandomAccess` block,
//! version 1.0, big-endian:
//!
//! ```text
//! | min.run (4) | min.event (4) | max.run (4) | max.event (4) |
//! | run_headers (4) | events (4) | ordered (4) | pad to 8 (4) |
//! | index_location (8) | previous_location (8) | next_location (8) |
//! ```
//!
//! An entry with no range stores `(0, 0)` for both keys.

use crate::error::{AccessError, AccessResult};
use crate::run_event::{KeyPosition, KeyRange, RunEvent};
use crate::segment::SegmentIndex;
use lcio_sio::{Record, RecordBuilder, RecordOptions, RecordReader, RecordWriter, Version};
use lcio_storage::StorageBackend;
use tracing::debug;

/// Record and block name of a directory entry.
pub const RANDOM_ACCESS_NAME: &str = "LCIORandomAccess";

/// Block version this implementation reads and writes.
pub const RANDOM_ACCESS_VERSION: Version = Version::new(1, 0);

/// Size of the block payload: seven int32, 4 bytes of padding, three int64.
pub const ENTRY_PAYLOAD_LEN: usize = 56;

/// Offsets are aligned to 8 bytes within the block payload.
const OFFSET_ALIGN: usize = 8;

/// Key stored for an entry that has no range yet.
const UNSET_KEY: RunEvent = RunEvent::new(0, 0);

/// Summary of one segment, or of the whole file for the aggregate entry.
///
/// A segment entry is populated from its segment's index, linked to the
/// previous segment entry and written once. The aggregate entry is written
/// once when a session starts, then updated with [`DirectoryEntry::merge`]
/// and rewritten in place with [`DirectoryEntry::flush`].
///
/// Link fields hold absolute offsets; 0 means "no neighbor".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    range: Option<KeyRange>,
    run_header_count: u32,
    event_count: u32,
    ordered: bool,
    index_location: u64,
    previous_location: u64,
    next_location: u64,
    location: Option<u64>,
}

impl Default for DirectoryEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryEntry {
    /// Creates an empty, unwritten entry.
    ///
    /// It has no range, zero counts, no links, and is ordered.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            range: None,
            run_header_count: 0,
            event_count: 0,
            ordered: true,
            index_location: 0,
            previous_location: 0,
            next_location: 0,
            location: None,
        }
    }

    /// Keys covered, or `None` before any data was merged in.
    #[must_use]
    pub const fn range(&self) -> Option<KeyRange> {
        self.range
    }

    /// Smallest key covered.
    #[must_use]
    pub fn min_key(&self) -> Option<RunEvent> {
        self.range.map(|r| r.min())
    }

    /// Largest key covered.
    #[must_use]
    pub fn max_key(&self) -> Option<RunEvent> {
        self.range.map(|r| r.max())
    }

    /// Number of run headers covered.
    #[must_use]
    pub const fn run_header_count(&self) -> u32 {
        self.run_header_count
    }

    /// Number of events covered.
    #[must_use]
    pub const fn event_count(&self) -> u32 {
        self.event_count
    }

    /// Whether every merged range came strictly after the ones before it.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Offset of the segment's detailed index, 0 if unset.
    #[must_use]
    pub const fn index_location(&self) -> u64 {
        self.index_location
    }

    /// Offset of the previous entry in the chain, 0 if none.
    ///
    /// For the aggregate this is the first segment entry merged into it.
    #[must_use]
    pub const fn previous_location(&self) -> u64 {
        self.previous_location
    }

    /// Offset of the next entry in the chain, 0 if none.
    ///
    /// For the aggregate this is the most recent segment entry merged into it.
    #[must_use]
    pub const fn next_location(&self) -> u64 {
        self.next_location
    }

    /// Where this entry was written, `None` until [`Self::write`].
    #[must_use]
    pub const fn location(&self) -> Option<u64> {
        self.location
    }

    fn written_location(&self) -> AccessResult<u64> {
        self.location.ok_or(AccessError::NotWritten)
    }

    /// Appends this entry to the stream and remembers where it went.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::AlreadyWritten`] on a second call, or the
    /// stream error if the append fails.
    pub fn write<B: StorageBackend>(&mut self, writer: &mut RecordWriter<B>) -> AccessResult<u64> {
        if let Some(location) = self.location {
            return Err(AccessError::AlreadyWritten { location });
        }
        let location = writer.create_record(&self.to_record())?;
        self.location = Some(location);
        Ok(location)
    }

    /// Rewrites this entry in place at its location.
    ///
    /// Every call overwrites the whole record, so repeated calls are safe.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotWritten`] if [`Self::write`] was never
    /// called, or the stream error if the rewrite fails.
    pub fn flush<B: StorageBackend>(&self, writer: &mut RecordWriter<B>) -> AccessResult<()> {
        let location = self.written_location()?;
        writer.rewrite_record(location, &self.to_record())?;
        Ok(())
    }

    /// Reads the entry stored at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or is not a directory
    /// entry of the expected version.
    pub fn read_at<B: StorageBackend>(reader: &RecordReader<B>, offset: u64) -> AccessResult<Self> {
        let record = reader.read_record(offset)?;
        let mut entry = Self::from_record(&record)?;
        entry.location = Some(offset);
        Ok(entry)
    }

    /// Decodes an entry from a record. The result has no location.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::FormatMismatch`] if the block name or version
    /// differ from [`RANDOM_ACCESS_NAME`] / [`RANDOM_ACCESS_VERSION`].
    pub fn from_record(record: &Record) -> AccessResult<Self> {
        Self::decode(record, RANDOM_ACCESS_VERSION)
    }

    fn decode(record: &Record, expected: Version) -> AccessResult<Self> {
        let block = record.block()?;
        if block.name() != RANDOM_ACCESS_NAME || block.version() != expected {
            return Err(AccessError::FormatMismatch {
                expected_name: RANDOM_ACCESS_NAME,
                expected_version: expected,
                found_name: block.name().to_owned(),
                found_version: block.version(),
            });
        }

        let mut data = block.reader();
        let min = RunEvent::new(data.read_i32()?, data.read_i32()?);
        let max = RunEvent::new(data.read_i32()?, data.read_i32()?);
        let run_header_count = data.read_i32()? as u32;
        let event_count = data.read_i32()? as u32;
        let ordered = data.read_bool()?;
        data.pad(OFFSET_ALIGN)?;
        let index_location = data.read_i64()? as u64;
        let previous_location = data.read_i64()? as u64;
        let next_location = data.read_i64()? as u64;

        // A range exists exactly when the entry counts events.
        let unset = min == UNSET_KEY && max == UNSET_KEY && event_count == 0;
        let range = if unset {
            None
        } else {
            Some(KeyRange::new(min, max)?)
        };

        Ok(Self {
            range,
            run_header_count,
            event_count,
            ordered,
            index_location,
            previous_location,
            next_location,
            location: None,
        })
    }

    fn to_record(&self) -> RecordBuilder {
        let min = self.min_key().unwrap_or(UNSET_KEY);
        let max = self.max_key().unwrap_or(UNSET_KEY);

        let mut record = RecordBuilder::new(RANDOM_ACCESS_NAME, RecordOptions::NONE);
        record
            .create_block(RANDOM_ACCESS_NAME, RANDOM_ACCESS_VERSION)
            .write_i32(min.run)
            .write_i32(min.event)
            .write_i32(max.run)
            .write_i32(max.event)
            .write_i32(self.run_header_count as i32)
            .write_i32(self.event_count as i32)
            .write_bool(self.ordered)
            .pad(OFFSET_ALIGN)
            .write_i64(self.index_location as i64)
            .write_i64(self.previous_location as i64)
            .write_i64(self.next_location as i64);
        record
    }

    /// Copies range, counts, ordered flag and index location from a
    /// segment's index. Links are left alone.
    ///
    /// The stored form cannot tell "no range" from a range of exactly
    /// `(0, 0)` with zero events: such an index reads back unranged.
    pub fn populate_from_segment_index<I: SegmentIndex + ?Sized>(&mut self, index: &I) {
        self.range = index.range();
        self.ordered = index.is_ordered();
        self.event_count = index.event_count();
        self.run_header_count = index.run_header_count();
        self.index_location = index.location();
    }

    /// Folds a newly written segment entry into this aggregate.
    ///
    /// Must be applied in the order segments were written:
    /// - the previous-link is set to `other` if it is still 0, and the
    ///   next-link always becomes `other`
    /// - the ordered flag is cleared if `other` is unordered or its range
    ///   starts before the current maximum
    /// - the range grows to cover `other`'s range
    /// - counts are summed, saturating at `u32::MAX`
    ///
    /// An `other` without a range changes links, flag and counts only.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotWritten`] if `other` has no location.
    pub fn merge(&mut self, other: &DirectoryEntry) -> AccessResult<()> {
        let child = other.written_location()?;

        if self.previous_location == 0 {
            self.previous_location = child;
        }
        self.next_location = child;

        self.ordered &= other.ordered;
        if let Some(incoming) = other.range {
            self.range = Some(match self.range {
                None => incoming,
                Some(current) => {
                    if current.max() > incoming.min() {
                        debug!(
                            current = %current,
                            incoming = %incoming,
                            "merged range starts before current maximum"
                        );
                        self.ordered = false;
                    }
                    current.union(&incoming)
                }
            });
        }

        self.event_count = self.event_count.saturating_add(other.event_count);
        self.run_header_count = self.run_header_count.saturating_add(other.run_header_count);
        Ok(())
    }

    /// Points the previous-link at `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotWritten`] if `entry` has no location.
    pub fn set_previous_link(&mut self, entry: &DirectoryEntry) -> AccessResult<()> {
        self.previous_location = entry.written_location()?;
        Ok(())
    }

    /// Points the next-link at `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotWritten`] if `entry` has no location.
    pub fn set_next_link(&mut self, entry: &DirectoryEntry) -> AccessResult<()> {
        self.next_location = entry.written_location()?;
        Ok(())
    }

    /// Locates `key` relative to this entry's range.
    ///
    /// Returns `None` if the entry has no range.
    #[must_use]
    pub fn contains_key(&self, key: RunEvent) -> Option<KeyPosition> {
        self.range.map(|r| r.locate(key))
    }

    /// Returns true if `key` is inside this entry's range.
    #[must_use]
    pub fn is_match(&self, key: RunEvent) -> bool {
        self.contains_key(key) == Some(KeyPosition::Within)
    }
}
