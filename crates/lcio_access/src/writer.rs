//! The write side of a directory: one session per file.

use crate::config::DirectoryConfig;
use crate::entry::DirectoryEntry;
use crate::error::AccessResult;
use crate::segment::SegmentIndex;
use lcio_sio::RecordWriter;
use lcio_storage::StorageBackend;
use tracing::{debug, info, warn};

/// Builds the directory chain while a file is being written.
///
/// `create` writes the aggregate entry at the current end of the stream.
/// Other records (events, run headers, detailed indexes) are appended
/// through [`Self::writer_mut`]; after each segment the caller hands the
/// segment's index summary to [`Self::append_segment`].
#[derive(Debug)]
pub struct DirectoryWriter<B: StorageBackend> {
    writer: RecordWriter<B>,
    config: DirectoryConfig,
    aggregate: DirectoryEntry,
    aggregate_location: u64,
    last_segment: Option<DirectoryEntry>,
    segments_written: u64,
    unflushed: u32,
}

impl<B: StorageBackend> DirectoryWriter<B> {
    /// Starts a session by writing an empty aggregate entry.
    ///
    /// # Errors
    ///
    /// Returns the stream error if the aggregate cannot be written.
    pub fn create(mut writer: RecordWriter<B>, config: DirectoryConfig) -> AccessResult<Self> {
        let mut aggregate = DirectoryEntry::new();
        let aggregate_location = aggregate.write(&mut writer)?;
        debug!(aggregate_location, "directory session started");

        Ok(Self {
            writer,
            config,
            aggregate,
            aggregate_location,
            last_segment: None,
            segments_written: 0,
            unflushed: 0,
        })
    }

    /// Writes the entry for a finished segment and merges it into the
    /// aggregate.
    ///
    /// The new entry's previous-link points at the segment entry written
    /// before it. The aggregate is rewritten in place once
    /// `flush_interval` segments have accumulated.
    ///
    /// Returns the written segment entry.
    ///
    /// # Errors
    ///
    /// Returns the stream error if the entry cannot be written or the
    /// aggregate cannot be rewritten. A failed rewrite leaves the entry
    /// written, merged and linked; a later rewrite or [`Self::finish`]
    /// stores it.
    pub fn append_segment<I: SegmentIndex + ?Sized>(
        &mut self,
        index: &I,
    ) -> AccessResult<DirectoryEntry> {
        let mut entry = DirectoryEntry::new();
        entry.populate_from_segment_index(index);
        if let Some(previous) = &self.last_segment {
            entry.set_previous_link(previous)?;
        }
        let location = entry.write(&mut self.writer)?;

        let was_ordered = self.aggregate.is_ordered();
        self.aggregate.merge(&entry)?;
        if was_ordered && !self.aggregate.is_ordered() {
            warn!(
                location,
                "segment breaks key order, readers will scan the directory linearly"
            );
        }

        self.segments_written += 1;
        self.unflushed += 1;
        debug!(
            location,
            events = entry.event_count(),
            segments = self.segments_written,
            "segment entry written"
        );

        // The chain must include the entry even if the rewrite below fails.
        self.last_segment = Some(entry.clone());

        if self.config.flush_interval > 0 && self.unflushed >= self.config.flush_interval {
            self.flush_aggregate()?;
        }

        Ok(entry)
    }

    /// Rewrites the aggregate entry in place with the current summary.
    ///
    /// # Errors
    ///
    /// Returns the stream error if the rewrite fails.
    pub fn flush_aggregate(&mut self) -> AccessResult<()> {
        self.aggregate.flush(&mut self.writer)?;
        self.unflushed = 0;
        Ok(())
    }

    /// The running summary of everything written so far.
    #[must_use]
    pub fn aggregate(&self) -> &DirectoryEntry {
        &self.aggregate
    }

    /// Where the aggregate entry lives; readers open the directory here.
    #[must_use]
    pub fn aggregate_location(&self) -> u64 {
        self.aggregate_location
    }

    /// The most recently written segment entry.
    #[must_use]
    pub fn last_segment(&self) -> Option<&DirectoryEntry> {
        self.last_segment.as_ref()
    }

    /// Number of segment entries written in this session.
    #[must_use]
    pub fn segments_written(&self) -> u64 {
        self.segments_written
    }

    /// The record writer, for appending the file's other records.
    pub fn writer_mut(&mut self) -> &mut RecordWriter<B> {
        &mut self.writer
    }

    /// Rewrites the aggregate one last time and flushes (or syncs) the
    /// stream.
    ///
    /// Returns the record writer so the caller can keep or close the stream.
    ///
    /// # Errors
    ///
    /// Returns the stream error if the rewrite, flush or sync fails.
    pub fn finish(mut self) -> AccessResult<RecordWriter<B>> {
        self.flush_aggregate()?;
        if self.config.sync_on_finish {
            self.writer.sync()?;
        } else {
            self.writer.flush()?;
        }

        info!(
            segments = self.segments_written,
            events = self.aggregate.event_count(),
            ordered = self.aggregate.is_ordered(),
            "directory finished"
        );
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_event::{KeyRange, RunEvent};
    use crate::segment::SegmentSummary;
    use crate::error::AccessError;
    use crate::reader::DirectoryReader;
    use lcio_sio::{RecordBuilder, RecordOptions, RecordReader, SioError, Version};
    use lcio_storage::{InMemoryBackend, StorageError, StorageResult};
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Memory backend whose in-place rewrites fail while `fail` is set.
    #[derive(Debug, Default)]
    struct FailingRewrites {
        inner: InMemoryBackend,
        fail: Arc<AtomicBool>,
    }

    impl StorageBackend for FailingRewrites {
        fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
            self.inner.read_at(offset, len)
        }

        fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
            self.inner.append(data)
        }

        fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Io(io::Error::other("rewrite refused")));
            }
            self.inner.write_at(offset, data)
        }

        fn flush(&mut self) -> StorageResult<()> {
            self.inner.flush()
        }

        fn size(&self) -> StorageResult<u64> {
            self.inner.size()
        }

        fn sync(&mut self) -> StorageResult<()> {
            self.inner.sync()
        }
    }

    fn summary(location: u64, min: (i32, i32), max: (i32, i32), events: u32) -> SegmentSummary {
        SegmentSummary::with_range(
            location,
            KeyRange::new(min.into(), max.into()).unwrap(),
            events,
        )
    }

    fn session(config: DirectoryConfig) -> DirectoryWriter<InMemoryBackend> {
        DirectoryWriter::create(RecordWriter::new(InMemoryBackend::new()), config).unwrap()
    }

    fn stored_aggregate(writer: &DirectoryWriter<InMemoryBackend>) -> DirectoryEntry {
        let reader = RecordReader::new(InMemoryBackend::with_data(
            writer.writer.backend().data(),
        ));
        DirectoryEntry::read_at(&reader, writer.aggregate_location()).unwrap()
    }

    #[test]
    fn create_writes_empty_aggregate() {
        let writer = session(DirectoryConfig::default());
        assert_eq!(writer.aggregate_location(), 0);
        assert_eq!(writer.segments_written(), 0);
        assert!(writer.last_segment().is_none());
        assert_eq!(stored_aggregate(&writer).range(), None);
    }

    #[test]
    fn segments_are_chained_backwards() {
        let mut writer = session(DirectoryConfig::default());
        let first = writer.append_segment(&summary(100, (1, 0), (1, 9), 10)).unwrap();
        let second = writer.append_segment(&summary(200, (2, 0), (2, 9), 10)).unwrap();

        assert_eq!(first.previous_location(), 0);
        assert_eq!(second.previous_location(), first.location().unwrap());
        assert_eq!(second.next_location(), 0);
        assert_eq!(second.index_location(), 200);
        assert_eq!(writer.last_segment(), Some(&second));

        let aggregate = writer.aggregate();
        assert_eq!(aggregate.previous_location(), first.location().unwrap());
        assert_eq!(aggregate.next_location(), second.location().unwrap());
        assert_eq!(aggregate.event_count(), 20);
        assert!(aggregate.is_ordered());
    }

    #[test]
    fn aggregate_rewritten_every_segment_by_default() {
        let mut writer = session(DirectoryConfig::default());
        writer.append_segment(&summary(0, (1, 0), (1, 9), 10)).unwrap();

        let stored = stored_aggregate(&writer);
        assert_eq!(&stored, writer.aggregate());
    }

    #[test]
    fn flush_interval_delays_rewrite() {
        let mut writer = session(DirectoryConfig::new().flush_interval(2));
        writer.append_segment(&summary(0, (1, 0), (1, 9), 10)).unwrap();
        assert_eq!(stored_aggregate(&writer).event_count(), 0);

        writer.append_segment(&summary(0, (2, 0), (2, 9), 5)).unwrap();
        assert_eq!(stored_aggregate(&writer).event_count(), 15);
    }

    #[test]
    fn zero_interval_rewrites_only_on_finish() {
        let mut writer = session(DirectoryConfig::new().flush_interval(0));
        for run in 0..4 {
            writer.append_segment(&summary(0, (run, 0), (run, 9), 10)).unwrap();
        }
        assert_eq!(stored_aggregate(&writer).event_count(), 0);

        let location = writer.aggregate_location();
        let backend = writer.finish().unwrap().into_inner();
        let reader = RecordReader::new(backend);
        let stored = DirectoryEntry::read_at(&reader, location).unwrap();
        assert_eq!(stored.event_count(), 40);
    }

    #[test]
    fn out_of_order_segment_clears_ordered() {
        let mut writer = session(DirectoryConfig::default());
        writer.append_segment(&summary(0, (5, 0), (5, 9), 10)).unwrap();
        writer.append_segment(&summary(0, (4, 0), (4, 9), 10)).unwrap();
        assert!(!writer.aggregate().is_ordered());
        assert!(!stored_aggregate(&writer).is_ordered());
    }

    #[test]
    fn other_records_between_segments() {
        let mut writer = session(DirectoryConfig::default());

        let mut event = RecordBuilder::new("LCEvent", RecordOptions::NONE);
        event
            .create_block("EventHeader", Version::new(2, 15))
            .write_i32(1)
            .write_i32(0);
        writer.writer_mut().create_record(&event).unwrap();

        let mut segment = SegmentSummary::new(0);
        segment.add_event(RunEvent::new(1, 0));
        let entry = writer.append_segment(&segment).unwrap();
        assert!(entry.location().unwrap() > writer.aggregate_location());
        assert_eq!(writer.segments_written(), 1);
    }

    #[test]
    fn failed_rewrite_keeps_chain_consistent() {
        let backend = FailingRewrites::default();
        let fail = Arc::clone(&backend.fail);
        let mut writer =
            DirectoryWriter::create(RecordWriter::new(backend), DirectoryConfig::default())
                .unwrap();

        fail.store(true, Ordering::SeqCst);
        let result = writer.append_segment(&summary(0, (1, 0), (1, 9), 10));
        assert!(matches!(
            result,
            Err(AccessError::Sio(SioError::Storage(StorageError::Io(_))))
        ));
        let first = writer.last_segment().cloned().unwrap();
        assert_eq!(writer.segments_written(), 1);
        assert_eq!(writer.aggregate().next_location(), first.location().unwrap());

        fail.store(false, Ordering::SeqCst);
        let second = writer.append_segment(&summary(0, (2, 0), (2, 9), 10)).unwrap();
        assert_eq!(second.previous_location(), first.location().unwrap());

        let location = writer.aggregate_location();
        let backend = writer.finish().unwrap().into_inner();
        let directory =
            DirectoryReader::open(RecordReader::new(backend), location, DirectoryConfig::default())
                .unwrap();
        assert_eq!(directory.entries().len(), 2);

        let recomputed = directory.recompute_aggregate().unwrap();
        assert_eq!(recomputed.event_count(), directory.aggregate().event_count());
        assert_eq!(recomputed.range(), directory.aggregate().range());
    }
}
