//! The read side of a directory: load the chain, find segments by key.

use crate::config::DirectoryConfig;
use crate::entry::DirectoryEntry;
use crate::error::{AccessError, AccessResult};
use crate::run_event::RunEvent;
use lcio_sio::RecordReader;
use lcio_storage::StorageBackend;
use std::collections::HashSet;
use tracing::debug;

/// A loaded directory chain.
///
/// The chain is walked from the aggregate's next-link (the most recent
/// segment entry) back through each entry's previous-link, and kept in
/// write order.
#[derive(Debug)]
pub struct DirectoryReader<B> {
    reader: RecordReader<B>,
    aggregate: DirectoryEntry,
    entries: Vec<DirectoryEntry>,
    /// Indexes into `entries` of the entries that have a range.
    searchable: Vec<usize>,
}

impl<B: StorageBackend> DirectoryReader<B> {
    /// Reads the aggregate at `aggregate_location` and loads its chain.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any entry cannot be read or has the wrong format
    /// - The chain revisits an offset or exceeds `max_chain_length`
    /// - The first entry of the chain is not the aggregate's previous-link
    pub fn open(
        reader: RecordReader<B>,
        aggregate_location: u64,
        config: DirectoryConfig,
    ) -> AccessResult<Self> {
        let aggregate = DirectoryEntry::read_at(&reader, aggregate_location)?;
        let entries = load_chain(&reader, &aggregate, config.max_chain_length)?;
        let searchable = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.range().is_some())
            .map(|(i, _)| i)
            .collect();

        debug!(
            aggregate_location,
            entries = entries.len(),
            ordered = aggregate.is_ordered(),
            "directory loaded"
        );

        Ok(Self {
            reader,
            aggregate,
            entries,
            searchable,
        })
    }

    /// The summary of the whole file.
    #[must_use]
    pub fn aggregate(&self) -> &DirectoryEntry {
        &self.aggregate
    }

    /// Segment entries in write order.
    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// The record reader, for following an entry's index location.
    #[must_use]
    pub fn reader(&self) -> &RecordReader<B> {
        &self.reader
    }

    /// Consumes the directory and returns the record reader.
    pub fn into_inner(self) -> RecordReader<B> {
        self.reader
    }

    /// Finds the segment entry whose range contains `key`.
    ///
    /// Binary search when the aggregate is ordered, linear scan otherwise.
    /// When ranges overlap, the earliest matching entry is returned.
    #[must_use]
    pub fn find(&self, key: RunEvent) -> Option<&DirectoryEntry> {
        if !self.aggregate.is_match(key) {
            return None;
        }

        if self.aggregate.is_ordered() {
            self.searchable
                .binary_search_by(|&i| {
                    self.entries[i]
                        .contains_key(key)
                        .map_or(std::cmp::Ordering::Less, |p| p.range_ordering())
                })
                .ok()
                .map(|i| &self.entries[self.searchable[i]])
        } else {
            self.entries.iter().find(|e| e.is_match(key))
        }
    }

    /// Every segment entry whose range contains `key`, in write order.
    #[must_use]
    pub fn find_all(&self, key: RunEvent) -> Vec<&DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_match(key)).collect()
    }

    /// Merges the chain into a fresh aggregate, as the writer would have.
    ///
    /// Comparing the result with [`Self::aggregate`] checks the stored
    /// summary against the chain.
    ///
    /// # Errors
    ///
    /// Never fails for a loaded chain, whose entries all have locations.
    pub fn recompute_aggregate(&self) -> AccessResult<DirectoryEntry> {
        let mut aggregate = DirectoryEntry::new();
        for entry in &self.entries {
            aggregate.merge(entry)?;
        }
        Ok(aggregate)
    }
}

fn load_chain<B: StorageBackend>(
    reader: &RecordReader<B>,
    aggregate: &DirectoryEntry,
    max_len: usize,
) -> AccessResult<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = aggregate.next_location();

    while cursor != 0 {
        if Some(cursor) == aggregate.location() || !seen.insert(cursor) {
            return Err(AccessError::chain_corrupted(cursor, "offset visited twice"));
        }
        if entries.len() >= max_len {
            return Err(AccessError::chain_corrupted(
                cursor,
                format!("chain longer than {max_len} entries"),
            ));
        }

        let entry = DirectoryEntry::read_at(reader, cursor)?;
        debug!(offset = cursor, previous = entry.previous_location(), "chain entry");
        cursor = entry.previous_location();
        entries.push(entry);
    }

    entries.reverse();

    if let Some(first) = entries.first() {
        if first.location() != Some(aggregate.previous_location()) {
            return Err(AccessError::chain_corrupted(
                aggregate.previous_location(),
                "aggregate's previous-link is not the first entry of the chain",
            ));
        }
    } else if aggregate.previous_location() != 0 {
        return Err(AccessError::chain_corrupted(
            aggregate.previous_location(),
            "aggregate links a first entry but no latest entry",
        ));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_event::KeyRange;
    use crate::segment::SegmentSummary;
    use crate::writer::DirectoryWriter;
    use lcio_sio::RecordWriter;
    use lcio_storage::InMemoryBackend;

    fn re(run: i32, event: i32) -> RunEvent {
        RunEvent::new(run, event)
    }

    fn build(ranges: &[((i32, i32), (i32, i32))]) -> (u64, InMemoryBackend) {
        let mut writer = DirectoryWriter::create(
            RecordWriter::new(InMemoryBackend::new()),
            DirectoryConfig::default(),
        )
        .unwrap();
        for (i, (min, max)) in ranges.iter().enumerate() {
            let range = KeyRange::new((*min).into(), (*max).into()).unwrap();
            writer
                .append_segment(&SegmentSummary::with_range(i as u64 * 1000, range, 10))
                .unwrap();
        }
        let location = writer.aggregate_location();
        (location, writer.finish().unwrap().into_inner())
    }

    fn open(location: u64, backend: InMemoryBackend) -> AccessResult<DirectoryReader<InMemoryBackend>> {
        DirectoryReader::open(RecordReader::new(backend), location, DirectoryConfig::default())
    }

    #[test]
    fn run_header_only_segment_keeps_search_ordered() {
        let mut writer = DirectoryWriter::create(
            RecordWriter::new(InMemoryBackend::new()),
            DirectoryConfig::default(),
        )
        .unwrap();
        let first = KeyRange::new(re(1, 0), re(1, 9)).unwrap();
        writer
            .append_segment(&SegmentSummary::with_range(0, first, 10))
            .unwrap();
        let mut headers_only = SegmentSummary::new(0);
        headers_only.add_run_header();
        writer.append_segment(&headers_only).unwrap();
        let last = KeyRange::new(re(2, 0), re(2, 9)).unwrap();
        writer
            .append_segment(&SegmentSummary::with_range(0, last, 10))
            .unwrap();
        let location = writer.aggregate_location();
        let backend = writer.finish().unwrap().into_inner();

        let directory = open(location, backend).unwrap();
        assert_eq!(directory.entries().len(), 3);
        assert_eq!(directory.entries()[1].range(), None);
        assert!(directory.aggregate().is_ordered());
        assert_eq!(
            directory.find(re(1, 5)).map(DirectoryEntry::location),
            Some(directory.entries()[0].location())
        );

        let recomputed = directory.recompute_aggregate().unwrap();
        assert_eq!(recomputed.range(), directory.aggregate().range());
        assert!(recomputed.is_ordered());
        assert_eq!(recomputed.run_header_count(), 1);
    }

    #[test]
    fn empty_directory() {
        let (location, backend) = build(&[]);
        let directory = open(location, backend).unwrap();
        assert!(directory.entries().is_empty());
        assert_eq!(directory.aggregate().range(), None);
        assert!(directory.find(re(0, 0)).is_none());
    }

    #[test]
    fn chain_loaded_in_write_order() {
        let (location, backend) = build(&[((1, 0), (1, 9)), ((1, 10), (1, 19)), ((2, 0), (2, 5))]);
        let directory = open(location, backend).unwrap();

        let mins: Vec<_> = directory
            .entries()
            .iter()
            .map(|e| e.min_key().unwrap())
            .collect();
        assert_eq!(mins, [re(1, 0), re(1, 10), re(2, 0)]);
        assert_eq!(directory.aggregate().event_count(), 30);
    }

    #[test]
    fn find_in_ordered_directory() {
        let (location, backend) = build(&[((1, 0), (1, 9)), ((1, 10), (1, 19)), ((2, 0), (2, 5))]);
        let directory = open(location, backend).unwrap();
        assert!(directory.aggregate().is_ordered());

        assert_eq!(directory.find(re(1, 12)).unwrap().index_location(), 1000);
        assert_eq!(directory.find(re(2, 5)).unwrap().index_location(), 2000);
        assert_eq!(directory.find(re(1, 0)).unwrap().index_location(), 0);
        assert!(directory.find(re(1, 20)).is_none());
        assert!(directory.find(re(0, 5)).is_none());
        assert!(directory.find(re(3, 0)).is_none());
    }

    #[test]
    fn find_in_unordered_directory() {
        let (location, backend) = build(&[((5, 0), (5, 9)), ((1, 0), (1, 9)), ((3, 0), (3, 9))]);
        let directory = open(location, backend).unwrap();
        assert!(!directory.aggregate().is_ordered());

        assert_eq!(directory.find(re(1, 4)).unwrap().index_location(), 1000);
        assert_eq!(directory.find(re(5, 9)).unwrap().index_location(), 0);
        assert!(directory.find(re(4, 0)).is_none());
    }

    #[test]
    fn find_all_with_overlap() {
        let (location, backend) = build(&[((1, 0), (1, 9)), ((1, 5), (1, 20))]);
        let directory = open(location, backend).unwrap();

        let hits: Vec<u64> = directory
            .find_all(re(1, 7))
            .iter()
            .map(|e| e.index_location())
            .collect();
        assert_eq!(hits, [0, 1000]);
        assert_eq!(directory.find(re(1, 7)).unwrap().index_location(), 0);
    }

    #[test]
    fn recomputed_aggregate_matches_stored() {
        let (location, backend) = build(&[((1, 0), (1, 9)), ((2, 0), (2, 9))]);
        let directory = open(location, backend).unwrap();

        let recomputed = directory.recompute_aggregate().unwrap();
        assert_eq!(recomputed.range(), directory.aggregate().range());
        assert_eq!(recomputed.event_count(), directory.aggregate().event_count());
        assert_eq!(
            recomputed.previous_location(),
            directory.aggregate().previous_location()
        );
        assert_eq!(
            recomputed.next_location(),
            directory.aggregate().next_location()
        );
    }

    #[test]
    fn chain_limit_is_enforced() {
        let (location, backend) = build(&[((1, 0), (1, 9)), ((2, 0), (2, 9)), ((3, 0), (3, 9))]);
        let result = DirectoryReader::open(
            RecordReader::new(backend),
            location,
            DirectoryConfig::new().max_chain_length(2),
        );
        assert!(matches!(result, Err(AccessError::ChainCorrupted { .. })));
    }

    #[test]
    fn self_referencing_chain_is_rejected() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        let mut aggregate = DirectoryEntry::new();
        let location = aggregate.write(&mut writer).unwrap();

        let mut looped = DirectoryEntry::new();
        looped.populate_from_segment_index(&SegmentSummary::with_range(
            0,
            KeyRange::single(re(1, 1)),
            1,
        ));
        looped.write(&mut writer).unwrap();
        let this = looped.clone();
        looped.set_previous_link(&this).unwrap();
        looped.flush(&mut writer).unwrap();

        aggregate.merge(&looped).unwrap();
        aggregate.flush(&mut writer).unwrap();

        let result = open(location, writer.into_inner());
        assert!(matches!(result, Err(AccessError::ChainCorrupted { .. })));
    }

    #[test]
    fn mismatched_first_link_is_rejected() {
        let mut writer = RecordWriter::new(InMemoryBackend::new());
        let mut aggregate = DirectoryEntry::new();
        let location = aggregate.write(&mut writer).unwrap();

        let mut stray = DirectoryEntry::new();
        stray.write(&mut writer).unwrap();
        let mut segment = DirectoryEntry::new();
        segment.write(&mut writer).unwrap();

        aggregate.set_previous_link(&stray).unwrap();
        aggregate.set_next_link(&segment).unwrap();
        aggregate.flush(&mut writer).unwrap();

        let result = open(location, writer.into_inner());
        assert!(matches!(result, Err(AccessError::ChainCorrupted { .. })));
    }

    #[test]
    fn wrong_aggregate_offset() {
        let (_, backend) = build(&[((1, 0), (1, 9))]);
        let result = open(7, backend);
        assert!(matches!(result, Err(AccessError::Sio(_))));
    }
}
