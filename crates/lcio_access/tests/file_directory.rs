//! End-to-end: write an event file with a directory to disk, reopen it and
//! look events up through the directory.

use lcio_access::{
    AccessError, DirectoryConfig, DirectoryEntry, DirectoryReader, DirectoryWriter, RunEvent,
    SegmentSummary,
};
use lcio_sio::{RecordBuilder, RecordOptions, RecordReader, RecordWriter, Version};
use lcio_storage::{FileBackend, StorageBackend};
use tempfile::tempdir;

const EVENTS_PER_SEGMENT: i32 = 25;

fn event_record(key: RunEvent) -> RecordBuilder {
    let mut record = RecordBuilder::new("LCEvent", RecordOptions::NONE);
    record
        .create_block("EventHeader", Version::new(2, 15))
        .write_i32(key.run)
        .write_i32(key.event);
    record
}

/// A stand-in for the detailed per-segment index: every key and its offset.
fn index_record(entries: &[(RunEvent, u64)]) -> RecordBuilder {
    let mut record = RecordBuilder::new("LCIOIndex", RecordOptions::NONE);
    let block = record.create_block("LCIOIndex", Version::new(1, 0));
    block.write_i32(entries.len() as i32);
    for (key, offset) in entries {
        block.write_i32(key.run).write_i32(key.event).write_i64(*offset as i64);
    }
    record
}

fn read_index(reader: &RecordReader<FileBackend>, location: u64) -> Vec<(RunEvent, u64)> {
    let record = reader.read_record(location).unwrap();
    let mut data = record.block().unwrap().reader();
    let count = data.read_i32().unwrap();
    (0..count)
        .map(|_| {
            let key = RunEvent::new(data.read_i32().unwrap(), data.read_i32().unwrap());
            (key, data.read_i64().unwrap() as u64)
        })
        .collect()
}

/// Writes `runs` runs of segments, one segment per run.
fn write_file(path: &std::path::Path, runs: &[i32]) -> u64 {
    let backend = FileBackend::open(path).unwrap();
    let mut directory =
        DirectoryWriter::create(RecordWriter::new(backend), DirectoryConfig::default()).unwrap();

    for &run in runs {
        let mut keys = Vec::new();
        let mut summary = SegmentSummary::new(0);
        summary.add_run_header();
        for event in 0..EVENTS_PER_SEGMENT {
            let key = RunEvent::new(run, event);
            let offset = directory
                .writer_mut()
                .create_record(&event_record(key))
                .unwrap();
            keys.push((key, offset));
            summary.add_event(key);
        }
        summary.location = directory
            .writer_mut()
            .create_record(&index_record(&keys))
            .unwrap();
        directory.append_segment(&summary).unwrap();
    }

    let location = directory.aggregate_location();
    directory.finish().unwrap();
    location
}

#[test]
fn lookup_through_directory_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.slcio");
    let location = write_file(&path, &[1, 2, 3, 7]);

    let backend = FileBackend::open_read_only(&path).unwrap();
    let directory = DirectoryReader::open(
        RecordReader::new(backend),
        location,
        DirectoryConfig::default(),
    )
    .unwrap();

    assert_eq!(directory.entries().len(), 4);
    let aggregate = directory.aggregate();
    assert!(aggregate.is_ordered());
    assert_eq!(aggregate.event_count(), 4 * EVENTS_PER_SEGMENT as u32);
    assert_eq!(aggregate.run_header_count(), 4);
    assert_eq!(aggregate.min_key(), Some(RunEvent::new(1, 0)));
    assert_eq!(aggregate.max_key(), Some(RunEvent::new(7, 24)));

    let target = RunEvent::new(3, 17);
    let entry = directory.find(target).unwrap();
    let index = read_index(directory.reader(), entry.index_location());
    let (_, event_offset) = index.iter().find(|(k, _)| *k == target).unwrap();

    let record = directory.reader().read_record(*event_offset).unwrap();
    let mut header = record.block().unwrap().reader();
    assert_eq!(record.name(), "LCEvent");
    assert_eq!(header.read_i32().unwrap(), 3);
    assert_eq!(header.read_i32().unwrap(), 17);

    assert!(directory.find(RunEvent::new(5, 0)).is_none());
}

#[test]
fn aggregate_survives_reopen_for_append() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.slcio");
    let location = write_file(&path, &[4]);

    let backend = FileBackend::open(&path).unwrap();
    let size = backend.size().unwrap();
    let reader = RecordReader::new(backend);
    let stored = DirectoryEntry::read_at(&reader, location).unwrap();
    assert_eq!(stored.event_count(), EVENTS_PER_SEGMENT as u32);

    // The stored aggregate cannot be written a second time
    let mut writer = RecordWriter::new(reader.into_inner());
    let mut again = stored.clone();
    assert!(matches!(
        again.write(&mut writer),
        Err(AccessError::AlreadyWritten { .. })
    ));
    // but it can be rewritten in place without growing the file
    stored.flush(&mut writer).unwrap();
    assert_eq!(writer.position().unwrap(), size);
}

#[test]
fn every_event_is_found_in_its_segment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.slcio");
    let runs = [10, 11, 12];
    let location = write_file(&path, &runs);

    let directory = DirectoryReader::open(
        RecordReader::new(FileBackend::open_read_only(&path).unwrap()),
        location,
        DirectoryConfig::default(),
    )
    .unwrap();

    for (segment, run) in runs.iter().enumerate() {
        for event in 0..EVENTS_PER_SEGMENT {
            let entry = directory.find(RunEvent::new(*run, event)).unwrap();
            assert_eq!(entry, &directory.entries()[segment]);
        }
    }
}
