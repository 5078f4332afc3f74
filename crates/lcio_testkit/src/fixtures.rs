//! Fixtures that write a directory and open it again.

use lcio_access::{
    DirectoryConfig, DirectoryReader, DirectoryWriter, KeyRange, RunEvent, SegmentSummary,
};
use lcio_sio::{RecordReader, RecordWriter};
use lcio_storage::{FileBackend, InMemoryBackend, StorageBackend};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builds a segment summary covering `[min, max]` with `events` events.
///
/// The index location is left at 0.
pub fn summary(min: (i32, i32), max: (i32, i32), events: u32) -> SegmentSummary {
    let range = KeyRange::new(min.into(), max.into()).expect("min must not exceed max");
    SegmentSummary::with_range(0, range, events)
}

fn write_segments<B: StorageBackend>(
    backend: B,
    config: DirectoryConfig,
    segments: &[SegmentSummary],
) -> (u64, B) {
    let mut writer = DirectoryWriter::create(RecordWriter::new(backend), config)
        .expect("Failed to create directory");
    for segment in segments {
        writer
            .append_segment(segment)
            .expect("Failed to append segment");
    }
    let location = writer.aggregate_location();
    let backend = writer
        .finish()
        .expect("Failed to finish directory")
        .into_inner();
    (location, backend)
}

/// A directory written to memory.
pub struct MemoryDirectory {
    /// Offset of the aggregate entry.
    pub aggregate_location: u64,
    /// The file bytes.
    pub backend: InMemoryBackend,
}

impl MemoryDirectory {
    /// Writes `segments` in order with the default configuration.
    pub fn write(segments: &[SegmentSummary]) -> Self {
        Self::write_with(DirectoryConfig::default(), segments)
    }

    /// Writes `segments` in order with the given configuration.
    pub fn write_with(config: DirectoryConfig, segments: &[SegmentSummary]) -> Self {
        let (aggregate_location, backend) =
            write_segments(InMemoryBackend::new(), config, segments);
        Self {
            aggregate_location,
            backend,
        }
    }

    /// Opens the directory over a copy of the bytes.
    pub fn open(&self) -> DirectoryReader<InMemoryBackend> {
        DirectoryReader::open(
            RecordReader::new(InMemoryBackend::with_data(self.backend.data())),
            self.aggregate_location,
            DirectoryConfig::default(),
        )
        .expect("Failed to open directory")
    }
}

/// A directory written to a temporary file, removed on drop.
pub struct FileDirectory {
    /// Offset of the aggregate entry.
    pub aggregate_location: u64,
    path: PathBuf,
    _temp_dir: TempDir,
}

impl FileDirectory {
    /// Writes `segments` in order to a fresh temporary file.
    pub fn write(segments: &[SegmentSummary]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("directory.slcio");
        let backend = FileBackend::open(&path).expect("Failed to create file backend");
        let (aggregate_location, _) = write_segments(backend, DirectoryConfig::default(), segments);

        Self {
            aggregate_location,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the directory read-only.
    pub fn open(&self) -> DirectoryReader<FileBackend> {
        let backend = FileBackend::open_read_only(&self.path).expect("Failed to open file");
        DirectoryReader::open(
            RecordReader::new(backend),
            self.aggregate_location,
            DirectoryConfig::default(),
        )
        .expect("Failed to open directory")
    }
}

/// Segments `[(run, 0), (run, events - 1)]` for each run, in the given order.
pub fn run_segments(runs: &[i32], events: i32) -> Vec<SegmentSummary> {
    runs.iter()
        .map(|&run| {
            let mut segment = SegmentSummary::new(0);
            segment.add_run_header();
            for event in 0..events {
                segment.add_event(RunEvent::new(run, event));
            }
            segment
        })
        .collect()
}
