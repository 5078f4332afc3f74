//! # LCIO Access
//!
//! The random-access directory of an LCIO event file.
//!
//! An event file is written sequentially, segment by segment. After each
//! segment the writer appends a [`DirectoryEntry`] summarizing it: the
//! smallest and largest [`RunEvent`] it holds, how many events and run
//! headers it holds, whether they were in order, and where the segment's
//! detailed index lives. Segment entries are chained backwards through
//! their previous-link. One more entry, the **aggregate**, is written when
//! the session starts and rewritten in place as segments are merged into
//! it, so that it always summarizes the whole file. Its previous-link
//! points at the first segment entry and its next-link at the most recent.
//!
//! ```text
//! | aggregate | ...events... | entry 1 | ...events... | entry 2 | ... | entry N |
//!      |  \__________previous__/  ^_____previous______/       ^           |
//!       \_____________________________next_________________________________/
//! ```
//!
//! Readers open the aggregate, walk the chain from the most recent entry
//! back to the first, and then binary-search it when the aggregate says all
//! segments were written in key order.
//!
//! ## Example
//!
//! ```rust
//! use lcio_access::{DirectoryConfig, DirectoryReader, DirectoryWriter, RunEvent, SegmentSummary};
//! use lcio_sio::{RecordReader, RecordWriter};
//! use lcio_storage::InMemoryBackend;
//!
//! let writer = RecordWriter::new(InMemoryBackend::new());
//! let mut directory = DirectoryWriter::create(writer, DirectoryConfig::default()).unwrap();
//!
//! let mut segment = SegmentSummary::new(0);
//! segment.add_event(RunEvent::new(1, 0));
//! segment.add_event(RunEvent::new(1, 9));
//! directory.append_segment(&segment).unwrap();
//!
//! let aggregate_location = directory.aggregate_location();
//! let backend = directory.finish().unwrap().into_inner();
//!
//! let reader = DirectoryReader::open(
//!     RecordReader::new(backend),
//!     aggregate_location,
//!     DirectoryConfig::default(),
//! )
//! .unwrap();
//! assert!(reader.find(RunEvent::new(1, 5)).is_some());
//! assert!(reader.find(RunEvent::new(2, 0)).is_none());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entry;
mod error;
mod reader;
mod run_event;
mod segment;
mod writer;

pub use config::DirectoryConfig;
pub use entry::{DirectoryEntry, ENTRY_PAYLOAD_LEN, RANDOM_ACCESS_NAME, RANDOM_ACCESS_VERSION};
pub use error::{AccessError, AccessResult};
pub use reader::DirectoryReader;
pub use run_event::{KeyPosition, KeyRange, RunEvent};
pub use segment::{SegmentIndex, SegmentSummary};
pub use writer::DirectoryWriter;
