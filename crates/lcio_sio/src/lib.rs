//! # LCIO SIO
//!
//! Record and block framing for LCIO event files.
//!
//! An event file is a flat sequence of **records**. Each record carries a
//! name, an options word and one or more **blocks**; each block carries a
//! name, a `(major, minor)` version and a payload of big-endian primitives.
//! Records are addressed by their absolute offset in the file, which is how
//! the random-access directory links records together.
//!
//! ## Record Format
//!
//! ```text
//! | header_len (4) | 0xABADCAFE (4) | options (4) | payload_len (4) | name_len (4) | name (pad 4) |
//! | block ... |
//! ```
//!
//! ## Block Format
//!
//! ```text
//! | block_len (4) | 0xDEADBEEF (4) | major << 16 | minor (4) | name_len (4) | name (pad 4) | data (pad 4) |
//! ```
//!
//! ## Rewrites
//!
//! A record may be rewritten in place with [`RecordWriter::rewrite_record`]
//! as long as the new encoding has the same name and exactly the same length.
//!
//! ## Example
//!
//! ```rust
//! use lcio_sio::{RecordBuilder, RecordOptions, RecordReader, RecordWriter, Version};
//! use lcio_storage::InMemoryBackend;
//!
//! let mut record = RecordBuilder::new("Demo", RecordOptions::NONE);
//! record
//!     .create_block("Demo", Version::new(1, 0))
//!     .write_i32(7)
//!     .pad(8)
//!     .write_i64(-1);
//!
//! let mut writer = RecordWriter::new(InMemoryBackend::new());
//! let offset = writer.create_record(&record).unwrap();
//!
//! let reader = RecordReader::new(writer.into_inner());
//! let stored = reader.read_record(offset).unwrap();
//! let mut data = stored.block().unwrap().reader();
//! assert_eq!(data.read_i32().unwrap(), 7);
//! data.pad(8).unwrap();
//! assert_eq!(data.read_i64().unwrap(), -1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod block;
mod error;
mod reader;
mod record;
mod writer;

pub use block::{Block, BlockReader, BlockWriter, Version, BLOCK_MARKER};
pub use error::{SioError, SioResult};
pub use reader::{RecordIter, RecordReader};
pub use record::{Record, RecordBuilder, RecordOptions, MAX_NAME_LEN, RECORD_MARKER};
pub use writer::RecordWriter;

/// Rounds `len` up to the 4-byte boundary used for names and payloads.
pub(crate) fn padded4(len: usize) -> usize {
    len.next_multiple_of(4)
}
