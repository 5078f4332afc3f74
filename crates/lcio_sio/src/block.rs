//! Blocks: named, versioned payloads inside a record.

use crate::error::{SioError, SioResult};
use crate::padded4;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

/// Marker word that opens every block.
pub const BLOCK_MARKER: u32 = 0xDEAD_BEEF;

/// block_len (4) + marker (4) + version (4) + name_len (4)
pub(crate) const BLOCK_HEADER_SIZE: usize = 16;

/// A block format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version; readers reject blocks with a major they don't know.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
}

impl Version {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Packs the version into its on-disk word.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        ((self.major as u32) << 16) | self.minor as u32
    }

    /// Unpacks a version from its on-disk word.
    #[must_use]
    pub const fn from_u32(word: u32) -> Self {
        Self {
            major: (word >> 16) as u16,
            minor: (word & 0xFFFF) as u16,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Accumulates the payload of one block.
///
/// Obtained from [`crate::RecordBuilder::create_block`]. All primitives are
/// written big-endian.
#[derive(Debug, Clone)]
pub struct BlockWriter {
    name: String,
    version: Version,
    data: BytesMut,
}

impl BlockWriter {
    pub(crate) fn new(name: String, version: Version) -> Self {
        Self {
            name,
            version,
            data: BytesMut::new(),
        }
    }

    /// Returns the block name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the block version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the number of payload bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes a 32-bit signed integer.
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.data.put_i32(value);
        self
    }

    /// Writes a 64-bit signed integer.
    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.data.put_i64(value);
        self
    }

    /// Writes a boolean as a 32-bit integer (1 or 0).
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_i32(i32::from(value))
    }

    /// Zero-fills the payload up to the next multiple of `align` bytes,
    /// counted from the start of the payload.
    pub fn pad(&mut self, align: usize) -> &mut Self {
        let len = self.data.len();
        self.data.put_bytes(0, len.next_multiple_of(align) - len);
        self
    }

    pub(crate) fn encoded_len(&self) -> usize {
        BLOCK_HEADER_SIZE + padded4(self.name.len()) + padded4(self.data.len())
    }

    pub(crate) fn encode_into(&self, buf: &mut BytesMut) {
        let name_pad = padded4(self.name.len()) - self.name.len();
        let data_pad = padded4(self.data.len()) - self.data.len();

        buf.put_u32(self.encoded_len() as u32);
        buf.put_u32(BLOCK_MARKER);
        buf.put_u32(self.version.as_u32());
        buf.put_u32(self.name.len() as u32);
        buf.put_slice(self.name.as_bytes());
        buf.put_bytes(0, name_pad);
        buf.put_slice(&self.data);
        buf.put_bytes(0, data_pad);
    }
}

/// A block read back from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    name: String,
    version: Version,
    data: Bytes,
}

impl Block {
    /// Returns the block name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the block version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the payload, including its trailing alignment bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a cursor over the payload.
    #[must_use]
    pub fn reader(&self) -> BlockReader<'_> {
        BlockReader {
            data: &self.data,
            pos: 0,
        }
    }

    /// Decodes one block from the front of `data`.
    ///
    /// Returns the block and the number of bytes it occupied. `offset` is
    /// the absolute offset of the enclosing record, used in errors.
    pub(crate) fn decode(data: &[u8], offset: u64) -> SioResult<(Self, usize)> {
        if data.len() < BLOCK_HEADER_SIZE {
            return Err(SioError::malformed(offset, "block header is cut short"));
        }

        let mut header = &data[..BLOCK_HEADER_SIZE];
        let block_len = header.get_u32() as usize;
        let marker = header.get_u32();
        let version = Version::from_u32(header.get_u32());
        let name_len = header.get_u32() as usize;

        if marker != BLOCK_MARKER {
            return Err(SioError::BadMarker {
                offset,
                expected: BLOCK_MARKER,
                found: marker,
            });
        }

        let name_end = BLOCK_HEADER_SIZE + padded4(name_len);
        if block_len < name_end || block_len > data.len() {
            return Err(SioError::malformed(
                offset,
                format!("block length {block_len} does not fit its record"),
            ));
        }

        let name = std::str::from_utf8(&data[BLOCK_HEADER_SIZE..BLOCK_HEADER_SIZE + name_len])
            .map_err(|_| SioError::InvalidName { offset })?
            .to_owned();

        let block = Self {
            name,
            version,
            data: Bytes::copy_from_slice(&data[name_end..block_len]),
        };
        Ok((block, block_len))
    }
}

/// A cursor over a block payload.
///
/// Every read checks the remaining length first and fails with
/// [`SioError::UnexpectedEof`] instead of panicking.
#[derive(Debug, Clone)]
pub struct BlockReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BlockReader<'a> {
    /// Returns the current position within the payload.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread payload bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> SioResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(SioError::UnexpectedEof {
                requested: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a 32-bit signed integer.
    pub fn read_i32(&mut self) -> SioResult<i32> {
        Ok(self.take(4)?.get_i32())
    }

    /// Reads a 64-bit signed integer.
    pub fn read_i64(&mut self) -> SioResult<i64> {
        Ok(self.take(8)?.get_i64())
    }

    /// Reads a boolean stored as a 32-bit integer; any nonzero value is true.
    pub fn read_bool(&mut self) -> SioResult<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Skips to the next multiple of `align` bytes, counted from the start
    /// of the payload. Mirrors [`BlockWriter::pad`].
    pub fn pad(&mut self, align: usize) -> SioResult<()> {
        let skip = self.pos.next_multiple_of(align) - self.pos;
        self.take(skip)?;
        Ok(())
    }
}
