//! Records: the addressable unit of an event file.

use crate::block::{Block, BlockWriter, Version};
use crate::error::{SioError, SioResult};
use crate::padded4;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Marker word that follows the header length of every record.
pub const RECORD_MARKER: u32 = 0xABAD_CAFE;

/// Longest record or block name accepted, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// header_len (4) + marker (4) + options (4) + payload_len (4) + name_len (4)
pub(crate) const RECORD_HEADER_SIZE: usize = 20;

/// Option bits stored in a record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordOptions(u32);

impl RecordOptions {
    /// No options set.
    pub const NONE: Self = Self(0);
    /// Record payload is compressed.
    pub const COMPRESSED: Self = Self(0x01);

    /// Creates options from the raw header word.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw header word.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Checks if the compressed bit is set.
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        self.0 & 0x01 != 0
    }
}

/// The fixed part of a record header plus its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordHeader {
    pub(crate) header_len: usize,
    pub(crate) options: RecordOptions,
    pub(crate) payload_len: usize,
    pub(crate) name: String,
}

impl RecordHeader {
    /// Total bytes the record occupies in the stream.
    pub(crate) fn total_len(&self) -> u64 {
        self.header_len as u64 + self.payload_len as u64
    }

    /// Parses the fixed 20-byte prefix.
    ///
    /// Returns `(header_len, options, payload_len, name_len)`.
    pub(crate) fn parse_prefix(
        prefix: &[u8],
        offset: u64,
    ) -> SioResult<(usize, RecordOptions, usize, usize)> {
        if prefix.len() < RECORD_HEADER_SIZE {
            return Err(SioError::malformed(offset, "record header is cut short"));
        }

        let mut buf = &prefix[..RECORD_HEADER_SIZE];
        let header_len = buf.get_u32() as usize;
        let marker = buf.get_u32();
        let options = RecordOptions::from_bits(buf.get_u32());
        let payload_len = buf.get_u32() as usize;
        let name_len = buf.get_u32() as usize;

        if marker != RECORD_MARKER {
            return Err(SioError::BadMarker {
                offset,
                expected: RECORD_MARKER,
                found: marker,
            });
        }

        if header_len != RECORD_HEADER_SIZE + padded4(name_len) {
            return Err(SioError::malformed(
                offset,
                format!("header length {header_len} disagrees with name length {name_len}"),
            ));
        }

        Ok((header_len, options, payload_len, name_len))
    }

    /// Parses a complete header (prefix and name).
    pub(crate) fn parse(data: &[u8], offset: u64) -> SioResult<Self> {
        let (header_len, options, payload_len, name_len) = Self::parse_prefix(data, offset)?;
        if data.len() < header_len {
            return Err(SioError::malformed(offset, "record name is cut short"));
        }

        let name = std::str::from_utf8(&data[RECORD_HEADER_SIZE..RECORD_HEADER_SIZE + name_len])
            .map_err(|_| SioError::InvalidName { offset })?
            .to_owned();

        Ok(Self {
            header_len,
            options,
            payload_len,
            name,
        })
    }
}

fn check_name(name: &str) -> SioResult<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(SioError::NameTooLong {
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Builds a record in memory before it is written or rewritten.
///
/// # Example
///
/// ```rust
/// use lcio_sio::{RecordBuilder, RecordOptions, Version};
///
/// let mut record = RecordBuilder::new("Run", RecordOptions::NONE);
/// record.create_block("RunHeader", Version::new(1, 0)).write_i32(42);
/// assert_eq!(record.encode().unwrap().len(), record.encoded_len());
/// ```
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    name: String,
    options: RecordOptions,
    blocks: Vec<BlockWriter>,
}

impl RecordBuilder {
    /// Starts a record with the given name and options.
    pub fn new(name: impl Into<String>, options: RecordOptions) -> Self {
        Self {
            name: name.into(),
            options,
            blocks: Vec::new(),
        }
    }

    /// Returns the record name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the record options.
    #[must_use]
    pub fn options(&self) -> RecordOptions {
        self.options
    }

    /// Appends a new block and returns its writer.
    pub fn create_block(&mut self, name: impl Into<String>, version: Version) -> &mut BlockWriter {
        self.blocks.push(BlockWriter::new(name.into(), version));
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    /// Returns the blocks added so far.
    #[must_use]
    pub fn blocks(&self) -> &[BlockWriter] {
        &self.blocks
    }

    fn payload_len(&self) -> usize {
        self.blocks.iter().map(BlockWriter::encoded_len).sum()
    }

    /// Returns the number of bytes [`Self::encode`] will produce.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_SIZE + padded4(self.name.len()) + self.payload_len()
    }

    /// Encodes the record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A record or block name is longer than [`MAX_NAME_LEN`]
    /// - The record asks for compression, which is not supported
    /// - The record is too large for its 32-bit length fields
    pub fn encode(&self) -> SioResult<Bytes> {
        check_name(&self.name)?;
        for block in &self.blocks {
            check_name(block.name())?;
        }
        if self.options.is_compressed() {
            return Err(SioError::unsupported("compressed records"));
        }

        let payload_len = u32::try_from(self.payload_len())
            .map_err(|_| SioError::unsupported("record payload larger than 4 GiB"))?;
        let name_pad = padded4(self.name.len()) - self.name.len();

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u32((RECORD_HEADER_SIZE + padded4(self.name.len())) as u32);
        buf.put_u32(RECORD_MARKER);
        buf.put_u32(self.options.bits());
        buf.put_u32(payload_len);
        buf.put_u32(self.name.len() as u32);
        buf.put_slice(self.name.as_bytes());
        buf.put_bytes(0, name_pad);

        for block in &self.blocks {
            block.encode_into(&mut buf);
        }

        Ok(buf.freeze())
    }
}

/// A record read back from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    name: String,
    options: RecordOptions,
    blocks: Vec<Block>,
    encoded_len: u64,
}

impl Record {
    /// Returns the record name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the record options.
    #[must_use]
    pub fn options(&self) -> RecordOptions {
        self.options
    }

    /// Returns all blocks in stored order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the first block.
    ///
    /// # Errors
    ///
    /// Returns [`SioError::MissingBlock`] if the record has no blocks.
    pub fn block(&self) -> SioResult<&Block> {
        self.blocks.first().ok_or_else(|| SioError::MissingBlock {
            record: self.name.clone(),
        })
    }

    /// Returns the number of bytes the record occupies in the stream.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.encoded_len
    }

    /// Decodes a complete record. `offset` is used in errors only.
    pub(crate) fn decode(data: &[u8], offset: u64) -> SioResult<Self> {
        let header = RecordHeader::parse(data, offset)?;
        if header.options.is_compressed() {
            return Err(SioError::unsupported(format!(
                "compressed record {:?} at offset {offset}",
                header.name
            )));
        }

        let total = header.header_len + header.payload_len;
        if data.len() < total {
            return Err(SioError::malformed(offset, "record payload is cut short"));
        }

        let mut blocks = Vec::new();
        let mut pos = header.header_len;
        while pos < total {
            let (block, used) = Block::decode(&data[pos..total], offset)?;
            blocks.push(block);
            pos += used;
        }

        Ok(Self {
            name: header.name,
            options: header.options,
            blocks,
            encoded_len: total as u64,
        })
    }
}
