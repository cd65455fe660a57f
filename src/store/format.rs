//! Array store file format constants and block layout.
//!
//! ```text
//! header   [5 magic "PRARR"][u8 frozen][u16 version][u64 index pos]
//! block    [u64 payload bytes][u8 pod][u8 rank][6 pad][rank x u64 dims][payload]
//! index    [u64 count][count x (16 byte uuid, u64 block pos)]
//! ```
//!
//! All integers are little-endian. The index is appended on flush and the
//! header patched to point at it.

use byteorder::{ByteOrder, LittleEndian};
use uuid::Uuid;

use crate::util::{Error, PlainOldDataType, Result, Shape};

/// Magic bytes at the start of an array store file.
pub const STORE_MAGIC: &[u8; 5] = b"PRARR";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Offset of the frozen flag in the header.
pub const FROZEN_OFFSET: usize = 5;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 6;

/// Offset of the index position in the header.
pub const INDEX_POS_OFFSET: usize = 8;

/// Current store format version.
pub const CURRENT_VERSION: u16 = 1;

/// Frozen flag value when the index matches the blocks on disk.
pub const FROZEN_FLAG: u8 = 0xFF;

/// Frozen flag value while blocks have been written since the last flush.
pub const NOT_FROZEN_FLAG: u8 = 0x00;

/// Fixed part of a block header, before the dims.
pub const BLOCK_FIXED_SIZE: usize = 16;

/// Size of one index entry.
pub const INDEX_ENTRY_SIZE: usize = 24;

/// Highest supported array rank.
pub const MAX_RANK: usize = 16;

/// Parsed file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreHeader {
    pub frozen: bool,
    pub version: u16,
    pub index_pos: u64,
}

impl StoreHeader {
    pub fn new(frozen: bool, index_pos: u64) -> Self {
        Self {
            frozen,
            version: CURRENT_VERSION,
            index_pos,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..5].copy_from_slice(STORE_MAGIC);
        buf[FROZEN_OFFSET] = if self.frozen { FROZEN_FLAG } else { NOT_FROZEN_FLAG };
        LittleEndian::write_u16(&mut buf[VERSION_OFFSET..], self.version);
        LittleEndian::write_u64(&mut buf[INDEX_POS_OFFSET..], self.index_pos);
        buf
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::UnexpectedEof(data.len() as u64));
        }
        if &data[0..5] != STORE_MAGIC {
            return Err(Error::InvalidMagic);
        }
        let version = LittleEndian::read_u16(&data[VERSION_OFFSET..]);
        if version != CURRENT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(Self {
            frozen: data[FROZEN_OFFSET] == FROZEN_FLAG,
            version,
            index_pos: LittleEndian::read_u64(&data[INDEX_POS_OFFSET..]),
        })
    }
}

/// Location and layout of one stored dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Position of the block header.
    pub pos: u64,
    pub pod: PlainOldDataType,
    pub shape: Shape,
}

impl BlockInfo {
    /// Size of the block header including dims.
    pub fn header_len(&self) -> u64 {
        (BLOCK_FIXED_SIZE + 8 * self.shape.rank()) as u64
    }

    /// Position of the first payload byte.
    pub fn payload_pos(&self) -> u64 {
        self.pos + self.header_len()
    }

    /// Payload size in bytes.
    pub fn payload_len(&self) -> u64 {
        (self.shape.num_elements() * self.pod.num_bytes()) as u64
    }

    /// True if an array of this pod and shape can be rewritten in place.
    pub fn same_layout(&self, pod: PlainOldDataType, shape: &Shape) -> bool {
        self.pod == pod && &self.shape == shape
    }

    /// Encode the block header (without payload).
    pub fn encode_header(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.header_len() as usize];
        LittleEndian::write_u64(&mut buf[0..8], self.payload_len());
        buf[8] = self.pod as u8;
        buf[9] = self.shape.rank() as u8;
        for (i, d) in self.shape.sizes().iter().enumerate() {
            let at = BLOCK_FIXED_SIZE + 8 * i;
            LittleEndian::write_u64(&mut buf[at..at + 8], *d as u64);
        }
        buf
    }

    /// Decode the fixed part of a block header; returns (payload len, pod, rank).
    pub fn parse_fixed(data: &[u8]) -> Result<(u64, PlainOldDataType, usize)> {
        if data.len() < BLOCK_FIXED_SIZE {
            return Err(Error::UnexpectedEof(data.len() as u64));
        }
        let payload = LittleEndian::read_u64(&data[0..8]);
        let pod = PlainOldDataType::from_u8(data[8])
            .ok_or_else(|| Error::invalid(format!("unknown pod tag {}", data[8])))?;
        let rank = data[9] as usize;
        if rank > MAX_RANK {
            return Err(Error::invalid(format!("rank {} exceeds {}", rank, MAX_RANK)));
        }
        Ok((payload, pod, rank))
    }
}

/// Encode the index for the given entries.
pub fn encode_index<'a>(entries: impl ExactSizeIterator<Item = (&'a Uuid, &'a BlockInfo)>) -> Vec<u8> {
    let mut buf = vec![0u8; 8 + entries.len() * INDEX_ENTRY_SIZE];
    LittleEndian::write_u64(&mut buf[0..8], entries.len() as u64);
    for (i, (key, block)) in entries.enumerate() {
        let at = 8 + i * INDEX_ENTRY_SIZE;
        buf[at..at + 16].copy_from_slice(key.as_bytes());
        LittleEndian::write_u64(&mut buf[at + 16..at + 24], block.pos);
    }
    buf
}

/// Decode one index entry.
pub fn parse_index_entry(data: &[u8]) -> Result<(Uuid, u64)> {
    if data.len() < INDEX_ENTRY_SIZE {
        return Err(Error::UnexpectedEof(data.len() as u64));
    }
    let key = Uuid::from_slice(&data[0..16]).map_err(|e| Error::invalid(e.to_string()))?;
    Ok((key, LittleEndian::read_u64(&data[16..24])))
}
