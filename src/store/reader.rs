//! Read side of the array store file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
use parking_lot::RwLock;
use uuid::Uuid;

use super::format::*;
use crate::util::{Error, Result, Shape};

/// Input stream over a store file.
/// Supports both memory-mapped and buffered I/O modes.
pub struct StoreReader {
    inner: ReaderInner,
}

enum ReaderInner {
    /// Memory-mapped file, read-only stores only
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
    /// Plain file access; the file may grow while open
    File(Arc<RwLock<File>>),
}

impl StoreReader {
    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        if size < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(size));
        }

        #[cfg(feature = "mmap")]
        if use_mmap {
            // Safety: the mapping is only used for stores opened read-only.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            return Ok(Self {
                inner: ReaderInner::Mmap(mmap),
            });
        }
        #[cfg(not(feature = "mmap"))]
        let _ = use_mmap;

        Ok(Self {
            inner: ReaderInner::File(Arc::new(RwLock::new(file))),
        })
    }

    /// True if reads go through a memory map.
    pub fn is_mapped(&self) -> bool {
        match &self.inner {
            #[cfg(feature = "mmap")]
            ReaderInner::Mmap(_) => true,
            ReaderInner::File(_) => false,
        }
    }

    /// Current file size.
    pub fn size(&self) -> Result<u64> {
        match &self.inner {
            #[cfg(feature = "mmap")]
            ReaderInner::Mmap(mmap) => Ok(mmap.len() as u64),
            ReaderInner::File(file) => Ok(file.read().metadata()?.len()),
        }
    }

    pub fn header(&self) -> Result<StoreHeader> {
        let mut buf = [0u8; HEADER_SIZE];
        self.read_into(0, &mut buf)?;
        StoreHeader::parse(&buf)
    }

    /// Read bytes at a specific position.
    pub fn read_bytes(&self, pos: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_into(pos, &mut buf)?;
        Ok(buf)
    }

    /// Read bytes into an existing buffer.
    pub fn read_into(&self, pos: u64, buf: &mut [u8]) -> Result<()> {
        let end = pos + buf.len() as u64;
        if end > self.size()? {
            return Err(Error::UnexpectedEof(end));
        }

        match &self.inner {
            #[cfg(feature = "mmap")]
            ReaderInner::Mmap(mmap) => {
                buf.copy_from_slice(&mmap[pos as usize..end as usize]);
                Ok(())
            }
            ReaderInner::File(file) => {
                let mut f = file.write();
                f.seek(SeekFrom::Start(pos))?;
                f.read_exact(buf)?;
                Ok(())
            }
        }
    }

    pub fn read_u64(&self, pos: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_into(pos, &mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a block header at `pos`.
    pub fn read_block(&self, pos: u64) -> Result<BlockInfo> {
        let mut fixed = [0u8; BLOCK_FIXED_SIZE];
        self.read_into(pos, &mut fixed)?;
        let (payload, pod, rank) = BlockInfo::parse_fixed(&fixed)?;

        let dims = self.read_bytes(pos + BLOCK_FIXED_SIZE as u64, 8 * rank)?;
        let sizes: Vec<usize> = dims
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as usize)
            .collect();
        let block = BlockInfo {
            pos,
            pod,
            shape: Shape::from(sizes),
        };
        if block.payload_len() != payload {
            return Err(Error::invalid(format!(
                "block at {} declares {} payload bytes, layout needs {}",
                pos,
                payload,
                block.payload_len()
            )));
        }
        Ok(block)
    }

    /// Read the index the header points at. An index position of zero
    /// means the store has never been flushed.
    pub fn read_index(&self) -> Result<BTreeMap<Uuid, BlockInfo>> {
        let header = self.header()?;
        let mut index = BTreeMap::new();
        if header.index_pos == 0 {
            return Ok(index);
        }
        if !header.frozen {
            tracing::warn!("array store index may be stale: file was not flushed after last write");
        }

        let count = self.read_u64(header.index_pos)?;
        let entries = self.read_bytes(header.index_pos + 8, count as usize * INDEX_ENTRY_SIZE)?;
        for chunk in entries.chunks_exact(INDEX_ENTRY_SIZE) {
            let (key, pos) = parse_index_entry(chunk)?;
            index.insert(key, self.read_block(pos)?);
        }
        Ok(index)
    }
}
