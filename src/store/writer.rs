//! Write side of the array store file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use super::format::{StoreHeader, HEADER_SIZE};
use crate::util::Result;

/// Output stream for writing store data.
pub struct StoreWriter {
    writer: BufWriter<File>,
}

impl StoreWriter {
    /// Create a new store file, writing an empty header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut stream = Self {
            writer: BufWriter::with_capacity(1024 * 1024, file),
        };
        stream.write_bytes(&StoreHeader::new(true, 0).encode())?;
        stream.flush()?;
        Ok(stream)
    }

    /// Open an existing store file for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let mut stream = Self {
            writer: BufWriter::with_capacity(1024 * 1024, file),
        };
        stream.seek_end()?;
        Ok(stream)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Seek to a position and return it.
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.writer.seek(SeekFrom::Start(pos))?)
    }

    /// Seek to end and return the position.
    pub fn seek_end(&mut self) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.writer.seek(SeekFrom::End(0))?)
    }

    /// Rewrite the header in place, leaving the stream at the end of file.
    pub fn patch_header(&mut self, header: &StoreHeader) -> Result<()> {
        self.seek(0)?;
        let bytes = header.encode();
        debug_assert_eq!(bytes.len(), HEADER_SIZE);
        self.write_bytes(&bytes)?;
        self.seek_end()?;
        Ok(())
    }

    /// Flush the buffer to the OS.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and sync file contents to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }
}
