use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use super::{ByteStore, StoreError, StoreKind, check_range};

/// Bytes read per step when searching without a mapping.
pub const DEFAULT_CHUNK_SIZE: usize = 0x10000;

/// A [`ByteStore`] that seeks and reads the file handle on every access.
///
/// Used when the file cannot be mapped. Searches scan in bounded chunks so
/// the whole range never has to be in memory.
#[derive(Debug)]
pub struct BufferedStore {
    file: Option<File>,
    size: u64,
    writable: bool,
    chunk_size: usize,
}

impl BufferedStore {
    pub const fn new(file: File, size: u64, writable: bool) -> Self {
        Self {
            file: Some(file),
            size,
            writable,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a different search chunk size (at least one byte).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn handle(&self) -> Result<&File, StoreError> {
        self.file.as_ref().ok_or(StoreError::Closed)
    }

    /// Read up to `n` bytes at `pos`, stopping early only at end of file.
    fn read_at(&self, pos: u64, n: usize, out: &mut Vec<u8>) -> Result<usize, StoreError> {
        let mut handle = self.handle()?;
        handle.seek(SeekFrom::Start(pos))?;
        let read = handle.take(n as u64).read_to_end(out)?;
        Ok(read)
    }
}

impl ByteStore for BufferedStore {
    fn size(&self) -> u64 {
        self.size
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Buffered
    }

    fn get(&self, pos: u64, n: usize) -> Result<Vec<u8>, StoreError> {
        let mut out = Vec::new();
        if pos >= self.size {
            // still report a closed store
            self.handle()?;
            return Ok(out);
        }
        let n = n.min(usize::try_from(self.size - pos).unwrap_or(usize::MAX));
        out.reserve(n);
        self.read_at(pos, n, &mut out)?;
        Ok(out)
    }

    fn set(&mut self, pos: u64, buf: &[u8]) -> Result<(), StoreError> {
        if !self.writable {
            return Err(StoreError::NotWritable);
        }
        check_range(pos, buf.len(), self.size)?;
        let mut handle = self.handle()?;
        handle.seek(SeekFrom::Start(pos))?;
        handle.write_all(buf)?;
        Ok(())
    }

    fn find(&self, needle: &[u8], start: u64, end: u64) -> Result<Option<u64>, StoreError> {
        self.handle()?;
        if needle.is_empty() {
            return Ok(Some(start));
        }
        let end = end.min(self.size);
        let carry = needle.len() - 1;
        let mut pos = start;
        // Tail of the previous chunk followed by the current one, so matches
        // straddling a chunk boundary are still seen. Starts at `pos - window.len()`.
        let mut window: Vec<u8> = Vec::with_capacity(self.chunk_size + carry);
        while pos < end {
            let want = usize::try_from(end - pos)
                .unwrap_or(usize::MAX)
                .min(self.chunk_size);
            if window.len() > carry {
                window.drain(..window.len() - carry);
            }
            let read = self.read_at(pos, want, &mut window)?;
            if read == 0 {
                break;
            }
            pos += read as u64;
            if let Some(hit) = memchr::memmem::find(&window, needle) {
                return Ok(Some(pos - window.len() as u64 + hit as u64));
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if let Some(file) = self.file.take()
            && self.writable
        {
            file.sync_all()?;
        }
        Ok(())
    }
}
