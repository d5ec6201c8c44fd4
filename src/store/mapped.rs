use std::fs::File;
use std::ops::Deref;

use memmap2::{Mmap, MmapMut};

use super::{ByteStore, StoreError, StoreKind, check_range};

/// The live mapping, read-only or writable depending on how the file was opened.
#[derive(Debug)]
pub enum Mapping {
    ReadOnly(Mmap),
    Writable(MmapMut),
}

impl Deref for Mapping {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::ReadOnly(map) => map,
            Self::Writable(map) => map,
        }
    }
}

/// A [`ByteStore`] over a memory mapping of the whole file.
#[derive(Debug)]
pub struct MappedStore {
    _file: File,
    map: Option<Mapping>,
    size: u64,
    writable: bool,
}

impl MappedStore {
    /// Map `file` (of `size` bytes) into memory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unmappable`] for empty files and files larger
    /// than the address space, or the OS error if `mmap` itself fails.
    #[allow(unsafe_code)]
    pub fn map(file: &File, size: u64, writable: bool) -> Result<Mapping, StoreError> {
        if size == 0 {
            return Err(StoreError::Unmappable("file is empty".to_string()));
        }
        if usize::try_from(size).is_err() {
            return Err(StoreError::Unmappable(format!(
                "{size} bytes exceed the address space"
            )));
        }
        // SAFETY:
        // - The mapping is owned by the store together with the file handle.
        // - Concurrent modification of the file by other processes is not
        //   supported; reads then observe whatever the OS shows.
        let mapping = if writable {
            Mapping::Writable(unsafe { MmapMut::map_mut(file)? })
        } else {
            Mapping::ReadOnly(unsafe { Mmap::map(file)? })
        };
        Ok(mapping)
    }

    /// Wrap an existing mapping produced by [`MappedStore::map`].
    pub fn new(file: File, map: Mapping, writable: bool) -> Self {
        Self {
            _file: file,
            size: map.len() as u64,
            map: Some(map),
            writable,
        }
    }

    fn bytes(&self) -> Result<&[u8], StoreError> {
        self.map.as_deref().ok_or(StoreError::Closed)
    }

    /// Clamp a byte offset to an index into the mapping.
    fn index(&self, pos: u64) -> usize {
        usize::try_from(pos.min(self.size)).unwrap_or(usize::MAX)
    }
}

impl ByteStore for MappedStore {
    fn size(&self) -> u64 {
        self.size
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Mapped
    }

    fn get(&self, pos: u64, n: usize) -> Result<Vec<u8>, StoreError> {
        let bytes = self.bytes()?;
        let start = self.index(pos);
        let end = start.saturating_add(n).min(bytes.len());
        Ok(bytes[start..end].to_vec())
    }

    fn set(&mut self, pos: u64, buf: &[u8]) -> Result<(), StoreError> {
        if !self.writable {
            return Err(StoreError::NotWritable);
        }
        check_range(pos, buf.len(), self.size)?;
        let start = self.index(pos);
        match self.map.as_mut() {
            Some(Mapping::Writable(map)) => {
                map[start..start + buf.len()].copy_from_slice(buf);
                Ok(())
            }
            Some(Mapping::ReadOnly(_)) => Err(StoreError::NotWritable),
            None => Err(StoreError::Closed),
        }
    }

    fn find(&self, needle: &[u8], start: u64, end: u64) -> Result<Option<u64>, StoreError> {
        let bytes = self.bytes()?;
        if needle.is_empty() {
            return Ok(Some(start));
        }
        let start_idx = self.index(start);
        let end_idx = self.index(end);
        if start_idx >= end_idx {
            return Ok(None);
        }
        Ok(memchr::memmem::find(&bytes[start_idx..end_idx], needle)
            .map(|hit| start + hit as u64))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if let Some(Mapping::Writable(map)) = &self.map {
            map.flush()?;
        }
        self.map = None;
        Ok(())
    }
}
