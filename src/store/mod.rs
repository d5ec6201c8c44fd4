//! Random-access byte storage over a single file.
//!
//! [`ByteStore`] is the uniform interface the rest of the crate talks to.
//! Two implementations exist:
//! - [`MappedStore`]: the whole file is memory-mapped
//! - [`BufferedStore`]: explicit seek + read/write on the file handle, used
//!   whenever mapping is not possible
//!
//! [`open`] tries the mapped variant first and transparently falls back.

mod buffered;
mod mapped;

pub use buffered::{BufferedStore, DEFAULT_CHUNK_SIZE};
pub use mapped::{MappedStore, Mapping};

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced by a [`ByteStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{len} bytes at {pos:#x} run past the end of the file ({size:#x} bytes)")]
    OutOfRange { pos: u64, len: usize, size: u64 },
    #[error("file is not writable")]
    NotWritable,
    #[error("store is closed")]
    Closed,
    #[error("cannot map file: {0}")]
    Unmappable(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Which backend is serving the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mapped,
    Buffered,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapped => f.write_str("mmap"),
            Self::Buffered => f.write_str("buffered"),
        }
    }
}

/// Random access to the bytes of one file.
///
/// The size is fixed for the lifetime of the store: nothing here grows or
/// shrinks the file.
pub trait ByteStore {
    /// Total size of the file in bytes.
    fn size(&self) -> u64;

    /// Whether [`ByteStore::set`] is permitted.
    fn is_writable(&self) -> bool;

    /// Which backend this is.
    fn kind(&self) -> StoreKind;

    /// Read up to `n` bytes starting at `pos`.
    ///
    /// The result is truncated at end of file and empty when `pos` is at or
    /// past the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the underlying read fails.
    fn get(&self, pos: u64, n: usize) -> Result<Vec<u8>, StoreError>;

    /// Overwrite `buf.len()` bytes at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotWritable`] on a read-only store and
    /// [`StoreError::OutOfRange`] if the write would run past the end.
    fn set(&mut self, pos: u64, buf: &[u8]) -> Result<(), StoreError>;

    /// Offset of the first occurrence of `needle` lying entirely inside
    /// `[start, end)`.
    ///
    /// An empty needle matches at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or reading fails.
    fn find(&self, needle: &[u8], start: u64, end: u64) -> Result<Option<u64>, StoreError>;

    /// Flush pending writes and release the mapping or file handle.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn close(&mut self) -> Result<(), StoreError>;
}

/// How to open a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Open read-write instead of read-only.
    pub writable: bool,
    /// Attempt a memory mapping before falling back to buffered I/O.
    pub mmap: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            writable: false,
            mmap: true,
        }
    }
}

/// A store together with how it came to be.
pub struct OpenedStore {
    pub store: Box<dyn ByteStore>,
    /// Why mapping failed, when the buffered fallback is active because of it.
    pub fallback_reason: Option<String>,
}

impl fmt::Debug for OpenedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedStore")
            .field("kind", &self.store.kind())
            .field("size", &self.store.size())
            .field("fallback_reason", &self.fallback_reason)
            .finish()
    }
}

impl OpenedStore {
    pub fn kind(&self) -> StoreKind {
        self.store.kind()
    }
}

/// Open `path`, preferring a memory mapping.
///
/// Mapping failures are logged and answered with a [`BufferedStore`] over the
/// same handle; only failing to open the file at all is an error.
///
/// # Errors
///
/// Returns [`StoreError::Open`] if the file cannot be opened or its size
/// cannot be determined.
pub fn open(path: &Path, options: OpenOptions) -> Result<OpenedStore, StoreError> {
    let open_err = |source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::options()
        .read(true)
        .write(options.writable)
        .open(path)
        .map_err(open_err)?;
    let size = file.metadata().map_err(open_err)?.len();

    let fallback_reason = if options.mmap {
        match MappedStore::map(&file, size, options.writable) {
            Ok(mapping) => {
                tracing::debug!(path = %path.display(), size, "opened with mmap");
                return Ok(OpenedStore {
                    store: Box::new(MappedStore::new(file, mapping, options.writable)),
                    fallback_reason: None,
                });
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to map file, using buffered fallback"
                );
                Some(err.to_string())
            }
        }
    } else {
        None
    };

    tracing::debug!(path = %path.display(), size, "opened with buffered I/O");
    Ok(OpenedStore {
        store: Box::new(BufferedStore::new(file, size, options.writable)),
        fallback_reason,
    })
}

/// Check that `len` bytes at `pos` fit inside a file of `size` bytes.
pub(crate) fn check_range(pos: u64, len: usize, size: u64) -> Result<(), StoreError> {
    let fits = u64::try_from(len)
        .ok()
        .and_then(|len| pos.checked_add(len))
        .is_some_and(|end| end <= size);
    if fits {
        Ok(())
    } else {
        Err(StoreError::OutOfRange { pos, len, size })
    }
}
