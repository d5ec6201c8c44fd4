//! Search functionality.
//!
//! [`Finder`] searches a [`ByteStore`] for a needle, wrapping around to the
//! start of the file when nothing is found between the start position and
//! the end.

use crate::store::{ByteStore, StoreError};

/// Substring search over a byte store.
pub struct Finder<'a> {
    store: &'a dyn ByteStore,
}

impl<'a> Finder<'a> {
    pub fn new(store: &'a dyn ByteStore) -> Self {
        Self { store }
    }

    /// First match lying entirely inside `[start, end)`.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the store.
    pub fn find(&self, needle: &[u8], start: u64, end: u64) -> Result<Option<u64>, StoreError> {
        self.store.find(needle, start, end)
    }

    /// Search `[start, size)`, then wrap to `[0, start + needle.len() - 1)`.
    ///
    /// The second bound lets a match that begins just before `start` be found
    /// again from the top. An empty needle never matches.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the store.
    pub fn wrapfind(&self, needle: &[u8], start: u64) -> Result<Option<u64>, StoreError> {
        if needle.is_empty() {
            return Ok(None);
        }
        let size = self.store.size();
        if start < size
            && let Some(hit) = self.find(needle, start, size)?
        {
            return Ok(Some(hit));
        }
        let wrap_end = start
            .saturating_add(needle.len() as u64 - 1)
            .min(size);
        self.find(needle, 0, wrap_end)
    }
}
