//! User-toggled byte offsets for quick navigation.

/// A sorted set of marked byte offsets.
///
/// # Example
///
/// ```
/// use hexless::marks::MarkSet;
///
/// let mut marks = MarkSet::new();
/// marks.toggle(20);
/// marks.toggle(5);
/// assert_eq!(marks.next(20), 5);
/// assert_eq!(marks.prev(5), 20);
/// assert_eq!(marks.range(0, 10), &[5]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkSet {
    marks: Vec<u64>,
}

impl MarkSet {
    pub const fn new() -> Self {
        Self { marks: Vec::new() }
    }

    /// Add `x` if absent, remove it if present. Returns whether `x` is now marked.
    pub fn toggle(&mut self, x: u64) -> bool {
        match self.marks.binary_search(&x) {
            Ok(idx) => {
                self.marks.remove(idx);
                false
            }
            Err(idx) => {
                self.marks.insert(idx, x);
                true
            }
        }
    }

    /// Marks `m` with `lo <= m < hi`, ascending.
    pub fn range(&self, lo: u64, hi: u64) -> &[u64] {
        let start = self.marks.partition_point(|&m| m < lo);
        let end = self.marks.partition_point(|&m| m < hi).max(start);
        &self.marks[start..end]
    }

    /// Smallest mark after `x`, wrapping to the first. `x` itself when empty.
    pub fn next(&self, x: u64) -> u64 {
        if self.marks.is_empty() {
            return x;
        }
        let idx = self.marks.partition_point(|&m| m <= x);
        self.marks[idx % self.marks.len()]
    }

    /// Largest mark before `x`, wrapping to the last. `x` itself when empty.
    pub fn prev(&self, x: u64) -> u64 {
        match self.marks.partition_point(|&m| m < x) {
            _ if self.marks.is_empty() => x,
            0 => self.marks[self.marks.len() - 1],
            idx => self.marks[idx - 1],
        }
    }

    pub fn contains(&self, x: u64) -> bool {
        self.marks.binary_search(&x).is_ok()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.marks.iter().copied()
    }
}
