//! Viewport management for scrolling.
//!
//! The [`Viewport`] maps byte offsets onto the screen grid and keeps the
//! cursor's line on screen, reporting which rows need repainting after each
//! move.

use std::ops::Range;

/// Separator between the address and the hex cells.
const ADDR_GAP: u64 = 3;
/// Separator between the hex cells and the ASCII pane.
const PANE_GAP: u64 = 2;
/// Screen cells used per byte: "xx " in the hex pane plus one ASCII cell.
const CELLS_PER_BYTE: u64 = 4;
/// Columns that are not per-byte: both gaps, the scrollbar and one spare cell.
const FIXED_CELLS: u64 = ADDR_GAP + PANE_GAP + 2;
/// Widest fixed layout: every byte of a row fits in the widest terminal.
pub const MAX_COLUMNS: u64 = u16::MAX as u64 / CELLS_PER_BYTE;

/// What has to be repainted after the viewport changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redraw {
    /// Nothing changed on screen.
    None,
    /// No scroll; only the rows holding the old and new cursor change.
    Cursor { old_row: Option<usize>, new_row: usize },
    /// The window scrolled.
    ///
    /// `shift` is the number of lines the previously drawn rows move down
    /// (negative: up), when they can be reused at all. `rows` are the newly
    /// exposed screen rows that must be drawn from scratch.
    Scroll {
        shift: Option<i64>,
        rows: Range<usize>,
    },
    /// The content of these screen rows changed in place.
    Rows(Range<usize>),
    /// Every row must be drawn.
    Full,
}

impl Redraw {
    /// Combine two plans for the same frame.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::None, plan) | (plan, Self::None) => plan,
            (a, b) if a == b => a,
            _ => Self::Full,
        }
    }
}

/// Which half of a row a screen position falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Hex(u64),
    Ascii(u64),
    /// Click on the scrollbar, mapped proportionally onto the file.
    Scrollbar(u64),
}

/// Maps a file onto a grid of `columns` bytes per line.
///
/// # Example
///
/// ```
/// use hexless::ui::viewport::{Redraw, Viewport};
///
/// // 1000 bytes, 16 per line, 10 visible lines
/// let mut vp = Viewport::new(1000, 80, 11, Some(16));
/// assert_eq!(vp.total_lines(), 63);
///
/// // moving past the bottom scrolls just far enough
/// assert!(matches!(vp.follow_cursor(0, 16 * 12), Redraw::Scroll { .. }));
/// assert_eq!(vp.top_line(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    size: u64,
    width: u16,
    height: u16,
    fixed_columns: Option<u64>,
    columns: u64,
    addr_width: u64,
    total_lines: u64,
    top_line: u64,
}

impl Viewport {
    /// Create a viewport for a file of `size` bytes on a `width` × `height`
    /// terminal. The last terminal row is reserved for the status line.
    pub fn new(size: u64, width: u16, height: u16, fixed_columns: Option<u64>) -> Self {
        let mut vp = Self {
            size,
            width,
            height,
            fixed_columns: clamp_columns(fixed_columns),
            columns: 1,
            addr_width: address_width(size),
            total_lines: 1,
            top_line: 0,
        };
        vp.recompute();
        vp
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Terminal height including the status line.
    pub const fn terminal_height(&self) -> u16 {
        self.height
    }

    /// Number of data rows.
    pub fn rows(&self) -> u64 {
        u64::from(self.height.saturating_sub(1).max(1))
    }

    pub const fn columns(&self) -> u64 {
        self.columns
    }

    pub const fn fixed_columns(&self) -> Option<u64> {
        self.fixed_columns
    }

    /// Number of hex digits used for addresses.
    pub const fn address_width(&self) -> u64 {
        self.addr_width
    }

    pub const fn total_lines(&self) -> u64 {
        self.total_lines
    }

    pub const fn top_line(&self) -> u64 {
        self.top_line
    }

    /// Largest valid `top_line`.
    pub fn max_top_line(&self) -> u64 {
        self.total_lines.saturating_sub(self.rows())
    }

    /// Lines currently on screen (may extend past the last line of the file).
    pub fn visible_lines(&self) -> Range<u64> {
        self.top_line..self.top_line + self.rows()
    }

    /// Bytes covered by the visible lines, clamped to the file.
    pub fn visible_span(&self) -> Range<u64> {
        let lines = self.visible_lines();
        let start = lines.start.saturating_mul(self.columns).min(self.size);
        let end = lines.end.saturating_mul(self.columns).min(self.size);
        start..end
    }

    /// `(line, column)` of a byte offset.
    pub const fn locate(&self, offset: u64) -> (u64, u64) {
        (offset / self.columns, offset % self.columns)
    }

    pub const fn offset_at(&self, line: u64, column: u64) -> u64 {
        line.saturating_mul(self.columns).saturating_add(column)
    }

    /// Screen row showing `line`, if it is visible.
    pub fn screen_row(&self, line: u64) -> Option<usize> {
        if self.visible_lines().contains(&line) {
            usize::try_from(line - self.top_line).ok()
        } else {
            None
        }
    }

    /// First byte shown on screen row `row`.
    pub fn row_offset(&self, row: usize) -> u64 {
        self.offset_at(self.top_line.saturating_add(row as u64), 0)
    }

    /// Screen column of the hex cell for byte column `column`.
    pub const fn hex_x(&self, column: u64) -> u64 {
        (self.addr_width + ADDR_GAP).saturating_add(column.saturating_mul(3))
    }

    /// Screen column of the ASCII cell for byte column `column`.
    pub const fn ascii_x(&self, column: u64) -> u64 {
        self.hex_x(self.columns)
            .saturating_add(PANE_GAP)
            .saturating_add(column)
    }

    /// Change the terminal size and bring the cursor back on screen.
    pub fn resize(&mut self, width: u16, height: u16, cursor: u64) -> Redraw {
        self.width = width;
        self.height = height;
        self.recompute();
        self.place_top(cursor);
        Redraw::Full
    }

    /// Use a fixed number of columns, or `None` to fit the terminal width.
    ///
    /// Widths above [`MAX_COLUMNS`] are clamped.
    pub fn set_fixed_columns(&mut self, columns: Option<u64>, cursor: u64) -> Redraw {
        self.fixed_columns = clamp_columns(columns);
        self.recompute();
        self.place_top(cursor);
        Redraw::Full
    }

    /// Scroll so that `new_cursor` is visible, by as little as possible.
    ///
    /// Leaving the window at the top puts the cursor on the first row;
    /// leaving it at the bottom puts it on the last row.
    pub fn follow_cursor(&mut self, old_cursor: u64, new_cursor: u64) -> Redraw {
        let (line, _) = self.locate(new_cursor);
        if let Some(new_row) = self.screen_row(line) {
            let old_row = self.screen_row(self.locate(old_cursor).0);
            if old_cursor == new_cursor {
                return Redraw::None;
            }
            return Redraw::Cursor { old_row, new_row };
        }

        let rows = i64::try_from(self.rows()).unwrap_or(i64::MAX);
        let delta = if line < self.top_line {
            i64::try_from(self.top_line - line).unwrap_or(i64::MAX)
        } else {
            let below = line - self.top_line - (self.rows() - 1);
            i64::try_from(below).map_or(i64::MIN, |below| -below)
        };
        self.top_line = if delta > 0 {
            line
        } else {
            line + 1 - self.rows()
        };

        let shift = (delta.abs() < rows).then_some(delta);
        let exposed = if delta > 0 {
            0..delta.min(rows)
        } else {
            (rows + delta).max(0)..rows
        };
        Redraw::Scroll {
            shift,
            rows: to_usize(exposed.start)..to_usize(exposed.end),
        }
    }

    /// Scrollbar thumb as `(first row, length)` in data rows.
    pub fn scrollbar_thumb(&self) -> (u64, u64) {
        let h = self.rows();
        let len = (h * h / self.total_lines.max(1)).clamp(1, h);
        let track = h - len;
        let span = self.total_lines.saturating_sub(h).max(1);
        // round(top * track / span) in integers
        let (top, track_wide, span) = (
            u128::from(self.top_line),
            u128::from(track),
            u128::from(span),
        );
        let start = (top * track_wide * 2 + span) / (span * 2);
        (u64::try_from(start).unwrap_or(track).min(track), len)
    }

    /// Translate a click at screen cell (`x`, `y`) into a byte offset.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<Hit> {
        let (x, y) = (u64::from(x), u64::from(y));
        if y >= self.rows() || self.size == 0 {
            return None;
        }
        if x + 1 == u64::from(self.width) {
            let last_row = (self.rows() - 1).max(1);
            let offset = u128::from(self.size - 1) * u128::from(y) / u128::from(last_row);
            return Some(Hit::Scrollbar(u64::try_from(offset).unwrap_or(self.size - 1)));
        }
        let line = self.top_line.saturating_add(y);
        let hex_start = self.hex_x(0);
        let ascii_start = self.ascii_x(0);
        let hit = if (hex_start..self.hex_x(self.columns)).contains(&x) {
            Hit::Hex(self.offset_at(line, (x - hex_start) / 3))
        } else if (ascii_start..self.ascii_x(self.columns)).contains(&x) {
            Hit::Ascii(self.offset_at(line, x - ascii_start))
        } else {
            return None;
        };
        Some(hit)
    }

    fn recompute(&mut self) {
        self.columns = self.fixed_columns.unwrap_or_else(|| {
            let available = u64::from(self.width).saturating_sub(FIXED_CELLS + self.addr_width);
            (available / CELLS_PER_BYTE).max(1)
        });
        self.total_lines = self.size.div_ceil(self.columns).max(1);
        self.top_line = self.top_line.min(self.max_top_line());
    }

    fn place_top(&mut self, cursor: u64) {
        let (line, _) = self.locate(cursor);
        self.top_line = line.min(self.max_top_line());
    }
}

fn clamp_columns(columns: Option<u64>) -> Option<u64> {
    columns.filter(|&c| c > 0).map(|c| c.min(MAX_COLUMNS))
}

/// Hex digits needed for the largest offset, at least four.
fn address_width(size: u64) -> u64 {
    let last = size.saturating_sub(1);
    let digits = u64::from((u64::BITS - last.leading_zeros()).div_ceil(4));
    digits.max(4)
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
