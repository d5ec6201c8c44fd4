use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::CommandError;
use crate::expr::{self, Env};
use crate::hex::{self, Decoded, Endian};
use crate::marks::MarkSet;
use crate::search::Finder;
use crate::store::{ByteStore, OpenedStore, StoreError};
use crate::ui::viewport::{Redraw, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which half of a row the cursor is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Hex,
    Ascii,
}

impl Pane {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Hex => Self::Ascii,
            Self::Ascii => Self::Hex,
        }
    }
}

/// The command a prompt line feeds when submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Columns,
    GoToRelative,
    GoToAbsolute,
    SearchText,
    SearchHex,
    Overwrite,
    Evaluate,
}

impl PromptKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Columns => "set number of columns to: ",
            Self::GoToRelative => "go to relative offset: ",
            Self::GoToAbsolute => "go to absolute offset: ",
            Self::SearchText => "/",
            Self::SearchHex => "\\",
            Self::Overwrite => "overwrite with: ",
            Self::Evaluate => ":",
        }
    }
}

/// A line of text being typed on the status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The open file
    pub store: Box<dyn ByteStore>,
    /// Why the memory mapping was not used, if it failed
    pub fallback_reason: Option<String>,
    /// Path to the file being edited
    pub file_path: PathBuf,
    pub marks: MarkSet,
    /// Grid layout and scroll position
    pub viewport: Viewport,
    /// Byte offset under the cursor
    pub cursor: u64,
    pub pane: Pane,
    /// Bytes searched for by `n`
    pub needle: Vec<u8>,
    /// Line being typed, if any
    pub prompt: Option<Prompt>,
    toast: Option<Toast>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    pub help_scroll_offset: usize,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Rows the last update invalidated
    pub last_redraw: Redraw,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("kind", &self.store.kind())
            .field("size", &self.store.size())
            .field("cursor", &self.cursor)
            .field("pane", &self.pane)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model over an opened store.
    pub fn new(
        file_path: PathBuf,
        opened: OpenedStore,
        terminal_size: (u16, u16),
        columns: Option<u64>,
    ) -> Self {
        let OpenedStore {
            store,
            fallback_reason,
        } = opened;
        let viewport = Viewport::new(store.size(), terminal_size.0, terminal_size.1, columns);
        let mut model = Self {
            store,
            fallback_reason,
            file_path,
            marks: MarkSet::new(),
            viewport,
            cursor: 0,
            pane: Pane::Hex,
            needle: Vec::new(),
            prompt: None,
            toast: None,
            help_visible: false,
            help_scroll_offset: 0,
            should_quit: false,
            last_redraw: Redraw::Full,
            config_global_path: None,
            config_local_path: None,
        };
        if let Some(reason) = model.fallback_reason.clone() {
            model.show_toast(
                ToastLevel::Warning,
                format!("mmap failed ({reason}), using buffered I/O"),
            );
        } else {
            model.show_toast(ToastLevel::Info, "press [h] for help");
        }
        model
    }

    /// Start with the cursor in the given pane.
    #[must_use]
    pub const fn with_pane(mut self, pane: Pane) -> Self {
        self.pane = pane;
        self
    }

    pub fn size(&self) -> u64 {
        self.store.size()
    }

    /// Largest valid cursor position.
    pub fn last_offset(&self) -> u64 {
        self.store.size().saturating_sub(1)
    }

    fn env(&self) -> Env {
        Env {
            cursor: self.cursor,
            size: self.size(),
        }
    }

    /// Cursor moved by `delta`, clamped to the file.
    pub fn offset_by(&self, delta: i64) -> u64 {
        let moved = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta.unsigned_abs())
        };
        moved.min(self.last_offset())
    }

    pub fn move_by(&mut self, delta: i64) {
        self.cursor = self.offset_by(delta);
    }

    pub fn move_to(&mut self, offset: u64) {
        self.cursor = offset.min(self.last_offset());
    }

    /// Bytes per line, as a signed step.
    pub fn line_step(&self) -> i64 {
        i64::try_from(self.viewport.columns()).unwrap_or(i64::MAX)
    }

    pub fn page_step(&self) -> i64 {
        let rows = i64::try_from(self.viewport.rows()).unwrap_or(i64::MAX);
        self.line_step().saturating_mul(rows)
    }

    /// Mouse wheel step: a little over half a page.
    pub fn wheel_step(&self) -> i64 {
        let rows = i64::try_from(self.viewport.rows() / 2 + 1).unwrap_or(i64::MAX);
        self.line_step().saturating_mul(rows)
    }

    /// Set the number of columns; `0` returns to fitting the terminal.
    ///
    /// # Errors
    ///
    /// Fails if `input` does not evaluate or is negative. Widths too wide to
    /// draw are clamped with a warning.
    pub fn set_columns(&mut self, input: &str) -> Result<(), CommandError> {
        let value = expr::evaluate(input, self.env())?;
        let columns = u64::try_from(value).map_err(|_| CommandError::InvalidColumns(value))?;
        let fixed = (columns > 0).then_some(columns);
        tracing::debug!(?fixed, "set columns");
        self.last_redraw = self.viewport.set_fixed_columns(fixed, self.cursor);
        if let (Some(wanted), Some(applied)) = (fixed, self.viewport.fixed_columns())
            && applied < wanted
        {
            self.show_toast(
                ToastLevel::Warning,
                format!("columns limited to {applied}"),
            );
        }
        Ok(())
    }

    /// Move the cursor by the value of `input`.
    ///
    /// # Errors
    ///
    /// Fails if `input` does not evaluate.
    pub fn go_to_relative(&mut self, input: &str) -> Result<(), CommandError> {
        let delta = expr::evaluate(input, self.env())?;
        self.move_by(delta);
        Ok(())
    }

    /// Move the cursor to the value of `input`; negative values count back
    /// from the end of the file.
    ///
    /// # Errors
    ///
    /// Fails if `input` does not evaluate.
    pub fn go_to_absolute(&mut self, input: &str) -> Result<(), CommandError> {
        let value = expr::evaluate(input, self.env())?;
        let target = if value < 0 {
            self.size().saturating_sub(value.unsigned_abs())
        } else {
            value.unsigned_abs()
        };
        self.move_to(target);
        Ok(())
    }

    /// Toggle the mark under the cursor. Returns whether it is now marked.
    pub fn toggle_mark(&mut self) -> bool {
        let marked = self.marks.toggle(self.cursor);
        let (line, _) = self.viewport.locate(self.cursor);
        if let Some(row) = self.viewport.screen_row(line) {
            self.last_redraw = Redraw::Rows(row..row + 1);
        }
        marked
    }

    pub fn next_mark(&mut self) {
        self.cursor = self.marks.next(self.cursor);
    }

    pub fn prev_mark(&mut self) {
        self.cursor = self.marks.prev(self.cursor);
    }

    /// Search for `text` (with escapes) after the cursor.
    ///
    /// # Errors
    ///
    /// Fails on a malformed escape or a store error.
    pub fn search_text(&mut self, text: &str) -> Result<Option<u64>, CommandError> {
        self.needle = expr::parse_needle(text)?;
        self.search_next()
    }

    /// Search for the bytes spelled by `hex` after the cursor.
    ///
    /// # Errors
    ///
    /// Fails on malformed hex or a store error.
    pub fn search_hex(&mut self, hex: &str) -> Result<Option<u64>, CommandError> {
        self.needle = hex::parse_hex(hex)?;
        self.search_next()
    }

    /// Repeat the last search from just after the cursor, wrapping around.
    ///
    /// Moves the cursor and returns the offset when found.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    pub fn search_next(&mut self) -> Result<Option<u64>, CommandError> {
        let found =
            Finder::new(self.store.as_ref()).wrapfind(&self.needle, self.cursor.saturating_add(1))?;
        tracing::debug!(needle_len = self.needle.len(), ?found, "search");
        if let Some(pos) = found {
            self.cursor = pos;
        }
        Ok(found)
    }

    /// Overwrite bytes at the cursor with the bytes spelled by `hex`.
    ///
    /// Returns the number of bytes written. Nothing is written when parsing
    /// fails.
    ///
    /// # Errors
    ///
    /// Fails on a read-only store, malformed hex, or a write past the end.
    pub fn overwrite(&mut self, hex: &str) -> Result<usize, CommandError> {
        if !self.store.is_writable() {
            return Err(CommandError::NotWritable);
        }
        let bytes = hex::parse_hex(hex)?;
        self.store.set(self.cursor, &bytes)?;
        tracing::debug!(pos = self.cursor, len = bytes.len(), "overwrote bytes");
        let (line, _) = self.viewport.locate(self.cursor);
        if let Some(row) = self.viewport.screen_row(line) {
            let rows = usize::try_from(self.viewport.rows()).unwrap_or(usize::MAX);
            self.last_redraw = Redraw::Rows(row..rows);
        }
        Ok(bytes.len())
    }

    /// Reinterpret up to eight bytes at the cursor.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    pub fn decode(&self, endian: Endian) -> Result<Decoded, StoreError> {
        let bytes = self.store.get(self.cursor, 8)?;
        Ok(hex::decode(&bytes, endian))
    }

    /// Evaluate `input` as a calculator expression.
    ///
    /// # Errors
    ///
    /// Fails if `input` does not evaluate.
    pub fn evaluate(&self, input: &str) -> Result<i64, CommandError> {
        Ok(expr::evaluate(input, self.env())?)
    }

    /// Keep the cursor inside the file and on screen, recording what to repaint.
    pub(super) fn reconcile(&mut self, old_cursor: u64, pending: Redraw) {
        self.cursor = self.cursor.min(self.last_offset());
        let follow = self.viewport.follow_cursor(old_cursor, self.cursor);
        self.last_redraw = pending.merge(follow);
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn clear_toast(&mut self) {
        self.toast = None;
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
