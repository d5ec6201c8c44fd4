//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, Pane, Prompt, PromptKind, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    writable: bool,
    columns: Option<u64>,
    mmap: bool,
    ascii: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for the given file.
    pub const fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            writable: false,
            columns: None,
            mmap: true,
            ascii: false,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Open the file read-write.
    #[must_use]
    pub const fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Fix the number of bytes per line; `None` fits the terminal width.
    #[must_use]
    pub const fn with_columns(mut self, columns: Option<u64>) -> Self {
        self.columns = columns;
        self
    }

    /// Try a memory mapping before buffered I/O.
    #[must_use]
    pub const fn with_mmap(mut self, enabled: bool) -> Self {
        self.mmap = enabled;
        self
    }

    /// Start with the cursor in the ASCII pane.
    #[must_use]
    pub const fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

#[cfg(test)]
mod tests;
