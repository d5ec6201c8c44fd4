// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::StoreError)
    clippy::module_name_repetitions
)]

//! # Hexless
//!
//! A terminal hex viewer and editor for arbitrarily large files.
//!
//! Hexless shows a file as rows of hex bytes with an ASCII column and lets
//! you:
//! - Navigate by byte, line, page, expression or mouse
//! - Search for text or hex byte strings, wrapping around the end
//! - Mark offsets and jump between them
//! - Overwrite bytes in place (when opened with `--writable`)
//! - Decode the bytes under the cursor as integers and floats
//!
//! ## Architecture
//!
//! Hexless uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`store`]: Memory-mapped and buffered file access
//! - [`search`]: Wraparound byte search
//! - [`marks`]: Marked offsets
//! - [`ui`]: Terminal UI components
//! - [`expr`]: Offset expressions and search text
//! - [`hex`]: Hex parsing and scalar decoding
//! - [`config`]: Saved default flags

pub mod app;
pub mod config;
pub mod error;
pub mod expr;
pub mod hex;
pub mod marks;
pub mod search;
pub mod store;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::marks::MarkSet;
    pub use crate::search::Finder;
    pub use crate::store::{ByteStore, OpenOptions, open};
    pub use crate::ui::viewport::Viewport;
}
