//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Byte grid layout, scroll position and hit testing
//! - rendering of the rows, scrollbar, status line and help overlay

pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::render;
pub use status::fit_status;
