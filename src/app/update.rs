use crate::app::Model;
use crate::app::model::{Pane, Prompt, PromptKind, ToastLevel};
use crate::error::CommandError;
use crate::hex::Endian;
use crate::ui::viewport::Redraw;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Move the cursor by n bytes
    MoveBy(i64),
    /// Move the cursor one line up
    LineUp,
    /// Move the cursor one line down
    LineDown,
    /// Move the cursor one page up
    PageUp,
    /// Move the cursor one page down
    PageDown,
    /// Mouse wheel up
    WheelUp,
    /// Mouse wheel down
    WheelDown,
    /// Go to the first byte
    GoToStart,
    /// Go to the last byte
    GoToEnd,
    /// Put the cursor on a byte in the given pane (mouse click)
    MoveTo(u64, Option<Pane>),
    /// Switch the cursor between the hex and ASCII panes
    TogglePane,

    // Commands
    /// Set bytes per line from an expression
    SetColumns(String),
    /// Move the cursor by an expression
    GoToRelative(String),
    /// Move the cursor to an expression
    GoToAbsolute(String),
    /// Toggle the mark under the cursor
    ToggleMark,
    /// Jump to the next mark
    NextMark,
    /// Jump to the previous mark
    PrevMark,
    /// Search for text
    SearchText(String),
    /// Search for hex bytes
    SearchHex(String),
    /// Repeat the last search
    SearchNext,
    /// Overwrite bytes at the cursor
    Overwrite(String),
    /// Show the bytes at the cursor as numbers
    Decode(Endian),
    /// Evaluate an expression and show the result
    Evaluate(String),

    // Prompt
    /// Start typing the argument of a command
    OpenPrompt(PromptKind),
    /// Replace the prompt text
    PromptInput(String),
    /// Run the command with the typed text
    PromptSubmit,
    /// Close the prompt without running anything
    PromptCancel,

    // Help
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Scroll the help overlay by n lines
    HelpScroll(i32),

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Key with no binding
    Unbound(String),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. Command
/// failures become status messages; nothing here ends the session.
pub fn update(mut model: Model, msg: Message) -> Model {
    let old_cursor = model.cursor;
    model.last_redraw = Redraw::None;
    if !matches!(msg, Message::Resize(..) | Message::PromptInput(_)) {
        model.clear_toast();
    }
    tracing::debug!(?msg, cursor = old_cursor, "update");

    if let Err(err) = apply(&mut model, msg) {
        tracing::debug!(error = %err, "command failed");
        model.show_toast(ToastLevel::Error, err.to_string());
    }

    let pending = std::mem::replace(&mut model.last_redraw, Redraw::None);
    model.reconcile(old_cursor, pending);
    tracing::trace!(redraw = ?model.last_redraw, cursor = model.cursor, "reconciled");
    model
}

fn apply(model: &mut Model, msg: Message) -> Result<(), CommandError> {
    match msg {
        // Navigation
        Message::MoveBy(delta) => model.move_by(delta),
        Message::LineUp => model.move_by(-model.line_step()),
        Message::LineDown => model.move_by(model.line_step()),
        Message::PageUp => model.move_by(-model.page_step()),
        Message::PageDown => model.move_by(model.page_step()),
        Message::WheelUp => model.move_by(-model.wheel_step()),
        Message::WheelDown => model.move_by(model.wheel_step()),
        Message::GoToStart => model.move_to(0),
        Message::GoToEnd => model.move_to(model.last_offset()),
        Message::MoveTo(offset, pane) => {
            model.move_to(offset);
            if let Some(pane) = pane {
                model.pane = pane;
            }
        }
        Message::TogglePane => model.pane = model.pane.toggled(),

        // Commands
        Message::SetColumns(input) => model.set_columns(&input)?,
        Message::GoToRelative(input) => model.go_to_relative(&input)?,
        Message::GoToAbsolute(input) => model.go_to_absolute(&input)?,
        Message::ToggleMark => {
            model.toggle_mark();
        }
        Message::NextMark => model.next_mark(),
        Message::PrevMark => model.prev_mark(),
        Message::SearchText(text) => report_search(model, |m| m.search_text(&text))?,
        Message::SearchHex(hex) => report_search(model, |m| m.search_hex(&hex))?,
        Message::SearchNext => report_search(model, Model::search_next)?,
        Message::Overwrite(hex) => {
            model.overwrite(&hex)?;
        }
        Message::Decode(endian) => {
            let decoded = model.decode(endian)?;
            model.show_toast(ToastLevel::Info, decoded.to_string());
        }
        Message::Evaluate(input) => {
            let value = model.evaluate(&input)?;
            model.show_toast(ToastLevel::Info, format!("{value} ({value:#x})"));
        }

        // Prompt
        Message::OpenPrompt(kind) => {
            if kind == PromptKind::Overwrite && !model.store.is_writable() {
                return Err(CommandError::NotWritable);
            }
            model.prompt = Some(Prompt {
                kind,
                input: String::new(),
            });
        }
        Message::PromptInput(text) => {
            if let Some(prompt) = model.prompt.as_mut() {
                prompt.input = text;
            }
        }
        Message::PromptSubmit => {
            if let Some(Prompt { kind, input }) = model.prompt.take() {
                return apply(model, command_for(kind, input));
            }
        }
        Message::PromptCancel => model.prompt = None,

        // Help
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll_offset = 0;
        }
        Message::HideHelp => model.help_visible = false,
        Message::HelpScroll(delta) => {
            let step = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
            model.help_scroll_offset = if delta < 0 {
                model.help_scroll_offset.saturating_sub(step)
            } else {
                model.help_scroll_offset.saturating_add(step)
            };
        }

        // Window
        Message::Resize(width, height) => {
            tracing::debug!(width, height, "resize");
            model.last_redraw = model.viewport.resize(width, height, model.cursor);
        }
        Message::Unbound(key) => {
            model.show_toast(
                ToastLevel::Warning,
                format!("unbound key: {key} (press [h] for help)"),
            );
        }

        Message::Quit => model.should_quit = true,
    }
    Ok(())
}

fn command_for(kind: PromptKind, input: String) -> Message {
    match kind {
        PromptKind::Columns => Message::SetColumns(input),
        PromptKind::GoToRelative => Message::GoToRelative(input),
        PromptKind::GoToAbsolute => Message::GoToAbsolute(input),
        PromptKind::SearchText => Message::SearchText(input),
        PromptKind::SearchHex => Message::SearchHex(input),
        PromptKind::Overwrite => Message::Overwrite(input),
        PromptKind::Evaluate => Message::Evaluate(input),
    }
}

fn report_search(
    model: &mut Model,
    search: impl FnOnce(&mut Model) -> Result<Option<u64>, CommandError>,
) -> Result<(), CommandError> {
    if search(model)?.is_none() {
        model.show_toast(ToastLevel::Info, "nothing found");
    }
    Ok(())
}
