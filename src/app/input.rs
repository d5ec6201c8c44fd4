use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::model::{Pane, PromptKind};
use crate::app::{App, Message, Model};
use crate::hex::Endian;
use crate::ui::viewport::Hit;

use super::event_loop::ResizeDebouncer;

/// Lines moved per help scroll step with PageUp/PageDown.
const HELP_PAGE: i32 = 10;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(width, height) => {
                tracing::trace!(width, height, "resize queued");
                resize_debouncer.queue(*width, *height, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match mouse.kind {
                MouseEventKind::ScrollDown => Some(Message::HelpScroll(1)),
                MouseEventKind::ScrollUp => Some(Message::HelpScroll(-1)),
                _ => None,
            };
        }
        if model.prompt.is_some() {
            return None;
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::WheelUp),
            MouseEventKind::ScrollDown => Some(Message::WheelDown),
            MouseEventKind::Down(MouseButton::Left) => {
                match model.viewport.hit_test(mouse.column, mouse.row)? {
                    Hit::Hex(offset) => Some(Message::MoveTo(offset, Some(Pane::Hex))),
                    Hit::Ascii(offset) => Some(Message::MoveTo(offset, Some(Pane::Ascii))),
                    Hit::Scrollbar(offset) => Some(Message::MoveTo(offset, None)),
                }
            }
            // Dragging the scrollbar keeps tracking it.
            MouseEventKind::Drag(MouseButton::Left) => {
                match model.viewport.hit_test(mouse.column, mouse.row)? {
                    Hit::Scrollbar(offset) => Some(Message::MoveTo(offset, None)),
                    Hit::Hex(_) | Hit::Ascii(_) => None,
                }
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match key.code {
                KeyCode::Char('j') | KeyCode::Down => Some(Message::HelpScroll(1)),
                KeyCode::Char('k') | KeyCode::Up => Some(Message::HelpScroll(-1)),
                KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::HelpScroll(HELP_PAGE)),
                KeyCode::PageUp => Some(Message::HelpScroll(-HELP_PAGE)),
                _ => Some(Message::HideHelp),
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if let Some(prompt) = model.prompt.as_ref() {
            return match key.code {
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Char('c') if ctrl => Some(Message::PromptCancel),
                KeyCode::Char('u') if ctrl => Some(Message::PromptInput(String::new())),
                KeyCode::Backspace => {
                    let mut next = prompt.input.clone();
                    next.pop();
                    Some(Message::PromptInput(next))
                }
                KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                    let mut next = prompt.input.clone();
                    next.push(c);
                    Some(Message::PromptInput(next))
                }
                _ => None,
            };
        }

        match key.code {
            // Navigation
            KeyCode::Left => Some(Message::MoveBy(-1)),
            KeyCode::Right => Some(Message::MoveBy(1)),
            KeyCode::Up => Some(Message::LineUp),
            KeyCode::Down => Some(Message::LineDown),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Home => Some(Message::GoToStart),
            KeyCode::End => Some(Message::GoToEnd),
            KeyCode::Tab => Some(Message::TogglePane),
            KeyCode::Char('g') => Some(Message::OpenPrompt(PromptKind::GoToRelative)),
            KeyCode::Char('G') => Some(Message::OpenPrompt(PromptKind::GoToAbsolute)),

            // Marks
            KeyCode::Char('m') => Some(Message::ToggleMark),
            KeyCode::Char('j') => Some(Message::NextMark),
            KeyCode::Char('J') => Some(Message::PrevMark),

            // Search
            KeyCode::Char('/') => Some(Message::OpenPrompt(PromptKind::SearchText)),
            KeyCode::Char('\\') => Some(Message::OpenPrompt(PromptKind::SearchHex)),
            KeyCode::Char('n') => Some(Message::SearchNext),

            // Data
            KeyCode::Char('o') => Some(Message::OpenPrompt(PromptKind::Overwrite)),
            KeyCode::Char('d') => Some(Message::Decode(Endian::Little)),
            KeyCode::Char('D') => Some(Message::Decode(Endian::Big)),
            KeyCode::Char(':') => Some(Message::OpenPrompt(PromptKind::Evaluate)),
            KeyCode::Char('w') => Some(Message::OpenPrompt(PromptKind::Columns)),

            // Other
            KeyCode::Char('h' | '?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('c') if ctrl => Some(Message::Quit),
            KeyCode::Char(c) => Some(Message::Unbound(format!("{c:?}"))),
            _ => None,
        }
    }
}
