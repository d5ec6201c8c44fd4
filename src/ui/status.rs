use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

/// Lay out `left` and `right` on one line of `width` cells.
///
/// `right` always stays whole at the end. `left` is padded, or cut short
/// with a trailing `>` when it does not fit.
///
/// ```
/// use hexless::ui::fit_status;
///
/// assert_eq!(fit_status("abc", " 1 / 2", 12), "abc    1 / 2");
/// assert_eq!(fit_status("abcdefgh", " 1 / 2", 10), "abc> 1 / 2");
/// ```
pub fn fit_status(left: &str, right: &str, width: usize) -> String {
    let room = width.saturating_sub(right.chars().count());
    let len = left.chars().count();
    let mut out: String = if len > room {
        let mut cut: String = left.chars().take(room.saturating_sub(1)).collect();
        if room > 0 {
            cut.push('>');
        }
        cut
    } else {
        format!("{left:<room$}")
    };
    out.push_str(right);
    out
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let position = format!(" {:x} / {:x}", model.cursor, model.size());
    let width = usize::from(area.width);

    if let Some(prompt) = model.prompt.as_ref() {
        let text = format!("{}{}", prompt.kind.label(), prompt.input);
        let bar = Paragraph::new(fit_status(&text, &position, width))
            .style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(bar, area);
        let cursor_x = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        if cursor_x < area.width {
            frame.set_cursor_position(Position::new(area.x + cursor_x, area.y));
        }
        return;
    }

    let (message, style) = match model.active_toast() {
        Some((message, level)) => (message.to_string(), toast_style(level)),
        None => (
            default_status(model),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
    };
    let bar = Paragraph::new(fit_status(&message, &position, width)).style(style);
    frame.render_widget(bar, area);
}

fn toast_style(level: ToastLevel) -> Style {
    match level {
        ToastLevel::Info => Style::default().bg(Color::DarkGray).fg(Color::White),
        ToastLevel::Warning => Style::default().bg(Color::Yellow).fg(Color::Black),
        ToastLevel::Error => Style::default().bg(Color::Red).fg(Color::White),
    }
}

fn default_status(model: &Model) -> String {
    let filename = model.file_path.file_name().map_or_else(
        || model.file_path.display().to_string(),
        |s| s.to_string_lossy().to_string(),
    );
    let mode = if model.store.is_writable() { "rw" } else { "ro" };
    let marks = if model.marks.is_empty() {
        String::new()
    } else {
        format!("  {} marks", model.marks.len())
    };
    format!(
        "{filename}  [{mode}, {}]{marks}  h:help",
        model.store.kind()
    )
}
