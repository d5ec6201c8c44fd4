use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

/// `(keys, description)` rows of the help screen, grouped by section.
const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("Arrows", "Move by a byte / line"),
            ("PageUp/PageDown", "Move by a page"),
            ("Home / End", "First / last byte"),
            ("g", "Go to relative offset"),
            ("G", "Go to absolute offset (negative: from end)"),
            ("Tab", "Switch hex / ASCII pane"),
            ("Mouse", "Click to move, wheel scrolls"),
        ],
    ),
    (
        "Marks",
        &[
            ("m", "Toggle mark at cursor"),
            ("j / J", "Next / previous mark"),
        ],
    ),
    (
        "Search",
        &[
            ("/", "Find text (\\n \\t \\0 \\xNN escapes)"),
            ("\\", "Find hex bytes"),
            ("n", "Find next"),
        ],
    ),
    (
        "Data",
        &[
            ("o", "Overwrite with hex bytes (needs -w)"),
            ("d / D", "Decode at cursor, little / big endian"),
            (":", "Calculator"),
            ("w", "Set columns (0 = fit terminal)"),
        ],
    ),
    (
        "Other",
        &[("h / ? / F1", "Toggle help"), ("q / Ctrl-c", "Quit")],
    ),
];

fn help_lines(model: &Model) -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for (title, keys) in HELP_SECTIONS {
        lines.push(Line::styled(*title, section_style));
        for (key, what) in *keys {
            lines.push(Line::raw(format!("  {key:<20}{what}")));
        }
        lines.push(Line::raw(""));
    }

    lines.push(Line::styled("Expressions", section_style));
    lines.push(Line::raw("  + - * / % ( ), 0x 0o 0b literals, cursor, size"));
    lines.push(Line::raw(""));

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let dim_style = Style::default().fg(Color::Indexed(245));
    let all_lines = help_lines(model);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );

    // Reserve 1 row at bottom for footer hint
    let content_height_u16 = inner.height.saturating_sub(1);
    let content_height = usize::from(content_height_u16);
    let max_scroll = all_lines.len().saturating_sub(content_height);
    let scroll = model.help_scroll_offset.min(max_scroll);

    let end = (scroll + content_height).min(all_lines.len());
    let visible: Vec<Line> = all_lines[scroll..end].to_vec();

    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height_u16);
    frame.render_widget(Paragraph::new(visible), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height_u16, inner.width, 1);
    let footer = Line::styled("j/k scroll \u{2502} any other key closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
