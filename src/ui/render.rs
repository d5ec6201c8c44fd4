use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::app::{Model, Pane};
use crate::hex::display_char;

use super::{overlays, status};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let rows_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };
    // The last column belongs to the scrollbar.
    let grid_area = Rect {
        width: rows_area.width.saturating_sub(1),
        ..rows_area
    };
    let scrollbar_area = Rect {
        x: rows_area.x + rows_area.width.saturating_sub(1),
        width: rows_area.width.min(1),
        ..rows_area
    };

    frame.render_widget(Clear, area);
    render_rows(model, frame, grid_area);
    render_scrollbar(model, frame, scrollbar_area);
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else if model.prompt.is_none() {
        place_cursor(model, frame, grid_area);
    }
}

fn render_rows(model: &Model, frame: &mut Frame, area: Rect) {
    let viewport = &model.viewport;
    let columns = usize::try_from(viewport.columns()).unwrap_or(usize::MAX);
    let addr_width = usize::try_from(viewport.address_width()).unwrap_or(4);
    let span = viewport.visible_span();
    let marks = model.marks.range(span.start, span.end);
    let mark_style = Style::default().add_modifier(Modifier::REVERSED);

    let mut content: Vec<Line> = Vec::with_capacity(usize::from(area.height));
    for row in 0..usize::from(area.height) {
        let offset = viewport.row_offset(row);
        if offset >= model.size() {
            content.push(Line::raw(""));
            continue;
        }
        let data = model.store.get(offset, columns).unwrap_or_else(|err| {
            tracing::warn!(offset, error = %err, "read failed while drawing");
            Vec::new()
        });

        let mut hex_spans = Vec::with_capacity(data.len() * 2 + 2);
        let mut ascii_spans = Vec::with_capacity(data.len());
        hex_spans.push(Span::styled(
            format!("{offset:0addr_width$x}"),
            Style::default().fg(Color::DarkGray),
        ));
        hex_spans.push(Span::raw("   "));
        for (pos, &byte) in (offset..).zip(&data) {
            let style = if marks.binary_search(&pos).is_ok() {
                mark_style
            } else {
                Style::default()
            };
            hex_spans.push(Span::styled(format!("{byte:02x}"), style));
            hex_spans.push(Span::raw(" "));
            ascii_spans.push(Span::styled(display_char(byte).to_string(), style));
        }
        // Padding past the right edge would be clipped anyway.
        let missing = columns.saturating_sub(data.len());
        let padding = missing.saturating_mul(3).min(usize::from(area.width)) + 2;
        hex_spans.push(Span::raw(" ".repeat(padding)));
        hex_spans.extend(ascii_spans);
        content.push(Line::from(hex_spans));
    }

    frame.render_widget(Paragraph::new(content), area);
}

fn render_scrollbar(model: &Model, frame: &mut Frame, area: Rect) {
    if area.width == 0 {
        return;
    }
    let (start, len) = model.viewport.scrollbar_thumb();
    let thumb = start..start + len;
    let lines: Vec<Line> = (0..u64::from(area.height))
        .map(|row| {
            if thumb.contains(&row) {
                Line::styled(" ", Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Line::styled("\u{2502}", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn place_cursor(model: &Model, frame: &mut Frame, area: Rect) {
    let viewport = &model.viewport;
    let (line, column) = viewport.locate(model.cursor);
    let Some(row) = viewport.screen_row(line) else {
        return;
    };
    let x = match model.pane {
        Pane::Hex => viewport.hex_x(column),
        Pane::Ascii => viewport.ascii_x(column),
    };
    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(row)) else {
        return;
    };
    if x < area.width && y < area.height {
        frame.set_cursor_position(Position::new(area.x + x, area.y + y));
    }
}
