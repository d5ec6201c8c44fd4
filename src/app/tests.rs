use std::io::Write;
use std::path::PathBuf;

use crossterm::event::{self, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tempfile::NamedTempFile;

use crate::error::CommandError;
use crate::hex::{Endian, HexError};
use crate::store::{self, OpenOptions, StoreError};
use crate::ui::viewport::{MAX_COLUMNS, Redraw};

use super::event_loop::ResizeDebouncer;
use super::{App, Message, Model, Pane, PromptKind, ToastLevel, update};

/// Bytes `i % 256` for a file of `len` bytes.
fn create_file(len: u32) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
    file.write_all(&data).unwrap();
    file.flush().unwrap();
    file
}

fn open_model(file: &NamedTempFile, writable: bool) -> Model {
    let opened = store::open(
        file.path(),
        OpenOptions {
            writable,
            mmap: true,
        },
    )
    .unwrap();
    // 16 columns, 10 data rows
    Model::new(file.path().to_path_buf(), opened, (80, 11), Some(16))
}

/// A 1000 byte read-only model.
fn create_test_model() -> (NamedTempFile, Model) {
    let file = create_file(1000);
    let model = open_model(&file, false);
    (file, model)
}

fn create_writable_model() -> (NamedTempFile, Model) {
    let file = create_file(1000);
    let model = open_model(&file, true);
    (file, model)
}

fn toast(model: &Model) -> Option<(String, ToastLevel)> {
    model
        .active_toast()
        .map(|(message, level)| (message.to_string(), level))
}

fn key(code: KeyCode) -> event::KeyEvent {
    event::KeyEvent::new(code, KeyModifiers::NONE)
}

fn click(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

#[test]
fn test_new_model_starts_at_zero_with_help_hint() {
    let (_file, model) = create_test_model();
    assert_eq!(model.cursor, 0);
    assert_eq!(model.pane, Pane::Hex);
    assert_eq!(model.size(), 1000);
    assert_eq!(
        toast(&model),
        Some(("press [h] for help".to_string(), ToastLevel::Info))
    );
}

#[test]
fn test_cursor_is_clamped_to_file() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::MoveBy(-5));
    assert_eq!(model.cursor, 0);
    let model = update(model, Message::MoveBy(5000));
    assert_eq!(model.cursor, 999);
    let model = update(model, Message::PageDown);
    assert_eq!(model.cursor, 999);
    let model = update(model, Message::GoToStart);
    assert_eq!(model.cursor, 0);
}

#[test]
fn test_line_page_and_wheel_steps() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::LineDown);
    assert_eq!(model.cursor, 16);
    let model = update(model, Message::PageDown);
    assert_eq!(model.cursor, 16 + 160);
    let model = update(model, Message::WheelDown);
    // 16 * (10 / 2 + 1)
    assert_eq!(model.cursor, 176 + 96);
    let model = update(model, Message::WheelUp);
    let model = update(model, Message::LineUp);
    assert_eq!(model.cursor, 160);
    let model = update(model, Message::PageUp);
    assert_eq!(model.cursor, 0);
}

#[test]
fn test_redraw_plan_tracks_cursor_and_scroll() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::LineDown);
    assert_eq!(
        model.last_redraw,
        Redraw::Cursor {
            old_row: Some(0),
            new_row: 1
        }
    );

    let model = update(model, Message::MoveBy(16 * 9));
    assert_eq!(model.viewport.top_line(), 1);
    assert_eq!(
        model.last_redraw,
        Redraw::Scroll {
            shift: Some(-1),
            rows: 9..10
        }
    );

    let model = update(model, Message::Resize(100, 20));
    assert_eq!(model.last_redraw, Redraw::Full);
}

#[test]
fn test_toggle_pane_and_click_sets_pane() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::TogglePane);
    assert_eq!(model.pane, Pane::Ascii);
    let model = update(model, Message::MoveTo(40, Some(Pane::Hex)));
    assert_eq!(model.cursor, 40);
    assert_eq!(model.pane, Pane::Hex);
    let model = update(model, Message::MoveTo(5000, None));
    assert_eq!(model.cursor, 999);
    assert_eq!(model.pane, Pane::Hex);
}

#[test]
fn test_overwrite_writes_bytes() {
    let (file, model) = create_writable_model();
    let model = update(model, Message::MoveBy(10));
    let mut model = update(model, Message::Overwrite("41 42".to_string()));

    assert_eq!(model.store.get(10, 2).unwrap(), vec![0x41, 0x42]);
    assert_eq!(model.store.get(12, 1).unwrap(), vec![12]);
    assert_eq!(model.cursor, 10);
    assert_eq!(model.last_redraw, Redraw::Rows(0..10));
    assert!(model.active_toast().is_none());

    model.store.close().unwrap();
    let on_disk = std::fs::read(file.path()).unwrap();
    assert_eq!(&on_disk[10..12], b"AB");
}

#[test]
fn test_overwrite_malformed_hex_leaves_store_unchanged() {
    let (_file, mut model) = create_writable_model();
    let err = model.overwrite("4").unwrap_err();
    assert!(matches!(
        err,
        CommandError::MalformedHex(HexError::OddLength(1))
    ));
    assert_eq!(model.store.get(0, 2).unwrap(), vec![0, 1]);

    let model = update(model, Message::Overwrite("zz".to_string()));
    let (message, level) = toast(&model).unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("could not parse hex string"));
    assert_eq!(model.store.get(0, 1).unwrap(), vec![0]);
}

#[test]
fn test_overwrite_past_end_is_out_of_range() {
    let (_file, model) = create_writable_model();
    let mut model = update(model, Message::GoToEnd);
    let err = model.overwrite("01 02").unwrap_err();
    assert!(matches!(
        err,
        CommandError::Store(StoreError::OutOfRange { pos: 999, len: 2, .. })
    ));
    assert_eq!(model.store.get(999, 1).unwrap(), vec![(999 % 256) as u8]);
}

#[test]
fn test_overwrite_on_read_only_store_is_refused() {
    let (_file, mut model) = create_test_model();
    assert!(matches!(
        model.overwrite("41"),
        Err(CommandError::NotWritable)
    ));

    let model = update(model, Message::OpenPrompt(PromptKind::Overwrite));
    assert!(model.prompt.is_none());
    let (message, level) = toast(&model).unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("not writable"));
}

#[test]
fn test_go_to_absolute_and_relative() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::GoToAbsolute("0x100".to_string()));
    assert_eq!(model.cursor, 0x100);
    let model = update(model, Message::GoToRelative("-0x10".to_string()));
    assert_eq!(model.cursor, 0xf0);
    let model = update(model, Message::GoToRelative("cursor".to_string()));
    assert_eq!(model.cursor, 0x1e0);
    let model = update(model, Message::GoToAbsolute("99999".to_string()));
    assert_eq!(model.cursor, 999);
}

#[test]
fn test_negative_absolute_goto_counts_from_end() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::GoToAbsolute("-16".to_string()));
    assert_eq!(model.cursor, 1000 - 16);
    let model = update(model, Message::GoToAbsolute("-5000".to_string()));
    assert_eq!(model.cursor, 0);
}

#[test]
fn test_invalid_goto_expression_reports_error() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::MoveBy(3));
    let model = update(model, Message::GoToAbsolute("1 +".to_string()));
    assert_eq!(model.cursor, 3);
    let (message, level) = toast(&model).unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("invalid expression"));
}

#[test]
fn test_set_columns() {
    let (_file, mut model) = create_test_model();
    assert!(matches!(
        model.set_columns("-1"),
        Err(CommandError::InvalidColumns(-1))
    ));
    assert_eq!(model.viewport.columns(), 16);

    let model = update(model, Message::SetColumns("4 * 2".to_string()));
    assert_eq!(model.viewport.columns(), 8);
    assert_eq!(model.viewport.fixed_columns(), Some(8));
    assert_eq!(model.last_redraw, Redraw::Full);

    let model = update(model, Message::SetColumns("0".to_string()));
    assert_eq!(model.viewport.fixed_columns(), None);
    // fits 80 columns: (80 - 7 - 4) / 4
    assert_eq!(model.viewport.columns(), 17);
}

#[test]
fn test_finish_closes_store_when_session_failed() {
    let (file, model) = create_writable_model();
    let mut model = update(model, Message::Overwrite("de ad".to_string()));

    let err = App::finish(&mut model, Err(anyhow::anyhow!("draw failed"))).unwrap_err();
    assert_eq!(err.to_string(), "draw failed");
    assert!(matches!(model.store.get(0, 1), Err(StoreError::Closed)));

    let reopened = store::open(file.path(), OpenOptions::default()).unwrap();
    assert_eq!(reopened.store.get(0, 2).unwrap(), vec![0xde, 0xad]);
}

#[test]
fn test_finish_closes_store_on_quit() {
    let (_file, model) = create_test_model();
    let mut model = update(model, Message::Quit);
    App::finish(&mut model, Ok(())).unwrap();
    assert!(matches!(model.store.get(0, 1), Err(StoreError::Closed)));
}

#[test]
fn test_set_columns_clamps_huge_widths() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::MoveBy(500));
    let model = update(model, Message::SetColumns("0x2000000000000000".to_string()));
    assert_eq!(model.viewport.columns(), MAX_COLUMNS);
    assert_eq!(model.cursor, 500);
    assert_eq!(
        toast(&model),
        Some((format!("columns limited to {MAX_COLUMNS}"), ToastLevel::Warning))
    );

    // a click anywhere in the row still lands inside the file
    let msg = App::handle_mouse(click(30, 0), &model).unwrap();
    let model = update(model, msg);
    assert_eq!(model.cursor, 7);
}

#[test]
fn test_search_text_finds_and_wraps() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"PNG....xx....PNG....").unwrap();
    let model = open_model(&file, false);

    let model = update(model, Message::SearchText("PNG".to_string()));
    assert_eq!(model.cursor, 13);
    assert_eq!(model.needle, b"PNG");
    let model = update(model, Message::SearchNext);
    assert_eq!(model.cursor, 0);
    let model = update(model, Message::SearchNext);
    assert_eq!(model.cursor, 13);
}

#[test]
fn test_search_not_found_is_informational() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::MoveBy(7));
    let model = update(model, Message::SearchText("hexless".to_string()));
    assert_eq!(model.cursor, 7);
    assert_eq!(
        toast(&model),
        Some(("nothing found".to_string(), ToastLevel::Info))
    );
}

#[test]
fn test_search_next_without_needle_finds_nothing() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::SearchNext);
    assert_eq!(model.cursor, 0);
    assert_eq!(
        toast(&model),
        Some(("nothing found".to_string(), ToastLevel::Info))
    );
}

#[test]
fn test_search_hex() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::SearchHex("10 11 12".to_string()));
    assert_eq!(model.cursor, 0x10);
    let model = update(model, Message::SearchNext);
    assert_eq!(model.cursor, 0x110);

    let model = update(model, Message::SearchHex("1".to_string()));
    assert_eq!(model.cursor, 0x110);
    assert_eq!(toast(&model).unwrap().1, ToastLevel::Error);
}

#[test]
fn test_search_text_escapes() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::SearchText(r"\x20!".to_string()));
    assert_eq!(model.cursor, 0x20);

    let model = update(model, Message::SearchText(r"\q".to_string()));
    assert_eq!(toast(&model).unwrap().1, ToastLevel::Error);
    assert_eq!(model.cursor, 0x20);
}

#[test]
fn test_mark_jumps_wrap() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::MoveBy(5));
    let model = update(model, Message::ToggleMark);
    assert_eq!(model.last_redraw, Redraw::Rows(0..1));
    let model = update(model, Message::MoveBy(15));
    let model = update(model, Message::ToggleMark);
    assert_eq!(model.marks.len(), 2);

    let model = update(model, Message::NextMark);
    assert_eq!(model.cursor, 5);
    let model = update(model, Message::NextMark);
    assert_eq!(model.cursor, 20);
    let model = update(model, Message::PrevMark);
    assert_eq!(model.cursor, 5);
    let model = update(model, Message::PrevMark);
    assert_eq!(model.cursor, 20);

    let model = update(model, Message::ToggleMark);
    assert!(!model.marks.contains(20));
}

#[test]
fn test_mark_jumps_without_marks_stay_put() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::MoveBy(9));
    let model = update(model, Message::NextMark);
    assert_eq!(model.cursor, 9);
    let model = update(model, Message::PrevMark);
    assert_eq!(model.cursor, 9);
}

#[test]
fn test_decode_shows_status() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::MoveBy(0xff));
    let model = update(model, Message::Decode(Endian::Little));
    let (message, level) = toast(&model).unwrap();
    assert_eq!(level, ToastLevel::Info);
    assert!(
        message.starts_with("11111111 LE i8:-1 u8:255 i16:255 u16:255"),
        "status: {message}"
    );

    let model = update(model, Message::Decode(Endian::Big));
    let (message, _) = toast(&model).unwrap();
    assert!(message.starts_with("11111111 BE i8:-1 u8:255 i16:-256 u16:65280"));
}

#[test]
fn test_decode_at_end_is_zero_padded() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::GoToEnd);
    let decoded = model.decode(Endian::Little).unwrap();
    assert_eq!(decoded.u64, u64::from((999 % 256) as u8));
}

#[test]
fn test_evaluate_shows_decimal_and_hex() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::Evaluate("size - 1".to_string()));
    assert_eq!(
        toast(&model),
        Some(("999 (0x3e7)".to_string(), ToastLevel::Info))
    );
}

#[test]
fn test_prompt_submit_runs_command() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::OpenPrompt(PromptKind::GoToAbsolute));
    assert_eq!(
        model.prompt.as_ref().map(|p| p.kind),
        Some(PromptKind::GoToAbsolute)
    );
    let model = update(model, Message::PromptInput("0x64".to_string()));
    let model = update(model, Message::PromptSubmit);
    assert!(model.prompt.is_none());
    assert_eq!(model.cursor, 100);
}

#[test]
fn test_prompt_cancel_discards_input() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::OpenPrompt(PromptKind::GoToRelative));
    let model = update(model, Message::PromptInput("50".to_string()));
    let model = update(model, Message::PromptCancel);
    assert!(model.prompt.is_none());
    assert_eq!(model.cursor, 0);
}

#[test]
fn test_unbound_key_and_quit() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::Unbound("'x'".to_string()));
    assert_eq!(toast(&model).unwrap().1, ToastLevel::Warning);
    assert!(!model.should_quit);
    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_help_toggle_and_scroll() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::ToggleHelp);
    assert!(model.help_visible);
    let model = update(model, Message::HelpScroll(3));
    let model = update(model, Message::HelpScroll(-1));
    assert_eq!(model.help_scroll_offset, 2);
    let model = update(model, Message::HelpScroll(-10));
    assert_eq!(model.help_scroll_offset, 0);
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
}

#[test]
fn test_empty_file_is_tolerated() {
    let file = NamedTempFile::new().unwrap();
    let model = open_model(&file, false);
    assert!(model.fallback_reason.is_some());
    assert_eq!(toast(&model).unwrap().1, ToastLevel::Warning);
    let model = update(model, Message::MoveBy(5));
    assert_eq!(model.cursor, 0);
    let model = update(model, Message::SearchText("a".to_string()));
    assert_eq!(model.cursor, 0);
}

#[test]
fn test_keys_map_to_messages() {
    let (_file, model) = create_test_model();
    let cases = [
        (KeyCode::Char('q'), Message::Quit),
        (KeyCode::Char('h'), Message::ToggleHelp),
        (KeyCode::Tab, Message::TogglePane),
        (KeyCode::Left, Message::MoveBy(-1)),
        (KeyCode::Down, Message::LineDown),
        (KeyCode::End, Message::GoToEnd),
        (KeyCode::Char('m'), Message::ToggleMark),
        (KeyCode::Char('J'), Message::PrevMark),
        (KeyCode::Char('n'), Message::SearchNext),
        (KeyCode::Char('d'), Message::Decode(Endian::Little)),
        (KeyCode::Char('D'), Message::Decode(Endian::Big)),
        (
            KeyCode::Char('\\'),
            Message::OpenPrompt(PromptKind::SearchHex),
        ),
        (KeyCode::Char('w'), Message::OpenPrompt(PromptKind::Columns)),
        (KeyCode::Char(':'), Message::OpenPrompt(PromptKind::Evaluate)),
    ];
    for (code, expected) in cases {
        assert_eq!(App::handle_key(key(code), &model), Some(expected));
    }
    assert!(matches!(
        App::handle_key(key(KeyCode::Char('x')), &model),
        Some(Message::Unbound(_))
    ));
}

#[test]
fn test_prompt_keys_edit_text() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::OpenPrompt(PromptKind::SearchText));
    let model = update(model, Message::PromptInput("ab".to_string()));

    assert_eq!(
        App::handle_key(key(KeyCode::Char('q')), &model),
        Some(Message::PromptInput("abq".to_string()))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Backspace), &model),
        Some(Message::PromptInput("a".to_string()))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Enter), &model),
        Some(Message::PromptSubmit)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Esc), &model),
        Some(Message::PromptCancel)
    );
}

#[test]
fn test_any_key_hides_help() {
    let (_file, model) = create_test_model();
    let model = update(model, Message::ToggleHelp);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('x')), &model),
        Some(Message::HideHelp)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('j')), &model),
        Some(Message::HelpScroll(1))
    );
}

#[test]
fn test_mouse_clicks_map_to_offsets() {
    let (_file, model) = create_test_model();
    // hex pane starts at column 7, ASCII pane at 57
    assert_eq!(
        App::handle_mouse(click(10, 2), &model),
        Some(Message::MoveTo(33, Some(Pane::Hex)))
    );
    assert_eq!(
        App::handle_mouse(click(60, 2), &model),
        Some(Message::MoveTo(35, Some(Pane::Ascii)))
    );
    assert_eq!(
        App::handle_mouse(click(79, 9), &model),
        Some(Message::MoveTo(999, None))
    );
    assert_eq!(App::handle_mouse(click(2, 2), &model), None);

    let wheel = MouseEvent {
        kind: MouseEventKind::ScrollDown,
        ..click(0, 0)
    };
    assert_eq!(App::handle_mouse(wheel, &model), Some(Message::WheelDown));
}

#[test]
fn test_resize_debouncer_waits_for_quiet_period() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);

    assert!(debouncer.take_ready(50).is_none());
    assert_eq!(debouncer.take_ready(100), Some((120, 40)));
}

#[test]
fn test_resize_debouncer_keeps_latest_size() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);
    debouncer.queue(140, 50, 20);

    assert!(debouncer.take_ready(80).is_none());
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(120), Some((140, 50)));
    assert!(!debouncer.is_pending());
}

#[test]
fn test_app_builder_is_chainable() {
    let _app = App::new(PathBuf::from("dump.bin"))
        .with_writable(true)
        .with_columns(Some(16))
        .with_mmap(false)
        .with_ascii(true)
        .with_config_paths(Some(PathBuf::from("config")), None);
}
