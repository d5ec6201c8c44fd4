use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use ratatui::{DefaultTerminal, Frame};

use crate::app::model::Pane;
use crate::app::{App, Message, Model, update};
use crate::store::{self, OpenOptions};

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Wait up to `timeout` for an event, then drain whatever else is queued.
fn read_events(timeout: Duration) -> std::io::Result<Vec<Event>> {
    let mut events = Vec::new();
    if event::poll(timeout)? {
        events.push(event::read()?);
        while event::poll(Duration::ZERO)? {
            events.push(event::read()?);
        }
    }
    Ok(events)
}

impl App {
    /// Open the file, run the main event loop, then flush and close the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, the terminal cannot be
    /// initialized, the event loop hits an I/O failure, or flushing the file
    /// on close fails.
    pub fn run(&mut self) -> Result<()> {
        // Open before touching the terminal so failures print normally
        let opened = store::open(
            &self.file_path,
            OpenOptions {
                writable: self.writable,
                mmap: self.mmap,
            },
        )
        .with_context(|| format!("Failed to open {}", self.file_path.display()))?;
        tracing::debug!(?opened, "store ready");

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - hexless requires an interactive terminal")?;
        let size = terminal.size()?;

        let pane = if self.ascii { Pane::Ascii } else { Pane::Hex };
        let mut model = Model::new(
            self.file_path.clone(),
            opened,
            (size.width, size.height),
            self.columns,
        )
        .with_pane(pane);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        let (mut model, result) = match execute!(stdout(), EnableMouseCapture) {
            Ok(()) => Self::event_loop(&mut terminal, model),
            Err(err) => (model, Err(err.into())),
        };

        // Restore terminal
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        Self::finish(&mut model, result)
    }

    /// Close the store, then report the loop error if there was one.
    ///
    /// The store is flushed even when the loop failed, so edits made before
    /// the failure reach the disk.
    pub(super) fn finish(model: &mut Model, result: Result<()>) -> Result<()> {
        let closed = model
            .store
            .close()
            .with_context(|| format!("Failed to close {}", model.file_path.display()));
        if let Err(err) = &closed
            && result.is_err()
        {
            tracing::error!(error = %err, "closing after a failed session");
        }
        result.and(closed)
    }

    /// Run until quit. The model is handed back even when terminal I/O fails.
    fn event_loop(terminal: &mut DefaultTerminal, mut model: Model) -> (Model, Result<()>) {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        let result = loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                model = update(model, Message::Resize(width, height));
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                250
            };
            let events = match read_events(Duration::from_millis(poll_ms)) {
                Ok(events) => events,
                Err(err) => break Err(err.into()),
            };
            let mut handled = 0_u32;
            for ev in &events {
                // Timestamp each event as it is handled so the debouncer uses accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) = Self::handle_event(ev, &model, event_ms, &mut resize_debouncer) {
                    handled += 1;
                    model = update(model, msg);
                    needs_render = true;
                }
            }
            // Coalesce key repeat bursts into a single render.
            if handled > 1 {
                tracing::trace!(frame = frame_idx, drained = handled - 1, "coalesced events");
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                if let Err(err) = terminal.draw(|frame| Self::view(&model, frame)) {
                    break Err(err.into());
                }
                tracing::trace!(
                    frame = frame_idx,
                    redraw = ?model.last_redraw,
                    draw_ms = draw_start.elapsed().as_secs_f64() * 1000.0,
                    "frame drawn"
                );
                needs_render = false;
            }

            if model.should_quit {
                break Ok(());
            }
        };
        (model, result)
    }

    fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}
