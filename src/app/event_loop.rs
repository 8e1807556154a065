use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableFocusChange, EnableFocusChange};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::cache::{Deck, default_cache_dir};
use crate::notes::Notes;
use crate::surface::{Geometry, SurfaceId};

use super::effects::SlideTerminal;

/// Longest wait between loop iterations when nothing is scheduled.
const IDLE_POLL_MS: u64 = 250;

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

impl App {
    /// Run a presentation until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the deck cannot be opened, the terminal cannot be
    /// initialized, or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let cache_dir = self
            .cache_dir
            .clone()
            .unwrap_or_else(|| default_cache_dir(&self.source));
        let deck_scope = crate::perf::scope("app.open_deck");
        let deck = Deck::open(&self.source, &cache_dir)?;
        let notes = Notes::load_for(&self.source)?;
        drop(deck_scope);

        // Create image picker BEFORE initializing terminal (queries stdio)
        let picker_scope = crate::perf::scope("app.create_picker");
        let picker = crate::image::create_picker(self.force_half_cell);
        drop(picker_scope);
        let cell = crate::image::cell_pixels(&picker);

        let (cols, rows) =
            crossterm::terminal::size().context("podium requires an interactive terminal")?;
        let slide_target = self
            .slide_tty
            .as_ref()
            .map(|_| Geometry::new(self.slide_size.0, self.slide_size.1, cell));
        let mut model = Model::start(
            deck,
            notes,
            self.settings.clone(),
            Geometry::new(cols, rows, cell),
            slide_target,
        )?
        .with_picker(Some(picker));

        let mut slide_terminal = match self.open_slide_terminal() {
            Some(Ok(terminal)) => Some(terminal),
            Some(Err(err)) => {
                tracing::warn!(%err, "failed to open slide terminal");
                model = update(model, Message::SurfaceLost(SurfaceId::Slide));
                None
            }
            None => None,
        };

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal, podium requires an interactive terminal")?;
        let _ = execute!(stdout(), EnableFocusChange);
        drop(init_scope);

        let result = self.event_loop(&mut terminal, &mut model, &mut slide_terminal);

        drop(slide_terminal);
        let _ = execute!(stdout(), DisableFocusChange);
        ratatui::restore();

        result
    }

    fn apply(
        &self,
        model: &mut Model,
        slide_terminal: &mut Option<SlideTerminal>,
        msg: Message,
    ) -> bool {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        self.handle_message_side_effects(model, slide_terminal, &side_msg)
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        slide_terminal: &mut Option<SlideTerminal>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                needs_render |= self.apply(model, slide_terminal, Message::Resize(width, height));
            }

            let pending = event::poll(Duration::ZERO)?;
            for kind in model.timers.take_due(now_ms, pending) {
                needs_render |= self.apply(model, slide_terminal, Message::Tick(kind));
            }

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                model
                    .timers
                    .next_deadline_in(now_ms)
                    .map_or(IDLE_POLL_MS, |ms| ms.min(IDLE_POLL_MS))
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Drain everything queued so key repeat bursts render once.
                loop {
                    let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg =
                        Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        crate::perf::log_event(
                            "event.message",
                            format!("frame={frame_idx} msg={msg:?}"),
                        );
                        needs_render |= self.apply(model, slide_terminal, msg);
                    }
                    if model.should_quit || !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if model.should_quit {
                break;
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                Self::draw_slide(model, slide_terminal);
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }
        }
        Ok(())
    }
}
