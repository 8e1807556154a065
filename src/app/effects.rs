use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Terminal, TerminalOptions, Viewport};

use crate::app::{App, Message, Model, update};
use crate::prerender::TickOutcome;
use crate::surface::SurfaceId;
use crate::timer::TimerKind;

/// The second terminal the audience sees, written through its tty device.
pub(super) struct SlideTerminal {
    path: PathBuf,
    terminal: Terminal<CrosstermBackend<File>>,
}

impl SlideTerminal {
    pub(super) fn open(path: &Path, size: (u16, u16)) -> io::Result<Self> {
        let mut tty = OpenOptions::new().write(true).open(path)?;
        execute!(tty, EnterAlternateScreen, Hide)?;
        let terminal = Terminal::with_options(
            CrosstermBackend::new(tty),
            TerminalOptions {
                viewport: Viewport::Fixed(Rect::new(0, 0, size.0, size.1)),
            },
        )?;
        crate::perf::log_event(
            "slide.tty.open",
            format!("path={} size={}x{}", path.display(), size.0, size.1),
        );
        Ok(Self {
            path: path.to_path_buf(),
            terminal,
        })
    }

    pub(super) fn draw(&mut self, model: &mut Model) -> io::Result<()> {
        self.terminal
            .draw(|frame| crate::ui::render_slide(model, frame))?;
        Ok(())
    }
}

impl Drop for SlideTerminal {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        crate::perf::log_event("slide.tty.close", format!("path={}", self.path.display()));
    }
}

fn input_pending() -> bool {
    event::poll(Duration::ZERO).unwrap_or(false)
}

impl App {
    pub(super) fn open_slide_terminal(&self) -> Option<io::Result<SlideTerminal>> {
        let path = self.slide_tty.as_ref()?;
        Some(SlideTerminal::open(path, self.slide_size))
    }

    /// Work that needs I/O after a message was applied.
    ///
    /// Returns whether the screen needs repainting.
    pub(super) fn handle_message_side_effects(
        &self,
        model: &mut Model,
        slide_terminal: &mut Option<SlideTerminal>,
        msg: &Message,
    ) -> bool {
        match msg {
            Message::Tick(TimerKind::Prerender) => {
                let outcome = model.prerender_tick(input_pending);
                !matches!(
                    outcome,
                    None | Some(TickOutcome::Rendered { .. } | TickOutcome::Interrupted { .. })
                )
            }
            Message::NewSlideSurface if model.slide.is_live() => {
                *slide_terminal = None;
                match self.open_slide_terminal() {
                    Some(Ok(terminal)) => *slide_terminal = Some(terminal),
                    Some(Err(err)) => {
                        tracing::warn!(%err, "failed to open slide terminal");
                        *model =
                            update(std::mem::take(model), Message::SurfaceLost(SurfaceId::Slide));
                    }
                    None => {}
                }
                true
            }
            Message::SurfaceLost(SurfaceId::Slide) => {
                *slide_terminal = None;
                true
            }
            _ => {
                if !model.is_active() {
                    *slide_terminal = None;
                }
                true
            }
        }
    }

    /// Paint the slide surface; a failed write means the display went away.
    pub(super) fn draw_slide(model: &mut Model, slide_terminal: &mut Option<SlideTerminal>) {
        let Some(terminal) = slide_terminal.as_mut() else {
            return;
        };
        if !model.slide.is_live() {
            return;
        }
        if let Err(err) = terminal.draw(model) {
            tracing::warn!(%err, "slide terminal write failed");
            *slide_terminal = None;
            *model = update(std::mem::take(model), Message::SurfaceLost(SurfaceId::Slide));
        }
    }
}
