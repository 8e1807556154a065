use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, Message, Model};
use crate::overview::Direction;

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            Event::FocusGained => Some(Message::FocusChanged(true)),
            Event::FocusLost => Some(Message::FocusChanged(false)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if model.help_visible {
            return Some(Message::HideHelp);
        }
        if model.overview.is_some() {
            return overview_key(key.code);
        }

        match key.code {
            KeyCode::Right
            | KeyCode::Down
            | KeyCode::PageDown
            | KeyCode::Char(' ')
            | KeyCode::Enter => Some(Message::NextSlide),
            KeyCode::Left | KeyCode::Up | KeyCode::PageUp => Some(Message::PrevSlide),
            KeyCode::Char('f') => Some(Message::ToggleFullscreen),
            KeyCode::Char('s') => Some(Message::ToggleStopwatch),
            KeyCode::Char('.') => Some(Message::ToggleBlackOut),
            KeyCode::Char('o') => Some(Message::OpenOverview),
            KeyCode::Char('m') => Some(Message::NewSlideSurface),
            KeyCode::Char('c') => Some(Message::CreateSlideCache),
            KeyCode::Char('h' | '?') => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        }
    }
}

fn overview_key(code: KeyCode) -> Option<Message> {
    match code {
        KeyCode::Left => Some(Message::OverviewMove(Direction::Left)),
        KeyCode::Right => Some(Message::OverviewMove(Direction::Right)),
        KeyCode::Up => Some(Message::OverviewMove(Direction::Up)),
        KeyCode::Down => Some(Message::OverviewMove(Direction::Down)),
        KeyCode::Enter => Some(Message::OverviewSelect),
        KeyCode::Char(' ') => Some(Message::OverviewSelectAndReturn),
        KeyCode::Char('o') => Some(Message::OverviewMirror),
        KeyCode::Char('q') | KeyCode::Esc => Some(Message::CloseOverview),
        KeyCode::Char('h' | '?') => Some(Message::ToggleHelp),
        _ => None,
    }
}
