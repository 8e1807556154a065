use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::presenter::format_stopwatch;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let name = model
        .deck
        .source()
        .file_name()
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());

    let mut flags = Vec::new();
    if !model.slide.is_live() {
        flags.push("no slide surface".to_string());
    } else if model.is_fullscreen() {
        flags.push("fullscreen".to_string());
    }
    if model.is_blacked_out() {
        flags.push("black".to_string());
    }
    if let Some(overview) = model.overview.as_ref() {
        let mirror = if model.is_mirrored() { " mirrored" } else { "" };
        flags.push(format!("overview {}{mirror}", overview.grid.cursor()));
    }
    if let Some(job) = model.prerender.as_ref() {
        flags.push(format!(
            "caching {}/{}",
            job.total() - job.remaining(),
            job.total()
        ));
    }
    if model.stopwatch_running() {
        flags.push(format!(
            "stopwatch {}",
            format_stopwatch(model.elapsed_seconds, &model.settings.stopwatch_format)
        ));
    }
    let flags: String = flags.iter().map(|flag| format!(" [{flag}]")).collect();

    let status = format!(
        " {}  Slide {}/{}{}  h:help",
        name,
        model.current_page,
        model.max_page(),
        flags
    );
    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

pub fn render_focus_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new(" Input focus is not on the presenter terminal ")
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .bg(Color::Red)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(warning, area);
}
