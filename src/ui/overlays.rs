use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

const SLIDE_KEYS: [(&str, &str); 10] = [
    ("Right/Down/PgDn/Space/Enter", "Next slide"),
    ("Left/Up/PgUp", "Previous slide"),
    ("f", "Toggle slide fullscreen"),
    (".", "Black out / restore slide"),
    ("s", "Start / pause stopwatch"),
    ("o", "Slide overview"),
    ("c", "Cache slide images (fullscreen)"),
    ("m", "New slide surface"),
    ("h / ?", "Toggle help"),
    ("q q", "End presentation"),
];

const OVERVIEW_KEYS: [(&str, &str); 5] = [
    ("Arrows", "Move cursor"),
    ("Enter", "Show slide, stay in overview"),
    ("Space", "Show slide, back to presenter"),
    ("o", "Mirror overview on slide surface"),
    ("q / Esc", "Leave overview"),
];

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled("Presenter", section_style));
    lines.extend(SLIDE_KEYS.iter().map(|(keys, action)| key_line(keys, action)));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Overview", section_style));
    lines.extend(OVERVIEW_KEYS.iter().map(|(keys, action)| key_line(keys, action)));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Deck", section_style));
    lines.push(Line::raw(format!(
        "  Cache: {}",
        model.deck.cache_dir().display()
    )));
    lines.push(Line::raw(format!("  Notes: {} entries", model.notes.len())));
    lines.push(Line::raw(""));
    lines.push(Line::styled("any key closes", dim_style));

    #[allow(clippy::cast_possible_truncation)]
    let needed_rows = lines.len() as u16 + 4;
    let popup_width = area.width.saturating_sub(12).clamp(24, 72);
    let popup = centered_popup_rect(popup_width, needed_rows, area);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn key_line(keys: &str, action: &str) -> Line<'static> {
    Line::raw(format!("  {keys:<28}{action}"))
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
