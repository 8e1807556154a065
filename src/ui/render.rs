use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::app::Model;
use crate::layout::ImageRequest;
use crate::presenter::{Fragment, WidgetContext};
use crate::surface::{SurfaceContent, SurfaceId, TextStyle};

use super::{grid, images, overlays, status};

/// Render the presenter surface.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let warning_rows = u16::from(model.focus_warning);
    let toast_rows = u16::from(model.active_toast().is_some());
    let footer_rows = 1 + toast_rows;
    let body = Rect {
        y: area.y + warning_rows,
        height: area.height.saturating_sub(warning_rows + footer_rows),
        ..area
    };

    if model.focus_warning {
        status::render_focus_warning(frame, Rect { height: 1, ..area });
    }

    let used = if model.presenter.content == SurfaceContent::Overview {
        grid::render_grid(model, frame, SurfaceId::Presenter, body)
    } else {
        render_presenter_layout(model, frame, body)
    };
    model.retain_protocols(SurfaceId::Presenter, &used);

    let footer_y = area.y + area.height.saturating_sub(footer_rows);
    if toast_rows > 0 {
        status::render_toast_bar(model, frame, Rect::new(area.x, footer_y, area.width, 1));
    }
    status::render_status_bar(
        model,
        frame,
        Rect::new(area.x, footer_y + toast_rows, area.width, 1),
    );

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

/// Expand the presenter template into `area`, one band per template line.
fn render_presenter_layout(
    model: &mut Model,
    frame: &mut Frame,
    area: Rect,
) -> Vec<ImageRequest> {
    let lines = {
        let ctx = WidgetContext {
            page: model.current_page,
            max_page: model.max_page(),
            elapsed_seconds: model.elapsed_seconds,
            now: Local::now().naive_local(),
            clock_format: &model.settings.clock_format,
            stopwatch_format: &model.settings.stopwatch_format,
            notes: &model.notes,
            cache_dir: model.deck.cache_dir(),
            current_width: model.settings.current_width,
            next_width: model.settings.next_width,
        };
        model.settings.template.render(&ctx)
    };
    let geometry = model.presenter.bounds();
    let aspect = model.deck.aspect_ratio();
    let mut used = Vec::new();
    let mut y = area.y;

    for line in lines {
        if y >= area.bottom() {
            break;
        }
        let remaining = area.bottom() - y;
        let has_images = line.iter().any(|f| matches!(f, Fragment::Image(_)));

        if !has_images {
            let text = line
                .iter()
                .filter_map(|f| match f {
                    Fragment::Text(text) => Some(text.as_str()),
                    Fragment::Image(_) => None,
                })
                .collect::<String>();
            let height = wrapped_height(&text, area.width).min(remaining);
            frame.render_widget(
                Paragraph::new(text).wrap(Wrap { trim: false }),
                Rect::new(area.x, y, area.width, height),
            );
            y += height;
            continue;
        }

        let band = line
            .iter()
            .filter_map(|f| match f {
                Fragment::Image(request) => Some(images::image_cells(request, aspect, geometry).1),
                Fragment::Text(_) => None,
            })
            .max()
            .unwrap_or(1)
            .min(remaining);
        let mut x = area.x;
        for fragment in line {
            if x >= area.right() {
                break;
            }
            let room = area.right() - x;
            match fragment {
                Fragment::Text(text) => {
                    let width = u16::try_from(text.chars().count())
                        .unwrap_or(u16::MAX)
                        .min(room);
                    frame.render_widget(Paragraph::new(text), Rect::new(x, y, width, band));
                    x += width;
                }
                Fragment::Image(request) => {
                    let (cols, rows) = images::image_cells(&request, aspect, geometry);
                    let rect = Rect::new(x, y, cols.min(room), rows.min(band));
                    images::render_image(model, frame, SurfaceId::Presenter, &request, rect);
                    x += rect.width;
                    used.push(request);
                }
            }
        }
        y += band;
    }
    used
}

/// Rows `text` takes when wrapped to `width` columns.
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = text
        .split('\n')
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// Render the slide surface.
pub fn render_slide(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(model.slide.background)),
        area,
    );
    if !model.slide.is_live() {
        return;
    }

    let window = model.slide.window;
    let window_rect = images::centered(area, window.cols, window.rows);
    let inner = if model.slide.text_style == TextStyle::Normal {
        let block = Block::bordered()
            .title(format!(" Slide {}/{} ", model.current_page, model.max_page()))
            .style(Style::default().bg(model.slide.background));
        let inner = block.inner(window_rect);
        frame.render_widget(block, window_rect);
        inner
    } else {
        window_rect
    };

    let used = match model.slide.content.clone() {
        SurfaceContent::Slide(request) => {
            let geometry = model.slide.bounds();
            let (cols, rows) = images::image_cells(&request, model.deck.aspect_ratio(), geometry);
            let rect = images::centered(inner, cols, rows);
            images::render_image(model, frame, SurfaceId::Slide, &request, rect);
            vec![request]
        }
        SurfaceContent::Overview => grid::render_grid(model, frame, SurfaceId::Slide, inner),
        SurfaceContent::Empty | SurfaceContent::Presenter => Vec::new(),
    };
    model.retain_protocols(SurfaceId::Slide, &used);
}
