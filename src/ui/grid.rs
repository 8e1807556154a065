use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::app::Model;
use crate::layout::{ImageRequest, SlideSize};
use crate::overview::{CursorStyle, THUMBNAIL_MARGIN_PX};
use crate::surface::SurfaceId;

use super::images;

/// Where one page lands on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub page: usize,
    pub label: Rect,
    pub thumbnail: Rect,
    pub raised: bool,
}

/// Lay out the grid cells that fit in `area`, scrolled both ways so the
/// cursor cell is visible.
///
/// Every subscriber shares the grid's column count, so a surface narrower
/// than the one the grid was built for shows a window of columns around the
/// cursor.
pub fn placements(model: &Model, surface: SurfaceId, area: Rect) -> Vec<Placement> {
    let Some(overview) = model.overview.as_ref() else {
        return Vec::new();
    };
    let Some(view) = overview.view(surface) else {
        return Vec::new();
    };
    let geometry = match surface {
        SurfaceId::Presenter => model.presenter.bounds(),
        SurfaceId::Slide => model.slide.bounds(),
    };
    let grid = &overview.grid;
    let (thumb_w, thumb_h) =
        SlideSize::Width(model.settings.overview_width).dimensions(model.deck.aspect_ratio());
    let slot_cols = geometry
        .cols_for(thumb_w.saturating_add(THUMBNAIL_MARGIN_PX))
        .max(1);
    let thumb_cols = geometry.cols_for(thumb_w);
    let thumb_rows = geometry.rows_for(thumb_h);
    // Label row, then the thumbnail with a cell of highlight margin around it.
    let band = thumb_rows.saturating_add(3);
    let rows_fit = usize::from((area.height / band).max(1));
    // Columns wholly inside the area; a clipped trailing column still draws.
    let cols_fit = usize::from((area.width / slot_cols).max(1));
    let cursor_row = (grid.cursor() - 1) / grid.columns();
    let cursor_col = (grid.cursor() - 1) % grid.columns();
    let first_row = cursor_row.saturating_sub(rows_fit - 1);
    let first_col = cursor_col.saturating_sub(cols_fit - 1);

    (1..=grid.max_page())
        .filter_map(|page| {
            let cell = grid.position(page)?;
            let row = cell.line / 2;
            if row < first_row || row >= first_row + rows_fit {
                return None;
            }
            if cell.column < first_col {
                return None;
            }
            let col_offset = u16::try_from(cell.column - first_col).ok()?;
            let row_offset = u16::try_from(row - first_row).ok()?;
            let x = area.x.saturating_add(col_offset.saturating_mul(slot_cols));
            let y = area.y.saturating_add(row_offset.saturating_mul(band));
            if x >= area.right() || y >= area.bottom() {
                return None;
            }
            Some(Placement {
                page,
                label: Rect::new(x, y, slot_cols, 1).intersection(area),
                thumbnail: Rect::new(
                    x.saturating_add(1),
                    y.saturating_add(2),
                    thumb_cols,
                    thumb_rows,
                )
                .intersection(area),
                raised: view.is_raised(page),
            })
        })
        .collect()
}

/// Draw the grid as seen by one subscribed surface.
pub fn render_grid(
    model: &mut Model,
    frame: &mut Frame,
    surface: SurfaceId,
    area: Rect,
) -> Vec<ImageRequest> {
    let cursor_style = model
        .overview
        .as_ref()
        .and_then(|overview| overview.view(surface))
        .map_or(CursorStyle::Outline, |view| view.cursor);
    let size = SlideSize::Width(model.settings.overview_width);
    let cache_dir = model.deck.cache_dir().to_path_buf();
    let mut used = Vec::new();

    for placement in placements(model, surface, area) {
        let label_style = match (placement.raised, cursor_style) {
            (false, _) => Style::default().fg(Color::Gray),
            (true, CursorStyle::Outline) => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            (true, CursorStyle::Full) => Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        };
        frame.render_widget(
            Paragraph::new(format!(" {}", placement.page)).style(label_style),
            placement.label,
        );

        let request = ImageRequest::new(&cache_dir, placement.page, size);
        images::render_image(model, frame, surface, &request, placement.thumbnail);
        used.push(request);

        if placement.raised {
            let frame_rect = Rect::new(
                placement.thumbnail.x.saturating_sub(1),
                placement.thumbnail.y.saturating_sub(1),
                placement.thumbnail.width.saturating_add(2),
                placement.thumbnail.height.saturating_add(2),
            )
            .intersection(area);
            let border = match cursor_style {
                CursorStyle::Outline => BorderType::Thick,
                CursorStyle::Full => BorderType::Double,
            };
            frame.render_widget(
                Block::bordered()
                    .border_type(border)
                    .border_style(Style::default().fg(Color::Yellow)),
                frame_rect,
            );
        }
    }
    used
}
