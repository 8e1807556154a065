use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui_image::protocol::StatefulProtocolType;
use ratatui_image::{Resize, StatefulImage};

use crate::app::Model;
use crate::layout::ImageRequest;
use crate::surface::{Geometry, SurfaceId};

/// Cells a request covers on a surface with the given cell size.
pub fn image_cells(request: &ImageRequest, aspect_ratio: f64, geometry: Geometry) -> (u16, u16) {
    let (width, height) = request.size.dimensions(aspect_ratio);
    (geometry.cols_for(width), geometry.rows_for(height))
}

/// Draw one slide image, or a placeholder when it cannot be shown.
pub fn render_image(
    model: &mut Model,
    frame: &mut Frame,
    surface: SurfaceId,
    request: &ImageRequest,
    area: Rect,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let Some(protocol) = model.protocol_for(surface, request) else {
        let placeholder = Paragraph::new(format!("[slide {}]", request.page))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(placeholder, area);
        return;
    };
    let resize = if matches!(protocol.protocol_type(), StatefulProtocolType::Halfblocks(_)) {
        // Nearest-neighbor causes strong color aliasing artifacts in half-cell mode.
        Resize::Scale(Some(image::imageops::FilterType::CatmullRom))
    } else {
        Resize::Scale(None)
    };
    frame.render_stateful_widget(StatefulImage::default().resize(resize), area, protocol);
    crate::perf::log_event(
        "render.image",
        format!(
            "surface={surface} page={} size={} area={}x{}",
            request.page, request.size, area.width, area.height
        ),
    );
}

/// Center a `cols` x `rows` box inside `area`, clipped to it.
pub fn centered(area: Rect, cols: u16, rows: u16) -> Rect {
    let width = cols.min(area.width);
    let height = rows.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
