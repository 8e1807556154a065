//! Display surface state.
//!
//! A surface is one terminal the presentation draws into. The model owns
//! the state; the host renders it and reports geometry changes and loss.

use ratatui::style::Color;

use crate::layout::ImageRequest;

/// Which surface an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Slide,
    Presenter,
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slide => write!(f, "slide"),
            Self::Presenter => write!(f, "presenter"),
        }
    }
}

/// Terminal bounds plus the pixel size of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub cols: u16,
    pub rows: u16,
    pub cell_width: u16,
    pub cell_height: u16,
}

impl Geometry {
    pub const fn new(cols: u16, rows: u16, cell: (u16, u16)) -> Self {
        Self {
            cols,
            rows,
            cell_width: cell.0,
            cell_height: cell.1,
        }
    }

    pub fn pixel_width(&self, cols: u16) -> u32 {
        u32::from(cols) * u32::from(self.cell_width)
    }

    pub fn pixel_height(&self, rows: u16) -> u32 {
        u32::from(rows) * u32::from(self.cell_height)
    }

    /// Cells needed to hold `px` horizontal pixels, rounded up.
    pub fn cols_for(&self, px: u32) -> u16 {
        cells_for(px, self.cell_width)
    }

    /// Cells needed to hold `px` vertical pixels, rounded up.
    pub fn rows_for(&self, px: u32) -> u16 {
        cells_for(px, self.cell_height)
    }
}

fn cells_for(px: u32, cell: u16) -> u16 {
    let cell = u32::from(cell.max(1));
    u16::try_from(px.div_ceil(cell)).unwrap_or(u16::MAX)
}

/// Window size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub cols: u16,
    pub rows: u16,
}

/// Text rendering style of the surface chrome.
///
/// `Minimal` hides the window decoration so the whole cell grid is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Normal,
    Minimal,
}

/// What the surface currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceContent {
    #[default]
    Empty,
    Slide(ImageRequest),
    Presenter,
    Overview,
}

/// Cells taken by the windowed decoration: border on each side plus title.
pub const DECORATION_COLS: u16 = 2;
pub const DECORATION_ROWS: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    live: bool,
    bounds: Geometry,
    pub window: WindowSize,
    pub text_style: TextStyle,
    pub background: Color,
    pub content: SurfaceContent,
}

impl Surface {
    /// A live surface in windowed mode.
    pub fn open(bounds: Geometry, background: Color) -> Self {
        Self {
            live: true,
            bounds,
            window: windowed_size(bounds),
            text_style: TextStyle::Normal,
            background,
            content: SurfaceContent::Empty,
        }
    }

    /// A live surface filling its bounds without decoration.
    pub fn open_fullscreen(bounds: Geometry, background: Color) -> Self {
        Self {
            window: full_size(bounds),
            text_style: TextStyle::Minimal,
            ..Self::open(bounds, background)
        }
    }

    /// A surface that has not been created.
    pub fn absent() -> Self {
        Self {
            live: false,
            bounds: Geometry::new(0, 0, (1, 1)),
            window: WindowSize { cols: 0, rows: 0 },
            text_style: TextStyle::Normal,
            background: Color::Reset,
            content: SurfaceContent::Empty,
        }
    }

    pub const fn is_live(&self) -> bool {
        self.live
    }

    pub fn destroy(&mut self) {
        self.live = false;
        self.content = SurfaceContent::Empty;
    }

    pub const fn bounds(&self) -> Geometry {
        self.bounds
    }

    /// Apply new display bounds, keeping the window inside them.
    pub fn set_bounds(&mut self, bounds: Geometry) {
        let was_full = self.is_fullscreen();
        self.bounds = bounds;
        self.window = if was_full {
            full_size(bounds)
        } else {
            WindowSize {
                cols: self.window.cols.min(bounds.cols),
                rows: self.window.rows.min(bounds.rows),
            }
        };
    }

    pub fn is_fullscreen(&self) -> bool {
        self.text_style == TextStyle::Minimal && self.window == full_size(self.bounds)
    }

    /// Usable drawing area in cells, after the decoration.
    pub const fn content_cells(&self) -> WindowSize {
        match self.text_style {
            TextStyle::Minimal => self.window,
            TextStyle::Normal => WindowSize {
                cols: self.window.cols.saturating_sub(DECORATION_COLS),
                rows: self.window.rows.saturating_sub(DECORATION_ROWS),
            },
        }
    }

    /// Usable drawing area in pixels.
    pub fn content_pixels(&self) -> (u32, u32) {
        let cells = self.content_cells();
        (
            self.bounds.pixel_width(cells.cols),
            self.bounds.pixel_height(cells.rows),
        )
    }
}

/// Full bounds as a window.
pub const fn full_size(bounds: Geometry) -> WindowSize {
    WindowSize {
        cols: bounds.cols,
        rows: bounds.rows,
    }
}

/// Initial windowed size: one cell of margin all around the bounds.
pub const fn windowed_size(bounds: Geometry) -> WindowSize {
    WindowSize {
        cols: bounds.cols.saturating_sub(2),
        rows: bounds.rows.saturating_sub(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Geometry {
        Geometry::new(100, 40, (10, 20))
    }

    #[test]
    fn test_open_surface_is_windowed() {
        let surface = Surface::open(bounds(), Color::Black);
        assert!(surface.is_live());
        assert!(!surface.is_fullscreen());
        assert_eq!(surface.window, WindowSize { cols: 98, rows: 38 });
        assert_eq!(surface.content_cells(), WindowSize { cols: 96, rows: 36 });
    }

    #[test]
    fn test_minimal_full_window_is_fullscreen() {
        let mut surface = Surface::open(bounds(), Color::Black);
        surface.text_style = TextStyle::Minimal;
        surface.window = full_size(surface.bounds());
        assert!(surface.is_fullscreen());
        assert_eq!(surface.content_pixels(), (1000, 800));
    }

    #[test]
    fn test_set_bounds_keeps_fullscreen_filling_display() {
        let mut surface = Surface::open(bounds(), Color::Black);
        surface.text_style = TextStyle::Minimal;
        surface.window = full_size(surface.bounds());
        surface.set_bounds(Geometry::new(120, 50, (10, 20)));
        assert!(surface.is_fullscreen());
        assert_eq!(surface.window, WindowSize { cols: 120, rows: 50 });
    }

    #[test]
    fn test_set_bounds_clamps_window() {
        let mut surface = Surface::open(bounds(), Color::Black);
        surface.set_bounds(Geometry::new(50, 60, (10, 20)));
        assert_eq!(surface.window, WindowSize { cols: 50, rows: 38 });
    }

    #[test]
    fn test_destroy_clears_content() {
        let mut surface = Surface::open(bounds(), Color::Black);
        surface.content = SurfaceContent::Presenter;
        surface.destroy();
        assert!(!surface.is_live());
        assert_eq!(surface.content, SurfaceContent::Empty);
    }

    #[test]
    fn test_cells_round_up() {
        let geo = bounds();
        assert_eq!(geo.cols_for(95), 10);
        assert_eq!(geo.rows_for(40), 2);
        assert_eq!(geo.rows_for(41), 3);
    }
}
