//! Slide grid overview.
//!
//! The grid lays every page out in row-major order, a row of page-number
//! labels above each row of thumbnails. Cursor moves emit a
//! [`SelectionChanged`] event; every surface showing the grid subscribes with
//! its own [`HighlightView`] and redraws just the two thumbnails that changed.

use std::collections::HashMap;

use crate::surface::SurfaceId;

/// Fixed horizontal gap between thumbnails, in pixels.
pub const THUMBNAIL_MARGIN_PX: u32 = 16;

/// Rendered location of a thumbnail: display line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// One display line of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridLine {
    Labels(Vec<usize>),
    Thumbnails(Vec<usize>),
}

/// Emitted whenever the cursor lands on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged {
    pub previous: Option<usize>,
    pub current: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewGrid {
    columns: usize,
    max_page: usize,
    cursor: usize,
    positions: HashMap<usize, GridCell>,
    previous_highlight: Option<usize>,
}

impl OverviewGrid {
    /// Columns that fit in `usable_width_px`, rounded to nearest, at least one.
    pub fn columns_for(usable_width_px: u32, thumb_width_px: u32) -> usize {
        let slot = f64::from(thumb_width_px.saturating_add(THUMBNAIL_MARGIN_PX));
        // Rounded pixel ratio of a terminal width; always small and positive.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let columns = (f64::from(usable_width_px) / slot).round() as usize;
        columns.max(1)
    }

    /// Build a grid with the cursor on page 1.
    pub fn build(max_page: usize, usable_width_px: u32, thumb_width_px: u32) -> Self {
        Self::with_columns(max_page, Self::columns_for(usable_width_px, thumb_width_px))
    }

    pub fn with_columns(max_page: usize, columns: usize) -> Self {
        let mut grid = Self {
            columns: columns.max(1),
            max_page: max_page.max(1),
            cursor: 1,
            positions: HashMap::new(),
            previous_highlight: None,
        };
        grid.index_positions();
        grid
    }

    /// Re-lay the grid for a new width. The cursor survives; the position
    /// index and highlight history do not.
    pub fn rebuild(&mut self, usable_width_px: u32, thumb_width_px: u32) {
        self.columns = Self::columns_for(usable_width_px, thumb_width_px);
        self.previous_highlight = None;
        self.index_positions();
    }

    fn index_positions(&mut self) {
        self.positions = (1..=self.max_page)
            .map(|page| {
                let idx = page - 1;
                let cell = GridCell {
                    line: (idx / self.columns) * 2 + 1,
                    column: idx % self.columns,
                };
                (page, cell)
            })
            .collect();
        crate::perf::log_event(
            "overview.layout",
            format!("pages={} columns={}", self.max_page, self.columns),
        );
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub const fn max_page(&self) -> usize {
        self.max_page
    }

    pub const fn previous_highlight(&self) -> Option<usize> {
        self.previous_highlight
    }

    pub fn position(&self, page: usize) -> Option<GridCell> {
        self.positions.get(&page).copied()
    }

    pub fn page_at(&self, cell: GridCell) -> Option<usize> {
        if cell.line % 2 == 0 || cell.column >= self.columns {
            return None;
        }
        let page = (cell.line / 2) * self.columns + cell.column + 1;
        (page <= self.max_page).then_some(page)
    }

    pub fn row_count(&self) -> usize {
        self.max_page.div_ceil(self.columns)
    }

    /// Display lines: labels, thumbnails, labels, thumbnails, ...
    pub fn lines(&self) -> Vec<GridLine> {
        let pages: Vec<usize> = (1..=self.max_page).collect();
        pages
            .chunks(self.columns)
            .flat_map(|row| [GridLine::Labels(row.to_vec()), GridLine::Thumbnails(row.to_vec())])
            .collect()
    }

    /// Raise the cursor thumbnail without moving.
    pub fn highlight_cursor(&mut self) -> SelectionChanged {
        let event = SelectionChanged {
            previous: self.previous_highlight,
            current: self.cursor,
        };
        self.previous_highlight = Some(self.cursor);
        event
    }

    /// Move the cursor. Returns `None` when the move would leave the row or
    /// the page range.
    pub fn move_cursor(&mut self, direction: Direction) -> Option<SelectionChanged> {
        let cell = self.position(self.cursor)?;
        let target = match direction {
            Direction::Right => {
                (cell.column + 1 < self.columns && self.cursor < self.max_page)
                    .then(|| self.cursor + 1)
            }
            Direction::Left => (cell.column > 0).then(|| self.cursor - 1),
            Direction::Up => (self.cursor > self.columns).then(|| self.cursor - self.columns),
            Direction::Down => {
                (self.cursor + self.columns <= self.max_page).then(|| self.cursor + self.columns)
            }
        }?;
        self.cursor = target;
        Some(self.highlight_cursor())
    }

    /// Place the cursor on a page, clamped to the deck.
    pub fn set_cursor(&mut self, page: usize) -> SelectionChanged {
        self.cursor = page.clamp(1, self.max_page);
        self.highlight_cursor()
    }
}

/// How a surface draws the cursor thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    /// Thick border around the thumbnail.
    Outline,
    /// Border plus a filled label bar spanning the thumbnail width.
    Full,
}

/// The two thumbnails a surface must redraw after a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightDiff {
    pub lower: Option<usize>,
    pub raise: usize,
}

/// Per-surface highlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightView {
    pub highlighted: Option<usize>,
    pub cursor: CursorStyle,
}

impl HighlightView {
    pub const fn new(cursor: CursorStyle) -> Self {
        Self {
            highlighted: None,
            cursor,
        }
    }

    pub fn apply(&mut self, event: &SelectionChanged) -> HighlightDiff {
        let lower = self.highlighted.filter(|page| *page != event.current);
        self.highlighted = Some(event.current);
        HighlightDiff {
            lower,
            raise: event.current,
        }
    }

    pub fn is_raised(&self, page: usize) -> bool {
        self.highlighted == Some(page)
    }
}

/// Overview mode: the grid plus every surface subscribed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub grid: OverviewGrid,
    views: Vec<(SurfaceId, HighlightView)>,
}

impl Overview {
    pub fn open(grid: OverviewGrid) -> Self {
        let mut overview = Self {
            grid,
            views: vec![(SurfaceId::Presenter, HighlightView::new(CursorStyle::Outline))],
        };
        let event = overview.grid.highlight_cursor();
        overview.publish(&event);
        overview
    }

    /// Mirror onto another surface, starting from the current cursor.
    pub fn subscribe(&mut self, surface: SurfaceId, cursor: CursorStyle) {
        let mut view = HighlightView::new(cursor);
        view.apply(&SelectionChanged {
            previous: None,
            current: self.grid.cursor(),
        });
        self.views.retain(|(id, _)| *id != surface);
        self.views.push((surface, view));
    }

    pub fn unsubscribe(&mut self, surface: SurfaceId) {
        self.views.retain(|(id, _)| *id != surface);
    }

    pub fn is_subscribed(&self, surface: SurfaceId) -> bool {
        self.views.iter().any(|(id, _)| *id == surface)
    }

    pub fn view(&self, surface: SurfaceId) -> Option<&HighlightView> {
        self.views
            .iter()
            .find(|(id, _)| *id == surface)
            .map(|(_, view)| view)
    }

    /// Deliver a selection change to every subscriber.
    pub fn publish(&mut self, event: &SelectionChanged) -> Vec<(SurfaceId, HighlightDiff)> {
        self.views
            .iter_mut()
            .map(|(id, view)| (*id, view.apply(event)))
            .collect()
    }

    pub fn move_cursor(&mut self, direction: Direction) -> Option<Vec<(SurfaceId, HighlightDiff)>> {
        let event = self.grid.move_cursor(direction)?;
        Some(self.publish(&event))
    }

    /// Re-lay the grid for a new width and re-raise the cursor everywhere.
    pub fn relayout(&mut self, usable_width_px: u32, thumb_width_px: u32) {
        self.grid.rebuild(usable_width_px, thumb_width_px);
        for (_, view) in &mut self.views {
            view.highlighted = None;
        }
        let event = self.grid.highlight_cursor();
        self.publish(&event);
    }
}
