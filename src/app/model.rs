use std::collections::HashMap;
use std::time::{Duration, Instant};

use ratatui::style::Color;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;

use crate::cache::Deck;
use crate::config::Settings;
use crate::error::{PresentError, Result};
use crate::image::ImageStore;
use crate::layout::{ImageRequest, SlideSize, compute_display_size};
use crate::notes::Notes;
use crate::overview::{CursorStyle, Direction, Overview, OverviewGrid};
use crate::prerender::{PrerenderJob, TickOutcome};
use crate::presenter::Widget;
use crate::surface::{
    Geometry, Surface, SurfaceContent, SurfaceId, TextStyle, WindowSize, full_size,
    windowed_size,
};
use crate::timer::{TimerKind, Timers};

/// Clock and stopwatch period.
pub const SECOND: Duration = Duration::from_secs(1);
/// Prerender idle tick period.
pub const PRERENDER_INTERVAL: Duration = Duration::from_millis(15);

const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Session lifecycle. A session that has not started has no model at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Active,
    Terminated,
}

/// The presentation session.
///
/// All state lives here; both surfaces are drawn from it.
pub struct Model {
    pub deck: Deck,
    pub notes: Notes,
    pub settings: Settings,
    phase: Phase,
    /// Current page, `1..=deck.page_count()`
    pub current_page: usize,
    /// Audience-facing surface; may be absent or lost at any time
    pub slide: Surface,
    /// Control surface in the invoking terminal
    pub presenter: Surface,
    /// Slide window size before entering fullscreen
    saved_window: Option<WindowSize>,
    /// Slide text style before entering fullscreen
    saved_text_style: TextStyle,
    /// Slide content pixels recorded on entering fullscreen
    pub slide_max_size: Option<(u32, u32)>,
    /// Size mode of the last slide layout
    pub current_slide_size: Option<SlideSize>,
    pub elapsed_seconds: u64,
    pub timers: Timers,
    pub prerender: Option<PrerenderJob>,
    pub overview: Option<Overview>,
    /// Bounds of the configured slide display, used to (re)create the surface
    pub slide_target: Option<Geometry>,
    pub presenter_focused: bool,
    /// Persistent warning raised by the clock while focus is elsewhere
    pub focus_warning: bool,
    pub help_visible: bool,
    /// Set after the first quit press; the second one ends the session
    pub quit_confirmed: bool,
    pub should_quit: bool,
    toast: Option<Toast>,
    /// Decoded page images at every size drawn or prerendered
    pub images: ImageStore,
    pub picker: Option<Picker>,
    /// Terminal graphics state per surface and request
    pub image_protocols: HashMap<(SurfaceId, ImageRequest), StatefulProtocol>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("source", &self.deck.source())
            .field("phase", &self.phase)
            .field("current_page", &self.current_page)
            .field("slide", &self.slide)
            .field("overview", &self.overview.is_some())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Start a session: both surfaces created, windowed, first page shown.
    ///
    /// The slide surface is only created when `slide_target` is known.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::NotRasterized`] for a deck without pages.
    pub fn start(
        deck: Deck,
        notes: Notes,
        settings: Settings,
        presenter_bounds: Geometry,
        slide_target: Option<Geometry>,
    ) -> Result<Self> {
        if deck.page_count() == 0 {
            return Err(PresentError::NotRasterized(deck.cache_dir().to_path_buf()));
        }
        let slide = slide_target.map_or_else(Surface::absent, |bounds| {
            Surface::open(bounds, settings.background)
        });
        let mut presenter = Surface::open_fullscreen(presenter_bounds, Color::Reset);
        presenter.content = SurfaceContent::Presenter;

        let mut model = Self {
            deck,
            notes,
            settings,
            slide,
            presenter,
            slide_target,
            ..Self::default()
        };
        if model.settings.template.uses(Widget::Clock) {
            model.timers.schedule(TimerKind::Clock, SECOND, false);
        }
        model.show_slide();
        crate::perf::log_event(
            "session.start",
            format!(
                "pages={} notes={} slide_surface={}",
                model.deck.page_count(),
                model.notes.len(),
                model.slide.is_live()
            ),
        );
        Ok(model)
    }

    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active)
    }

    pub const fn max_page(&self) -> usize {
        self.deck.page_count()
    }

    pub fn stopwatch_running(&self) -> bool {
        self.timers.is_scheduled(TimerKind::Stopwatch)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.slide.is_live() && self.slide.is_fullscreen()
    }

    pub fn is_blacked_out(&self) -> bool {
        self.slide.is_live() && self.slide.content == SurfaceContent::Empty
    }

    pub fn is_mirrored(&self) -> bool {
        self.overview
            .as_ref()
            .is_some_and(|overview| overview.is_subscribed(SurfaceId::Slide))
    }

    /// Lay the current page out on the slide surface.
    ///
    /// Returns `false` when there is no live slide surface.
    pub(super) fn show_slide(&mut self) -> bool {
        if !self.slide.is_live() {
            return false;
        }
        if let Some(overview) = self.overview.as_mut() {
            overview.unsubscribe(SurfaceId::Slide);
        }
        let (width, height) = self.slide.content_pixels();
        let size = compute_display_size(width, height, self.deck.aspect_ratio());
        self.current_slide_size = Some(size);
        self.slide.background = self.settings.background;
        self.slide.content = SurfaceContent::Slide(ImageRequest::new(
            self.deck.cache_dir(),
            self.current_page,
            size,
        ));
        crate::perf::log_event(
            "slide.show",
            format!("page={} surface={width}x{height} size={size}", self.current_page),
        );
        true
    }

    pub(super) fn next_slide(&mut self) {
        if self.current_page >= self.max_page() {
            self.show_toast(ToastLevel::Info, "Already at the last slide");
            return;
        }
        self.current_page += 1;
        self.show_slide();
    }

    pub(super) fn previous_slide(&mut self) {
        if self.current_page <= 1 {
            self.show_toast(ToastLevel::Info, "Already at the first slide");
            return;
        }
        self.current_page -= 1;
        self.show_slide();
    }

    fn require_slide(&mut self) -> bool {
        if self.slide.is_live() {
            return true;
        }
        self.reject(&PresentError::NoSlideSurface);
        false
    }

    pub(super) fn reject(&mut self, err: &PresentError) {
        tracing::info!(%err, "action refused");
        self.show_toast(ToastLevel::Error, err.to_string());
    }

    pub(super) fn toggle_fullscreen(&mut self) {
        if !self.require_slide() {
            return;
        }
        let bounds = self.slide.bounds();
        if self.slide.is_fullscreen() {
            self.slide.window = self.saved_window.take().unwrap_or_else(|| windowed_size(bounds));
            self.slide.text_style = self.saved_text_style;
        } else {
            self.saved_window = Some(self.slide.window);
            self.saved_text_style = self.slide.text_style;
            self.slide.text_style = TextStyle::Minimal;
            self.slide.window = full_size(bounds);
            self.slide_max_size = Some(self.slide.content_pixels());
        }
        crate::perf::log_event(
            "slide.fullscreen",
            format!("fullscreen={} window={:?}", self.slide.is_fullscreen(), self.slide.window),
        );
        // Tracks the surface even while blacked out or mirrored.
        self.current_slide_size = Some(self.slide_display_size());
        if !self.is_mirrored() && self.slide.content != SurfaceContent::Empty {
            self.show_slide();
        }
    }

    /// Display size for a slide filling the slide surface's usable area.
    fn slide_display_size(&self) -> SlideSize {
        let (width, height) = self.slide.content_pixels();
        compute_display_size(width, height, self.deck.aspect_ratio())
    }

    pub(super) fn toggle_black_out(&mut self) {
        if !self.require_slide() {
            return;
        }
        if self.slide.content == SurfaceContent::Empty {
            self.show_slide();
        } else {
            if let Some(overview) = self.overview.as_mut() {
                overview.unsubscribe(SurfaceId::Slide);
            }
            self.slide.content = SurfaceContent::Empty;
            self.slide.background = Color::Black;
        }
    }

    pub(super) fn toggle_stopwatch(&mut self) {
        if self.timers.cancel(TimerKind::Stopwatch) {
            self.show_toast(ToastLevel::Info, "Stopwatch paused");
        } else {
            self.timers.schedule(TimerKind::Stopwatch, SECOND, false);
            self.show_toast(ToastLevel::Info, "Stopwatch running");
        }
    }

    /// Queue every page at every size the session draws.
    pub(super) fn create_slide_cache(&mut self) {
        if !self.require_slide() {
            return;
        }
        if !self.slide.is_fullscreen() {
            self.reject(&PresentError::NotFullscreen);
            return;
        }
        if self.prerender.as_ref().is_some_and(|job| !job.is_done()) {
            self.show_toast(ToastLevel::Info, "Slide cache is already being built");
            return;
        }
        let slide_size = self.slide_display_size();
        let queue = PrerenderJob::plan(
            self.max_page(),
            slide_size,
            self.settings.current_width,
            self.settings.next_width,
        );
        let items = queue.len();
        let token = self.timers.schedule(TimerKind::Prerender, PRERENDER_INTERVAL, true);
        self.prerender = Some(PrerenderJob::new(queue, token));
        self.show_toast(ToastLevel::Info, format!("Caching {items} slide images"));
    }

    /// Run one prerender step against the image store.
    pub fn prerender_tick(&mut self, input_pending: impl Fn() -> bool) -> Option<TickOutcome> {
        if !self.is_active() {
            return None;
        }
        let mut job = self.prerender.take()?;
        let cache_dir = self.deck.cache_dir().to_path_buf();
        let images = &mut self.images;
        let outcome = job.tick(
            |page, size| {
                images
                    .materialize(&ImageRequest::new(&cache_dir, page, size))
                    .map(|_| ())
            },
            input_pending,
        );
        match outcome {
            TickOutcome::Rendered { .. } | TickOutcome::Interrupted { .. } => {
                self.prerender = Some(job);
            }
            TickOutcome::Finished => {
                self.timers.cancel(TimerKind::Prerender);
                self.show_toast(
                    ToastLevel::Info,
                    format!("Slide cache ready ({} images)", job.total()),
                );
            }
            TickOutcome::ScratchLost { remaining } => {
                self.timers.cancel(TimerKind::Prerender);
                self.show_toast(
                    ToastLevel::Warning,
                    format!("Slide caching stopped, surface went away ({remaining} left)"),
                );
            }
            TickOutcome::Cancelled => {
                self.timers.cancel(TimerKind::Prerender);
            }
        }
        Some(outcome)
    }

    pub(super) fn tick_clock(&mut self) {
        if !self.is_active() {
            return;
        }
        self.focus_warning = !self.presenter_focused;
    }

    pub(super) fn tick_stopwatch(&mut self) {
        if !self.is_active() || !self.stopwatch_running() {
            return;
        }
        self.elapsed_seconds += 1;
    }

    pub(super) fn set_focus(&mut self, focused: bool) {
        self.presenter_focused = focused;
        if focused {
            self.focus_warning = false;
        }
    }

    fn overview_width_px(&self) -> u32 {
        self.presenter.content_pixels().0
    }

    pub(super) fn open_overview(&mut self) {
        if self.overview.is_some() {
            return;
        }
        let grid = OverviewGrid::build(
            self.max_page(),
            self.overview_width_px(),
            self.settings.overview_width,
        );
        crate::perf::log_event(
            "overview.open",
            format!("columns={} rows={}", grid.columns(), grid.row_count()),
        );
        self.overview = Some(Overview::open(grid));
        self.presenter.content = SurfaceContent::Overview;
    }

    pub(super) fn overview_move(&mut self, direction: Direction) {
        let Some(overview) = self.overview.as_mut() else {
            return;
        };
        if let Some(diffs) = overview.move_cursor(direction) {
            for (surface, diff) in diffs {
                crate::perf::log_event(
                    "overview.highlight",
                    format!("surface={surface} lower={:?} raise={}", diff.lower, diff.raise),
                );
            }
        }
    }

    /// Make the cursor page current and show it.
    pub(super) fn overview_select(&mut self) {
        let Some(cursor) = self.overview.as_ref().map(|overview| overview.grid.cursor()) else {
            return;
        };
        self.current_page = cursor;
        if !self.show_slide() {
            self.show_toast(ToastLevel::Info, format!("Slide {cursor} selected"));
        }
    }

    pub(super) fn overview_mirror(&mut self) {
        if self.overview.is_none() || !self.require_slide() {
            return;
        }
        if let Some(overview) = self.overview.as_mut() {
            overview.subscribe(SurfaceId::Slide, CursorStyle::Full);
        }
        self.slide.content = SurfaceContent::Overview;
        self.slide.background = self.settings.background;
    }

    pub(super) fn close_overview(&mut self) {
        if self.overview.is_none() {
            return;
        }
        let mirrored = self.is_mirrored();
        self.overview = None;
        self.presenter.content = SurfaceContent::Presenter;
        if mirrored {
            self.show_slide();
        }
    }

    /// Drop the slide surface and (re)create it at the configured target.
    pub(super) fn new_slide_surface(&mut self) {
        let Some(bounds) = self.slide_target else {
            self.reject(&PresentError::NoSlideTarget);
            return;
        };
        self.lose_slide_surface();
        self.slide = Surface::open(bounds, self.settings.background);
        self.saved_window = None;
        self.saved_text_style = TextStyle::Normal;
        self.slide_max_size = None;
        self.show_slide();
        self.show_toast(ToastLevel::Info, "Slide surface created");
    }

    fn lose_slide_surface(&mut self) {
        self.slide.destroy();
        if let Some(job) = self.prerender.as_mut() {
            job.lose_scratch();
        }
        if let Some(overview) = self.overview.as_mut() {
            overview.unsubscribe(SurfaceId::Slide);
        }
        self.image_protocols
            .retain(|(surface, _), _| *surface != SurfaceId::Slide);
    }

    /// A surface went away underneath the session.
    pub(super) fn surface_lost(&mut self, surface: SurfaceId) {
        tracing::warn!(%surface, "surface lost");
        match surface {
            SurfaceId::Slide => {
                if !self.slide.is_live() {
                    return;
                }
                self.lose_slide_surface();
                self.show_toast(ToastLevel::Warning, "Slide surface lost, press m to recreate it");
            }
            SurfaceId::Presenter => {
                self.reject(&PresentError::PresenterGone);
                self.quit();
            }
        }
    }

    pub(super) fn resize_presenter(&mut self, cols: u16, rows: u16) {
        let bounds = self.presenter.bounds();
        self.presenter
            .set_bounds(Geometry::new(cols, rows, (bounds.cell_width, bounds.cell_height)));
        self.image_protocols
            .retain(|(surface, _), _| *surface != SurfaceId::Presenter);
        let width = self.overview_width_px();
        if let Some(overview) = self.overview.as_mut() {
            overview.relayout(width, self.settings.overview_width);
        }
    }

    /// End the session. Safe when surfaces are already gone.
    pub(super) fn quit(&mut self) {
        if self.slide.is_live() {
            self.slide.destroy();
        }
        self.presenter.destroy();
        self.timers.cancel_all();
        self.prerender = None;
        self.overview = None;
        self.image_protocols.clear();
        self.phase = Phase::Terminated;
        self.should_quit = true;
        crate::perf::log_event("session.quit", format!("elapsed={}s", self.elapsed_seconds));
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Terminal graphics state for a request, decoding it on first use.
    pub fn protocol_for(
        &mut self,
        surface: SurfaceId,
        request: &ImageRequest,
    ) -> Option<&mut StatefulProtocol> {
        let key = (surface, request.clone());
        if !self.image_protocols.contains_key(&key) {
            let picker = self.picker.as_ref()?;
            let image = match self.images.materialize(request) {
                Ok(image) => image.clone(),
                Err(err) => {
                    tracing::debug!(%err, page = request.page, "image unavailable");
                    return None;
                }
            };
            let protocol = picker.new_resize_protocol(image);
            self.image_protocols.insert(key.clone(), protocol);
        }
        self.image_protocols.get_mut(&key)
    }

    /// Drop graphics state for requests a surface no longer draws.
    pub fn retain_protocols(&mut self, surface: SurfaceId, used: &[ImageRequest]) {
        self.image_protocols
            .retain(|(id, request), _| *id != surface || used.contains(request));
    }
}

impl Default for Model {
    fn default() -> Self {
        Self {
            deck: Deck::default(),
            notes: Notes::default(),
            settings: Settings::default(),
            phase: Phase::Active,
            current_page: 1,
            slide: Surface::absent(),
            presenter: Surface::absent(),
            saved_window: None,
            saved_text_style: TextStyle::Normal,
            slide_max_size: None,
            current_slide_size: None,
            elapsed_seconds: 0,
            timers: Timers::new(),
            prerender: None,
            overview: None,
            slide_target: None,
            presenter_focused: true,
            focus_warning: false,
            help_visible: false,
            quit_confirmed: false,
            should_quit: false,
            toast: None,
            images: ImageStore::default(),
            picker: None,
            image_protocols: HashMap::new(),
        }
    }
}
