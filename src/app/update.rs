use crate::app::Model;
use crate::app::model::ToastLevel;
use crate::overview::Direction;
use crate::surface::SurfaceId;
use crate::timer::TimerKind;

/// All possible events and actions in a session.
///
/// These represent user input, timer ticks, and host events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Slides
    /// Advance one slide
    NextSlide,
    /// Go back one slide
    PrevSlide,
    /// Switch the slide surface between windowed and fullscreen
    ToggleFullscreen,
    /// Blank the slide surface, or bring the slide back
    ToggleBlackOut,
    /// Start or pause the stopwatch
    ToggleStopwatch,
    /// Prerender every slide at every size in idle time
    CreateSlideCache,
    /// Recreate the slide surface at its configured display
    NewSlideSurface,

    // Overview
    /// Show the slide grid on the presenter surface
    OpenOverview,
    /// Move the grid cursor
    OverviewMove(Direction),
    /// Show the cursor slide, stay in the grid
    OverviewSelect,
    /// Show the cursor slide and return to the presenter layout
    OverviewSelectAndReturn,
    /// Mirror the grid onto the slide surface
    OverviewMirror,
    /// Leave the grid
    CloseOverview,

    // Timers and host
    /// A scheduled timer fired
    Tick(TimerKind),
    /// Presenter terminal resized
    Resize(u16, u16),
    /// A surface went away
    SurfaceLost(SurfaceId),
    /// Presenter terminal gained or lost input focus
    FocusChanged(bool),
    /// Redraw screen
    Redraw,

    // Application
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Quit, after confirmation
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. Slide image
/// decoding for the prerender tick happens in the side-effect pass.
pub fn update(mut model: Model, msg: Message) -> Model {
    if !model.is_active() {
        return model;
    }
    if !matches!(
        msg,
        Message::Quit | Message::Tick(_) | Message::Redraw | Message::FocusChanged(_)
    ) {
        model.quit_confirmed = false;
    }

    match msg {
        Message::NextSlide => model.next_slide(),
        Message::PrevSlide => model.previous_slide(),
        Message::ToggleFullscreen => model.toggle_fullscreen(),
        Message::ToggleBlackOut => model.toggle_black_out(),
        Message::ToggleStopwatch => model.toggle_stopwatch(),
        Message::CreateSlideCache => model.create_slide_cache(),
        Message::NewSlideSurface => model.new_slide_surface(),

        Message::OpenOverview => model.open_overview(),
        Message::OverviewMove(direction) => model.overview_move(direction),
        Message::OverviewSelect => model.overview_select(),
        Message::OverviewSelectAndReturn => {
            model.overview_select();
            model.close_overview();
        }
        Message::OverviewMirror => model.overview_mirror(),
        Message::CloseOverview => model.close_overview(),

        Message::Tick(TimerKind::Clock) => model.tick_clock(),
        Message::Tick(TimerKind::Stopwatch) => model.tick_stopwatch(),
        // Decoding happens in the side-effect pass.
        Message::Tick(TimerKind::Prerender) | Message::Redraw => {}
        Message::Resize(cols, rows) => model.resize_presenter(cols, rows),
        Message::SurfaceLost(surface) => model.surface_lost(surface),
        Message::FocusChanged(focused) => model.set_focus(focused),

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Quit => {
            if model.quit_confirmed {
                model.quit();
            } else {
                model.show_toast(ToastLevel::Warning, "Press q again to end the presentation");
                model.quit_confirmed = true;
            }
        }
    }
    model
}
