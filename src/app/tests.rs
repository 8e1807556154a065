use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::Color;
use tempfile::TempDir;

use super::{App, Message, Model, Phase, ToastLevel, update};
use crate::cache::Deck;
use crate::cache::test_support::write_pages;
use crate::config::Settings;
use crate::error::PresentError;
use crate::layout::{ImageRequest, SlideSize};
use crate::notes::Notes;
use crate::overview::Direction;
use crate::prerender::TickOutcome;
use crate::surface::{Geometry, SurfaceContent, SurfaceId, TextStyle, WindowSize};
use crate::timer::TimerKind;

const CELL: (u16, u16) = (10, 20);

fn start(pages: usize, slide_target: Option<Geometry>) -> (TempDir, Model) {
    let dir = tempfile::tempdir().unwrap();
    write_pages(dir.path(), pages, 40, 30);
    let deck = Deck::from_parts(dir.path().join("talk.pdf"), dir.path(), pages, 4.0 / 3.0);
    let notes = Notes::parse("* 1\nOpening\n* 2-3\nMiddle part\n");
    let model = Model::start(
        deck,
        notes,
        Settings::default(),
        Geometry::new(100, 40, CELL),
        slide_target,
    )
    .unwrap();
    (dir, model)
}

fn session(pages: usize) -> (TempDir, Model) {
    start(pages, Some(Geometry::new(80, 24, CELL)))
}

fn send(model: Model, messages: &[Message]) -> Model {
    messages
        .iter()
        .cloned()
        .fold(model, |model, msg| update(model, msg))
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn toast_text(model: &Model) -> Option<String> {
    model.active_toast().map(|(text, _)| text.to_string())
}

#[test]
fn test_start_shows_first_page_windowed() {
    let (_dir, model) = session(3);
    assert_eq!(model.phase(), Phase::Active);
    assert_eq!(model.current_page, 1);
    assert!(model.slide.is_live());
    assert!(!model.is_fullscreen());
    assert_eq!(model.slide.text_style, TextStyle::Normal);
    assert_eq!(model.slide.window, WindowSize { cols: 78, rows: 22 });
    match &model.slide.content {
        SurfaceContent::Slide(request) => assert_eq!(request.page, 1),
        other => panic!("unexpected slide content {other:?}"),
    }
    assert_eq!(model.presenter.content, SurfaceContent::Presenter);
    assert!(model.timers.is_scheduled(TimerKind::Clock));
}

#[test]
fn test_start_rejects_empty_deck() {
    let dir = tempfile::tempdir().unwrap();
    let deck = Deck::from_parts(dir.path().join("talk.pdf"), dir.path(), 0, 4.0 / 3.0);
    let result = Model::start(
        deck,
        Notes::default(),
        Settings::default(),
        Geometry::new(100, 40, CELL),
        None,
    );
    assert!(matches!(result, Err(PresentError::NotRasterized(_))));
}

#[test]
fn test_start_without_slide_target_has_no_slide_surface() {
    let (_dir, model) = start(3, None);
    assert!(!model.slide.is_live());
    assert!(model.current_slide_size.is_none());
}

#[test]
fn test_navigation_stays_within_deck() {
    let (_dir, model) = session(3);
    let model = update(model, Message::PrevSlide);
    assert_eq!(model.current_page, 1);
    assert_eq!(
        model.active_toast(),
        Some(("Already at the first slide", ToastLevel::Info))
    );

    let model = send(
        model,
        &[Message::NextSlide, Message::NextSlide, Message::NextSlide],
    );
    assert_eq!(model.current_page, 3);
    assert_eq!(
        model.active_toast(),
        Some(("Already at the last slide", ToastLevel::Info))
    );

    let model = update(model, Message::PrevSlide);
    assert_eq!(model.current_page, 2);
    match &model.slide.content {
        SurfaceContent::Slide(request) => assert_eq!(request.page, 2),
        other => panic!("unexpected slide content {other:?}"),
    }
}

#[test]
fn test_navigation_without_slide_surface_still_moves() {
    let (_dir, model) = start(3, None);
    let model = update(model, Message::NextSlide);
    assert_eq!(model.current_page, 2);
    assert!(!model.slide.is_live());
}

#[test]
fn test_fullscreen_round_trip_restores_window() {
    let (_dir, model) = session(2);
    let window = model.slide.window;

    let model = update(model, Message::ToggleFullscreen);
    assert!(model.is_fullscreen());
    assert_eq!(model.slide.text_style, TextStyle::Minimal);
    assert_eq!(model.slide.window, WindowSize { cols: 80, rows: 24 });
    assert_eq!(model.slide_max_size, Some((800, 480)));
    assert_eq!(model.current_slide_size, Some(SlideSize::Height(480)));

    let model = update(model, Message::ToggleFullscreen);
    assert!(!model.is_fullscreen());
    assert_eq!(model.slide.window, window);
    assert_eq!(model.slide.text_style, TextStyle::Normal);
    assert_eq!(model.current_slide_size, Some(SlideSize::Height(400)));
}

#[test]
fn test_fullscreen_without_slide_surface_is_refused() {
    let (_dir, model) = start(2, None);
    let model = update(model, Message::ToggleFullscreen);
    assert!(!model.is_fullscreen());
    let (text, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert_eq!(text, PresentError::NoSlideSurface.to_string());
}

#[test]
fn test_black_out_toggles_and_survives_fullscreen() {
    let (_dir, model) = session(2);
    let model = update(model, Message::ToggleBlackOut);
    assert!(model.is_blacked_out());
    assert_eq!(model.slide.background, Color::Black);

    let model = update(model, Message::ToggleFullscreen);
    assert!(model.is_fullscreen());
    assert!(model.is_blacked_out());

    let model = update(model, Message::ToggleBlackOut);
    assert!(!model.is_blacked_out());
    assert_eq!(model.slide.background, model.settings.background);
    assert!(matches!(model.slide.content, SurfaceContent::Slide(_)));
}

#[test]
fn test_stopwatch_counts_only_while_running() {
    let (_dir, model) = session(2);
    let model = update(model, Message::Tick(TimerKind::Stopwatch));
    assert_eq!(model.elapsed_seconds, 0);

    let model = update(model, Message::ToggleStopwatch);
    assert!(model.stopwatch_running());
    let model = send(
        model,
        &[
            Message::Tick(TimerKind::Stopwatch),
            Message::Tick(TimerKind::Stopwatch),
        ],
    );
    assert_eq!(model.elapsed_seconds, 2);

    let model = update(model, Message::ToggleStopwatch);
    assert!(!model.stopwatch_running());
    let model = update(model, Message::Tick(TimerKind::Stopwatch));
    assert_eq!(model.elapsed_seconds, 2);
}

#[test]
fn test_quit_needs_confirmation() {
    let (_dir, model) = session(2);
    let model = update(model, Message::Quit);
    assert!(model.is_active());
    assert!(model.quit_confirmed);
    assert_eq!(
        toast_text(&model).as_deref(),
        Some("Press q again to end the presentation")
    );

    let model = update(model, Message::Quit);
    assert_eq!(model.phase(), Phase::Terminated);
    assert!(model.should_quit);
    assert!(!model.slide.is_live());
    assert!(!model.presenter.is_live());
}

#[test]
fn test_other_input_resets_quit_confirmation() {
    let (_dir, model) = session(2);
    let model = send(model, &[Message::Quit, Message::NextSlide, Message::Quit]);
    assert!(model.is_active());
    assert!(model.quit_confirmed);
}

#[test]
fn test_quit_cancels_every_timer() {
    let (_dir, model) = session(2);
    let model = send(
        model,
        &[
            Message::ToggleStopwatch,
            Message::ToggleFullscreen,
            Message::CreateSlideCache,
            Message::Quit,
            Message::Quit,
        ],
    );
    assert!(!model.timers.is_scheduled(TimerKind::Clock));
    assert!(!model.timers.is_scheduled(TimerKind::Stopwatch));
    assert!(!model.timers.is_scheduled(TimerKind::Prerender));
    assert!(model.prerender.is_none());
}

#[test]
fn test_quit_with_stopwatch_never_started() {
    let (_dir, model) = session(2);
    assert!(model.timers.is_scheduled(TimerKind::Clock));
    assert!(!model.stopwatch_running());
    let model = send(model, &[Message::Quit, Message::Quit]);
    assert_eq!(model.phase(), Phase::Terminated);
    assert!(!model.timers.is_scheduled(TimerKind::Clock));
    assert!(!model.timers.is_scheduled(TimerKind::Stopwatch));
    assert!(model.timers.next_deadline_in(0).is_none());
}

#[test]
fn test_terminated_session_ignores_messages() {
    let (_dir, model) = session(3);
    let model = send(
        model,
        &[
            Message::Quit,
            Message::Quit,
            Message::NextSlide,
            Message::Tick(TimerKind::Stopwatch),
            Message::Quit,
        ],
    );
    assert_eq!(model.current_page, 1);
    assert_eq!(model.elapsed_seconds, 0);
    assert_eq!(model.phase(), Phase::Terminated);
}

#[test]
fn test_quit_after_slide_surface_lost() {
    let (_dir, model) = session(2);
    let model = send(
        model,
        &[
            Message::SurfaceLost(SurfaceId::Slide),
            Message::Quit,
            Message::Quit,
        ],
    );
    assert_eq!(model.phase(), Phase::Terminated);
}

#[test]
fn test_presenter_lost_ends_session() {
    let (_dir, model) = session(2);
    let model = update(model, Message::SurfaceLost(SurfaceId::Presenter));
    assert_eq!(model.phase(), Phase::Terminated);
    assert!(model.should_quit);
}

#[test]
fn test_slide_cache_requires_fullscreen_slide() {
    let (_dir, model) = start(2, None);
    let model = update(model, Message::CreateSlideCache);
    assert!(model.prerender.is_none());
    assert_eq!(
        toast_text(&model),
        Some(PresentError::NoSlideSurface.to_string())
    );

    let (_dir, model) = session(2);
    let model = update(model, Message::CreateSlideCache);
    assert!(model.prerender.is_none());
    assert_eq!(
        toast_text(&model),
        Some(PresentError::NotFullscreen.to_string())
    );
}

#[test]
fn test_slide_cache_fills_image_store() {
    let (_dir, model) = session(2);
    let mut model = send(
        model,
        &[Message::ToggleFullscreen, Message::CreateSlideCache],
    );
    assert!(model.timers.is_scheduled(TimerKind::Prerender));
    assert_eq!(model.prerender.as_ref().map(|job| job.total()), Some(6));

    let mut outcomes = Vec::new();
    while let Some(outcome) = model.prerender_tick(|| false) {
        let done = outcome == TickOutcome::Finished;
        outcomes.push(outcome);
        if done {
            break;
        }
    }
    assert_eq!(outcomes.len(), 6);
    assert_eq!(outcomes.last(), Some(&TickOutcome::Finished));
    assert_eq!(model.images.len(), 6);
    assert!(!model.timers.is_scheduled(TimerKind::Prerender));
    assert!(
        toast_text(&model)
            .unwrap()
            .starts_with("Slide cache ready")
    );
}

#[test]
fn test_slide_cache_uses_fullscreen_size_while_blacked_out() {
    let (_dir, model) = session(2);
    let mut model = send(
        model,
        &[
            Message::ToggleBlackOut,
            Message::ToggleFullscreen,
            Message::CreateSlideCache,
        ],
    );
    assert!(model.is_blacked_out());
    assert_eq!(model.current_slide_size, Some(SlideSize::Height(480)));

    model.prerender_tick(|| false);
    let fullscreen = ImageRequest::new(model.deck.cache_dir(), 1, SlideSize::Height(480));
    let windowed = ImageRequest::new(model.deck.cache_dir(), 1, SlideSize::Height(400));
    assert!(model.images.contains(&fullscreen));
    assert!(!model.images.contains(&windowed));

    let model = update(model, Message::ToggleBlackOut);
    match &model.slide.content {
        SurfaceContent::Slide(request) => assert_eq!(request.size, SlideSize::Height(480)),
        other => panic!("unexpected slide content {other:?}"),
    }
}

#[test]
fn test_slide_cache_yields_to_pending_input() {
    let (_dir, model) = session(2);
    let mut model = send(
        model,
        &[Message::ToggleFullscreen, Message::CreateSlideCache],
    );
    let outcome = model.prerender_tick(|| true);
    assert_eq!(outcome, Some(TickOutcome::Interrupted { remaining: 6 }));
    assert!(model.images.is_empty());
}

#[test]
fn test_slide_cache_stops_when_surface_lost() {
    let (_dir, model) = session(3);
    let mut model = send(
        model,
        &[Message::ToggleFullscreen, Message::CreateSlideCache],
    );
    assert!(matches!(
        model.prerender_tick(|| false),
        Some(TickOutcome::Rendered { remaining: 8 })
    ));
    let mut model = update(model, Message::SurfaceLost(SurfaceId::Slide));
    assert_eq!(
        model.prerender_tick(|| false),
        Some(TickOutcome::ScratchLost { remaining: 8 })
    );
    assert!(!model.timers.is_scheduled(TimerKind::Prerender));
    assert_eq!(model.active_toast().map(|(_, level)| level), Some(ToastLevel::Warning));
}

#[test]
fn test_second_slide_cache_request_is_ignored() {
    let (_dir, model) = session(2);
    let mut model = send(
        model,
        &[Message::ToggleFullscreen, Message::CreateSlideCache],
    );
    model.prerender_tick(|| false);
    let model = update(model, Message::CreateSlideCache);
    assert_eq!(
        model.prerender.as_ref().map(|job| job.remaining()),
        Some(5)
    );
    assert_eq!(
        toast_text(&model).as_deref(),
        Some("Slide cache is already being built")
    );
}

#[test]
fn test_overview_select_keeps_grid_open() {
    let (_dir, model) = session(12);
    let model = update(model, Message::OpenOverview);
    assert_eq!(model.presenter.content, SurfaceContent::Overview);
    let columns = model.overview.as_ref().unwrap().grid.columns();

    let model = send(
        model,
        &[
            Message::OverviewMove(Direction::Right),
            Message::OverviewMove(Direction::Down),
            Message::OverviewSelect,
        ],
    );
    let expected = 2 + columns;
    assert_eq!(model.current_page, expected);
    assert!(model.overview.is_some());
    match &model.slide.content {
        SurfaceContent::Slide(request) => assert_eq!(request.page, expected),
        other => panic!("unexpected slide content {other:?}"),
    }
}

#[test]
fn test_overview_select_and_return_closes_grid() {
    let (_dir, model) = session(5);
    let model = send(
        model,
        &[
            Message::OpenOverview,
            Message::OverviewMove(Direction::Right),
            Message::OverviewSelectAndReturn,
        ],
    );
    assert_eq!(model.current_page, 2);
    assert!(model.overview.is_none());
    assert_eq!(model.presenter.content, SurfaceContent::Presenter);
}

#[test]
fn test_overview_mirror_and_close_restores_slide() {
    let (_dir, model) = session(5);
    let model = send(model, &[Message::OpenOverview, Message::OverviewMirror]);
    assert!(model.is_mirrored());
    assert_eq!(model.slide.content, SurfaceContent::Overview);
    let view = model
        .overview
        .as_ref()
        .and_then(|overview| overview.view(SurfaceId::Slide))
        .unwrap();
    assert!(view.is_raised(1));

    let model = update(model, Message::OverviewMove(Direction::Right));
    let view = model
        .overview
        .as_ref()
        .and_then(|overview| overview.view(SurfaceId::Slide))
        .unwrap();
    assert!(view.is_raised(2));
    assert!(!view.is_raised(1));

    let model = update(model, Message::CloseOverview);
    assert!(!model.is_mirrored());
    assert!(matches!(model.slide.content, SurfaceContent::Slide(_)));
    assert_eq!(model.current_page, 1);
}

#[test]
fn test_overview_select_ends_mirror() {
    let (_dir, model) = session(5);
    let model = send(
        model,
        &[
            Message::OpenOverview,
            Message::OverviewMirror,
            Message::OverviewSelect,
        ],
    );
    assert!(!model.is_mirrored());
    assert!(matches!(model.slide.content, SurfaceContent::Slide(_)));
}

#[test]
fn test_overview_mirror_without_slide_surface_is_refused() {
    let (_dir, model) = start(5, None);
    let model = send(model, &[Message::OpenOverview, Message::OverviewMirror]);
    assert!(!model.is_mirrored());
    assert_eq!(
        toast_text(&model),
        Some(PresentError::NoSlideSurface.to_string())
    );
}

#[test]
fn test_resize_relayouts_overview() {
    let (_dir, model) = session(20);
    let model = update(model, Message::OpenOverview);
    let wide = model.overview.as_ref().unwrap().grid.columns();
    let model = update(model, Message::Resize(50, 40));
    let narrow = model.overview.as_ref().unwrap().grid.columns();
    assert!(narrow < wide);
    assert_eq!(model.presenter.bounds().cols, 50);
}

#[test]
fn test_new_slide_surface_recreates_after_loss() {
    let (_dir, model) = session(3);
    let model = send(
        model,
        &[
            Message::NextSlide,
            Message::ToggleFullscreen,
            Message::SurfaceLost(SurfaceId::Slide),
        ],
    );
    assert!(!model.slide.is_live());

    let model = update(model, Message::NewSlideSurface);
    assert!(model.slide.is_live());
    assert!(!model.is_fullscreen());
    match &model.slide.content {
        SurfaceContent::Slide(request) => assert_eq!(request.page, 2),
        other => panic!("unexpected slide content {other:?}"),
    }
}

#[test]
fn test_new_slide_surface_without_target_is_refused() {
    let (_dir, model) = start(3, None);
    let model = update(model, Message::NewSlideSurface);
    assert!(!model.slide.is_live());
    assert_eq!(
        toast_text(&model),
        Some(PresentError::NoSlideTarget.to_string())
    );
}

#[test]
fn test_clock_tick_raises_focus_warning() {
    let (_dir, model) = session(2);
    let model = update(model, Message::Tick(TimerKind::Clock));
    assert!(!model.focus_warning);

    let model = send(
        model,
        &[Message::FocusChanged(false), Message::Tick(TimerKind::Clock)],
    );
    assert!(model.focus_warning);

    let model = update(model, Message::FocusChanged(true));
    assert!(!model.focus_warning);
}

#[test]
fn test_help_toggles_and_any_key_hides() {
    let (_dir, model) = session(2);
    let model = update(model, Message::ToggleHelp);
    assert!(model.help_visible);
    assert_eq!(
        App::handle_key(press(KeyCode::Right), &model),
        Some(Message::HideHelp)
    );
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
}

#[test]
fn test_presenter_keys() {
    let (_dir, model) = session(2);
    let cases = [
        (KeyCode::Right, Message::NextSlide),
        (KeyCode::Char(' '), Message::NextSlide),
        (KeyCode::PageDown, Message::NextSlide),
        (KeyCode::Left, Message::PrevSlide),
        (KeyCode::PageUp, Message::PrevSlide),
        (KeyCode::Char('f'), Message::ToggleFullscreen),
        (KeyCode::Char('.'), Message::ToggleBlackOut),
        (KeyCode::Char('s'), Message::ToggleStopwatch),
        (KeyCode::Char('o'), Message::OpenOverview),
        (KeyCode::Char('c'), Message::CreateSlideCache),
        (KeyCode::Char('m'), Message::NewSlideSurface),
        (KeyCode::Char('?'), Message::ToggleHelp),
        (KeyCode::Char('q'), Message::Quit),
    ];
    for (code, expected) in cases {
        assert_eq!(App::handle_key(press(code), &model), Some(expected), "{code:?}");
    }
    assert_eq!(App::handle_key(press(KeyCode::Char('z')), &model), None);
}

#[test]
fn test_overview_keys() {
    let (_dir, model) = session(4);
    let model = update(model, Message::OpenOverview);
    let cases = [
        (KeyCode::Left, Message::OverviewMove(Direction::Left)),
        (KeyCode::Down, Message::OverviewMove(Direction::Down)),
        (KeyCode::Enter, Message::OverviewSelect),
        (KeyCode::Char(' '), Message::OverviewSelectAndReturn),
        (KeyCode::Char('o'), Message::OverviewMirror),
        (KeyCode::Esc, Message::CloseOverview),
        (KeyCode::Char('q'), Message::CloseOverview),
    ];
    for (code, expected) in cases {
        assert_eq!(App::handle_key(press(code), &model), Some(expected), "{code:?}");
    }
}

#[test]
fn test_key_release_is_ignored() {
    let (_dir, model) = session(2);
    let mut key = press(KeyCode::Right);
    key.kind = KeyEventKind::Release;
    assert_eq!(App::handle_key(key, &model), None);
}
