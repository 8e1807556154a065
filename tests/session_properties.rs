use podium::app::{Message, Model, update};
use podium::cache::Deck;
use podium::config::Settings;
use podium::notes::Notes;
use podium::overview::{Direction, OverviewGrid};
use podium::surface::Geometry;
use proptest::prelude::*;

fn session(pages: usize) -> Model {
    let deck = Deck::from_parts("deck.pdf", "/nonexistent/deck", pages, 4.0 / 3.0);
    Model::start(
        deck,
        Notes::default(),
        Settings::default(),
        Geometry::new(120, 40, (10, 20)),
        Some(Geometry::new(80, 24, (10, 20))),
    )
    .unwrap()
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Left),
        Just(Direction::Right),
        Just(Direction::Up),
        Just(Direction::Down),
    ]
}

fn navigation() -> impl Strategy<Value = Message> {
    prop_oneof![
        Just(Message::NextSlide),
        Just(Message::PrevSlide),
        Just(Message::ToggleFullscreen),
        Just(Message::ToggleBlackOut),
    ]
}

proptest! {
    #[test]
    fn page_stays_in_range(
        pages in 1usize..40,
        msgs in prop::collection::vec(navigation(), 0..80),
    ) {
        let mut model = session(pages);
        for msg in msgs {
            model = update(model, msg);
            prop_assert!((1..=pages).contains(&model.current_page));
        }
    }

    #[test]
    fn page_tracks_next_minus_previous(
        pages in 1usize..40,
        forward in 0usize..60,
        back in 0usize..60,
    ) {
        let mut model = session(pages);
        for _ in 0..forward {
            model = update(model, Message::NextSlide);
        }
        let after_forward = (1 + forward).min(pages);
        prop_assert_eq!(model.current_page, after_forward);
        for _ in 0..back {
            model = update(model, Message::PrevSlide);
        }
        prop_assert_eq!(model.current_page, after_forward.saturating_sub(back).max(1));
    }

    #[test]
    fn cursor_stays_on_a_page(
        pages in 1usize..80,
        columns in 1usize..12,
        moves in prop::collection::vec(direction(), 0..120),
    ) {
        let mut grid = OverviewGrid::with_columns(pages, columns);
        for direction in moves {
            let before = grid.cursor();
            let changed = grid.move_cursor(direction);
            let after = grid.cursor();
            prop_assert!((1..=pages).contains(&after));
            prop_assert_eq!(changed.is_some(), before != after);
        }
    }

    #[test]
    fn horizontal_moves_keep_row(pages in 1usize..80, columns in 1usize..12, start in 1usize..80) {
        let start = start.min(pages);
        let mut grid = OverviewGrid::with_columns(pages, columns);
        grid.set_cursor(start);
        let row = grid.position(start).map(|cell| cell.line);
        grid.move_cursor(Direction::Left);
        prop_assert_eq!(grid.position(grid.cursor()).map(|cell| cell.line), row);
        grid.move_cursor(Direction::Right);
        prop_assert_eq!(grid.position(grid.cursor()).map(|cell| cell.line), row);
    }

    #[test]
    fn overview_select_matches_cursor(
        pages in 1usize..60,
        moves in prop::collection::vec(direction(), 0..40),
    ) {
        let mut model = update(session(pages), Message::OpenOverview);
        for direction in moves {
            model = update(model, Message::OverviewMove(direction));
        }
        let cursor = model.overview.as_ref().map(|overview| overview.grid.cursor());
        let model = update(model, Message::OverviewSelectAndReturn);
        prop_assert_eq!(Some(model.current_page), cursor);
        prop_assert!(model.overview.is_none());
    }
}
