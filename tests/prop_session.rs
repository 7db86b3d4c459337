//! Property-based tests for session rules.
//!
//! These tests drive sessions with arbitrary move sequences and check that
//! legality, growth and persistence hold for every input.
//! Run with: cargo test --release prop_session

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use gridcity::game::{
    Board, Category, Coord, GameSession, Mode, SessionConfig, Tile, check_invariants,
};
use gridcity::snapshot::Snapshot;

fn category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Residential),
        Just(Category::Industry),
        Just(Category::Commercial),
        Just(Category::Park),
        Just(Category::Road),
    ]
}

fn mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Arcade), Just(Mode::Freeplay), Just(Mode::Sandbox)]
}

/// Moves may fall outside the board to exercise rejection paths.
fn moves() -> impl Strategy<Value = Vec<(Category, i32, i32, bool)>> {
    prop::collection::vec((category(), -2i32..12, -2i32..12, prop::bool::weighted(0.1)), 0..80)
}

fn apply(session: &mut GameSession, category: Category, coord: Coord, demolish: bool) -> bool {
    if demolish {
        session.demolish(coord).is_ok()
    } else {
        // Arcade only accepts offered buildings; map onto the offers
        let offers = session.offers();
        let category = if offers.contains(&category) || offers.is_empty() {
            category
        } else {
            offers[category as usize % offers.len()]
        };
        session.place(category, coord).is_ok()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Arbitrary move sequences never break invariants, and rejected moves
    /// leave the session untouched.
    #[test]
    fn prop_moves_preserve_invariants(
        mode in mode(),
        size in 2u16..10,
        seed in any::<u64>(),
        moves in moves()
    ) {
        let config = SessionConfig::for_mode(mode, Some(size));
        let mut session = GameSession::with_seed(config, seed).unwrap();

        for (category, x, y, demolish) in moves {
            let before = session.snapshot();
            if !apply(&mut session, category, Coord::new(x, y), demolish) {
                prop_assert_eq!(session.snapshot(), before);
            }
            let violations = check_invariants(&session);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// After the first placement, an empty cell accepts a building iff it
    /// touches an occupied cell.
    #[test]
    fn prop_adjacency_rule(
        first_x in 0i32..6,
        first_y in 0i32..6,
        target_x in 0i32..6,
        target_y in 0i32..6
    ) {
        let mut session = GameSession::with_seed(SessionConfig::sandbox(6), 0).unwrap();
        session.place(Category::Road, Coord::new(first_x, first_y)).unwrap();

        let target = Coord::new(target_x, target_y);
        prop_assume!(target != Coord::new(first_x, first_y));

        let touching = (first_x - target_x).abs() + (first_y - target_y).abs() == 1;
        prop_assert_eq!(session.place(Category::Park, target).is_ok(), touching);
    }

    /// Resizing never shrinks and keeps every tile at its shifted position.
    #[test]
    fn prop_resize_keeps_content(
        size in 1u16..8,
        grow_w in 0u16..12,
        grow_h in 0u16..12,
        tiles in prop::collection::vec((category(), 0u16..8, 0u16..8), 0..20)
    ) {
        let mut board = Board::square(size).unwrap();
        for (category, x, y) in tiles {
            let coord = Coord::new(i32::from(x % size), i32::from(y % size));
            let _ = board.set(coord, Tile::new(category));
        }

        let grown = board.resize_centered(size + grow_w, size + grow_h);
        prop_assert_eq!(grown.width(), size + grow_w);
        prop_assert_eq!(grown.height(), size + grow_h);
        prop_assert_eq!(grown.occupied_count(), board.occupied_count());

        let (dx, dy) = (i32::from(grow_w / 2), i32::from(grow_h / 2));
        for (coord, tile) in board.iter() {
            prop_assert_eq!(grown.get(coord.offset(dx, dy)).unwrap(), tile);
        }

        let unchanged = board.resize_centered(0, 0);
        prop_assert_eq!(unchanged, board);
    }

    /// A snapshot survives JSON and restores to an identical session.
    #[test]
    fn prop_snapshot_restores(
        mode in mode(),
        seed in any::<u64>(),
        moves in moves()
    ) {
        let config = SessionConfig::for_mode(mode, Some(6));
        let mut session = GameSession::with_seed(config, seed).unwrap();
        for (category, x, y, demolish) in moves {
            apply(&mut session, category, Coord::new(x, y), demolish);
        }

        let snapshot = session.snapshot();
        let parsed = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        prop_assert_eq!(&parsed, &snapshot);

        let restored = GameSession::from_snapshot(&parsed).unwrap();
        prop_assert_eq!(restored.board(), session.board());
        prop_assert_eq!(restored.economy(), session.economy());
        prop_assert_eq!(restored.offers(), session.offers());
        prop_assert_eq!(restored.terminal_reason(), session.terminal_reason());
    }
}
