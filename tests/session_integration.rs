//! Multi-turn integration tests for the game session.
//!
//! These drive full sessions through the public API and check scoring,
//! placement legality, growth and termination end to end.
//!
//! Run with: cargo test --release session_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use gridcity::autoplay::{EndReason, play_random_game};
use gridcity::game::{
    Category, Coins, Coord, GameSession, Mode, SessionConfig, TerminalReason, check_invariants,
};
use gridcity::GameError;

fn sandbox(size: u16) -> GameSession {
    GameSession::with_seed(SessionConfig::sandbox(size), 7).unwrap()
}

fn place_all(session: &mut GameSession, moves: &[(Category, i32, i32)]) {
    for &(category, x, y) in moves {
        session.place(category, Coord::new(x, y)).unwrap();
    }
}

#[test]
fn test_residential_next_to_industry_scores_one() {
    let mut session = sandbox(5);
    place_all(
        &mut session,
        &[
            (Category::Residential, 2, 2),
            (Category::Industry, 2, 1),
            (Category::Park, 1, 2),
            (Category::Park, 3, 2),
            (Category::Commercial, 2, 3),
        ],
    );

    // R=1 (short-circuit), I=1, parks have no horizontal park neighbours, C=0
    assert_eq!(session.economy().score, 2);
}

#[test]
fn test_park_scores_horizontal_neighbours_only() {
    let mut vertical = sandbox(5);
    place_all(
        &mut vertical,
        &[
            (Category::Park, 2, 1),
            (Category::Park, 2, 2),
            (Category::Park, 2, 3),
        ],
    );
    assert_eq!(vertical.economy().score, 0);

    let mut horizontal = sandbox(5);
    place_all(
        &mut horizontal,
        &[
            (Category::Park, 1, 2),
            (Category::Park, 2, 2),
            (Category::Park, 3, 2),
        ],
    );
    assert_eq!(horizontal.economy().score, 4);
}

#[test]
fn test_road_edges_count_once() {
    let mut session = sandbox(5);
    place_all(&mut session, &[(Category::Road, 1, 1), (Category::Road, 2, 1)]);
    assert_eq!(session.economy().score, 1);

    session.place(Category::Road, Coord::new(3, 1)).unwrap();
    assert_eq!(session.economy().score, 2);

    // A road below does not form a horizontal edge
    session.place(Category::Road, Coord::new(3, 2)).unwrap();
    assert_eq!(session.economy().score, 2);
}

#[test]
fn test_out_of_bounds_leaves_state_unchanged() {
    let mut session = sandbox(5);
    session.place(Category::Road, Coord::new(0, 0)).unwrap();
    let before = session.snapshot();

    for coord in [Coord::new(-1, 0), Coord::new(5, 0), Coord::new(0, -1), Coord::new(0, 5)] {
        assert!(matches!(
            session.place(Category::Park, coord),
            Err(GameError::OutOfBounds { .. })
        ));
        assert!(matches!(
            session.demolish(coord),
            Err(GameError::OutOfBounds { .. })
        ));
    }
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_adjacency_after_first_placement() {
    let mut session = sandbox(5);
    // First placement is exempt
    session.place(Category::Industry, Coord::new(4, 4)).unwrap();

    assert!(matches!(
        session.place(Category::Industry, Coord::new(0, 0)),
        Err(GameError::InvalidPlacement { x: 0, y: 0 })
    ));
    assert!(matches!(
        session.place(Category::Industry, Coord::new(4, 4)),
        Err(GameError::CellOccupied { x: 4, y: 4 })
    ));
    session.place(Category::Industry, Coord::new(3, 4)).unwrap();
    assert_eq!(session.economy().turn_number, 2);
}

#[test]
fn test_single_coin_game_ends_after_one_move() {
    let config = SessionConfig {
        initial_coins: Coins::Finite(1),
        ..SessionConfig::arcade(5)
    };
    let mut session = GameSession::with_seed(config, 3).unwrap();
    let category = session.offers()[0];
    let outcome = session.place(category, Coord::new(2, 2)).unwrap();

    assert_eq!(outcome.terminal, Some(TerminalReason::OutOfCoins));
    assert!(session.is_game_over());

    let before = session.snapshot();
    let next = session.offers()[0];
    assert_eq!(
        session.place(next, Coord::new(2, 3)).unwrap_err(),
        GameError::SessionTerminal
    );
    assert_eq!(session.snapshot(), before);
    assert!(session.legal_cells().is_empty());
}

#[test]
fn test_arcade_only_accepts_offered_buildings() {
    let mut session = GameSession::with_seed(SessionConfig::arcade(7), 11).unwrap();
    assert_eq!(session.offers().len(), 2);

    let missing = Category::ALL
        .into_iter()
        .find(|c| !session.offers().contains(c))
        .unwrap();
    assert_eq!(
        session.place(missing, Coord::new(3, 3)).unwrap_err(),
        GameError::CategoryNotOffered(missing)
    );
    assert_eq!(session.select(missing).unwrap_err(), GameError::CategoryNotOffered(missing));
}

#[test]
fn test_freeplay_grows_and_keeps_content() {
    let mut session = GameSession::with_seed(SessionConfig::freeplay(), 5).unwrap();
    assert_eq!(session.board().width(), 5);

    session.place(Category::Commercial, Coord::new(2, 2)).unwrap();
    assert_eq!(session.board().width(), 5);

    let outcome = session.place(Category::Residential, Coord::new(0, 2)).unwrap();
    let growth = outcome.growth.unwrap();
    assert_eq!(growth.new_size, (15, 15));
    assert_eq!(session.board().width(), 15);
    assert_eq!(session.board().category_at(Coord::new(7, 7)), Some(Category::Commercial));
    assert_eq!(session.board().category_at(Coord::new(5, 7)), Some(Category::Residential));

    session.place(Category::Road, Coord::new(14, 0)).unwrap();
    assert_eq!(session.board().width(), 25);

    // Capped at the maximum
    let outcome = session.place(Category::Road, Coord::new(0, 0)).unwrap();
    assert!(outcome.growth.is_none());
    assert_eq!(session.board().width(), 25);
    assert!(check_invariants(&session).is_empty());
}

#[test]
fn test_freeplay_tracks_profit_and_upkeep() {
    let mut session = GameSession::with_seed(SessionConfig::freeplay(), 5).unwrap();
    place_all(
        &mut session,
        &[(Category::Residential, 1, 1), (Category::Residential, 1, 2)],
    );
    // Two clustered residences: profit 2, upkeep 2
    assert_eq!(session.economy().profit, 2);
    assert_eq!(session.economy().upkeep, 2);
    assert_eq!(session.economy().consecutive_loss_turns, 0);

    session.place(Category::Park, Coord::new(3, 3)).unwrap();
    assert_eq!(session.economy().upkeep, 3);
    assert_eq!(session.economy().consecutive_loss_turns, 1);
}

#[test]
fn test_sandbox_fills_without_ending() {
    let mut session = sandbox(2);
    place_all(
        &mut session,
        &[
            (Category::Road, 0, 0),
            (Category::Road, 1, 0),
            (Category::Park, 0, 1),
            (Category::Park, 1, 1),
        ],
    );
    assert!(session.board().is_full());
    assert!(!session.is_game_over());
    assert!(session.legal_cells().is_empty());
}

#[test]
fn test_random_games_hold_invariants() {
    for mode in Mode::ALL {
        for seed in 0..20 {
            let config = SessionConfig::for_mode(mode, Some(5));
            let summary = play_random_game(seed, config, 1000).unwrap();
            assert_eq!(summary.violations, 0, "{mode} seed {seed}");
            if mode == Mode::Arcade {
                assert!(matches!(summary.end, EndReason::Terminal(_)), "{mode} seed {seed}");
            }
        }
    }
}
