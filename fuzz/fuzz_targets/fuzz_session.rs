#![no_main]

//! Session fuzzer.
//!
//! Drives a session with arbitrary selects, placements and demolitions in
//! every mode and checks that rejected actions change nothing and that the
//! session invariants hold after every step.

use arbitrary::Arbitrary;
use gridcity::game::{Category, Coord, GameSession, Mode, SessionConfig, check_invariants};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated action.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzAction {
    Select { building: u8 },
    Place { building: u8, x: i8, y: i8 },
    Demolish { x: i8, y: i8 },
}

#[derive(Arbitrary, Debug)]
struct SessionInput {
    mode: u8,
    size: u8,
    seed: u64,
    actions: Vec<FuzzAction>,
}

fn category(building: u8) -> Category {
    Category::ALL[usize::from(building) % Category::ALL.len()]
}

fuzz_target!(|input: SessionInput| {
    let mode = Mode::ALL[usize::from(input.mode) % Mode::ALL.len()];
    // Keep boards small so long action lists still reach the end state
    let size = u16::from(input.size % 12) + 1;
    let config = SessionConfig::for_mode(mode, Some(size));
    let Ok(mut session) = GameSession::with_seed(config, input.seed) else {
        return;
    };

    for action in input.actions.into_iter().take(500) {
        let before = session.snapshot();
        let result = match action {
            FuzzAction::Select { building } => session.select(category(building)),
            FuzzAction::Place { building, x, y } => session
                .place(category(building), Coord::new(i32::from(x), i32::from(y)))
                .map(|_| ()),
            FuzzAction::Demolish { x, y } => session
                .demolish(Coord::new(i32::from(x), i32::from(y)))
                .map(|_| ()),
        };

        if result.is_err() {
            assert_eq!(session.snapshot(), before, "rejected {action:?} changed the session");
        }

        let violations = check_invariants(&session);
        assert!(violations.is_empty(), "after {action:?}: {violations:?}");
    }
});
