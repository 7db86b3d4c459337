#![no_main]

//! Snapshot fuzzer.
//!
//! Feeds arbitrary bytes to the snapshot parser. Whatever parses must either
//! be rejected on restore or produce a session that re-serializes to an
//! equivalent snapshot.

use gridcity::game::GameSession;
use gridcity::snapshot::Snapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = Snapshot::from_json(text) else {
        return;
    };
    // Bound allocation from huge declared sizes
    if snapshot.size > 64 {
        return;
    }
    let Ok(session) = GameSession::from_snapshot(&snapshot) else {
        return;
    };

    let again = session.snapshot();
    assert_eq!(again.grid, snapshot.grid);
    assert_eq!(again.coins, snapshot.coins);
    assert_eq!(again.turn_number, snapshot.turn_number);

    let reparsed = Snapshot::from_json(&again.to_json().expect("serializable")).expect("parses");
    assert_eq!(reparsed, again);
});
