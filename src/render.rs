//! ASCII renderer for terminal viewing, optionally with ANSI colors.

use std::fmt::Write as _;

use crate::game::{Board, Category, SessionView};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GRAY: &str = "\x1b[90m";

/// ANSI color for a category.
const fn category_color(category: Category) -> &'static str {
    match category {
        Category::Residential => "\x1b[32m", // Green
        Category::Industry => "\x1b[33m",    // Yellow
        Category::Commercial => "\x1b[34m",  // Blue
        Category::Park => "\x1b[92m",        // Bright Green
        Category::Road => "\x1b[37m",        // White
    }
}

/// Render a session view.
///
/// Output format:
/// ```text
/// Turn 3  Score 4  Coins 6  Profit 0  Upkeep 0
/// ┌───────────┐
/// │ . . . . . │
/// │ . R I . . │
/// │ . C . . . │
/// │ . . . . . │
/// │ . . . . . │
/// └───────────┘
/// Offers: Residential, Park
///
/// Legend: R=Residential  I=Industry  C=Commercial  P=Park  *=Road  .=Empty
/// ```
#[must_use]
pub fn render_ascii(view: &SessionView, color: bool) -> String {
    let mut output = String::new();
    let economy = &view.economy;

    let _ = writeln!(
        output,
        "Turn {}  Score {}  Coins {}  Profit {}  Upkeep {}",
        economy.turn_number, economy.score, economy.coins, economy.profit, economy.upkeep
    );

    render_board(&mut output, &view.board, color);

    let offers: Vec<_> = view.offers.iter().map(|c| c.name()).collect();
    let _ = writeln!(output, "Offers: {}", offers.join(", "));
    if let Some(selected) = view.selected {
        let _ = writeln!(output, "Selected: {selected}");
    }
    if let Some(reason) = view.terminal {
        if color {
            let _ = writeln!(output, "{BOLD}GAME OVER{RESET} ({reason})");
        } else {
            let _ = writeln!(output, "GAME OVER ({reason})");
        }
    }

    output.push_str("\nLegend: R=Residential  I=Industry  C=Commercial  P=Park  *=Road  .=Empty\n");
    output
}

/// Render just the framed grid.
pub fn render_board(output: &mut String, board: &Board, color: bool) {
    let inner = usize::from(board.width()) * 2 + 1;

    output.push('┌');
    output.push_str(&"─".repeat(inner));
    output.push_str("┐\n");

    for row in board.rows() {
        output.push_str("│ ");
        for cell in row {
            match (cell, color) {
                (Some(tile), true) => {
                    let _ = write!(
                        output,
                        "{}{}{RESET}",
                        category_color(tile.category),
                        tile.category.symbol()
                    );
                }
                (Some(tile), false) => output.push(tile.category.symbol()),
                (None, true) => {
                    let _ = write!(output, "{GRAY}.{RESET}");
                }
                (None, false) => output.push('.'),
            }
            output.push(' ');
        }
        output.push_str("│\n");
    }

    output.push('└');
    output.push_str(&"─".repeat(inner));
    output.push_str("┘\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Coord, GameSession, SessionConfig};

    #[test]
    fn test_render_plain() {
        let mut session = GameSession::with_seed(SessionConfig::sandbox(3), 0).unwrap();
        session.place(Category::Residential, Coord::new(1, 1)).unwrap();
        session.place(Category::Road, Coord::new(2, 1)).unwrap();

        let text = render_ascii(&session.view(), false);
        assert!(text.starts_with("Turn 2  Score "));
        assert!(text.contains("│ . R * │"));
        assert!(text.contains("┌───────┐"));
        assert!(!text.contains("GAME OVER"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_render_color_and_game_over() {
        let mut config = SessionConfig::arcade(5);
        config.initial_coins = crate::game::Coins::Finite(1);
        let mut session = GameSession::with_seed(config, 0).unwrap();
        let category = session.offers()[0];
        session.place(category, Coord::new(0, 0)).unwrap();

        let text = render_ascii(&session.view(), true);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains(category_color(category)));
    }
}
