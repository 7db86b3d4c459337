//! Scoring and economy: score, coin income, profit and upkeep.
//!
//! The whole board is rescored from scratch after every placement. Tile
//! contributions depend on their neighbourhood (and roads on a board-wide
//! visited set), so incremental updates would need invalidation tracking
//! out of proportion to a board of at most a few hundred cells.
//!
//! # Score
//!
//! | Category    | Score                                                        |
//! |-------------|--------------------------------------------------------------|
//! | Residential | 1 if any neighbour is Industry, else +1 per R/C, +2 per Park |
//! | Industry    | 1                                                            |
//! | Commercial  | +1 per Commercial neighbour                                  |
//! | Park        | +1 per Park neighbour to the left or right                   |
//! | Road        | +1 per horizontal road connection, each counted once         |
//!
//! # Coins
//!
//! - +1 per (Residential, Industry) adjacency
//! - +1 per (Commercial, Residential) adjacency
//!
//! # Profit and upkeep
//!
//! | Category    | Profit | Upkeep                        |
//! |-------------|--------|-------------------------------|
//! | Residential | 1      | 1 if part of a cluster        |
//! | Industry    | 2      | 1                             |
//! | Commercial  | 3      | 2                             |
//! | Park        | 0      | 1                             |
//! | Road        | 0      | 1                             |

// Neighbour counts are at most 4 per tile, far below i64::MAX.
#![allow(clippy::cast_possible_wrap)]

use std::collections::{HashSet, VecDeque};

use crate::game::{Board, Category, Coord, SessionConfig};

/// Outcome of a full board rescoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreReport {
    /// Total board score.
    pub score: i64,
    /// Profit per turn (zero when upkeep tracking is off).
    pub profit: i64,
    /// Upkeep per turn (zero when upkeep tracking is off).
    pub upkeep: i64,
    /// Coins earned by residences next to industry.
    pub industry_coins: i64,
    /// Coins earned by shops next to residences.
    pub commercial_coins: i64,
}

impl ScoreReport {
    /// Net coin change to apply to the treasury.
    #[must_use]
    pub const fn coin_delta(&self) -> i64 {
        self.industry_coins + self.commercial_coins - self.upkeep
    }

    /// True when this turn's upkeep exceeds its profit.
    #[must_use]
    pub const fn is_loss(&self) -> bool {
        self.profit < self.upkeep
    }
}

/// Rescore the whole board.
#[must_use]
pub fn recompute(board: &Board, config: &SessionConfig) -> ScoreReport {
    let mut report = ScoreReport::default();
    let mut road_edges: HashSet<(Coord, Coord)> = HashSet::new();

    for (coord, tile) in board.occupied() {
        match tile.category {
            Category::Residential => {
                report.score += residential_score(board, coord);
                report.industry_coins += count_neighbors(board, coord, Category::Industry);
            }
            Category::Industry => report.score += 1,
            Category::Commercial => {
                report.score += count_neighbors(board, coord, Category::Commercial);
                report.commercial_coins += count_neighbors(board, coord, Category::Residential);
            }
            Category::Park => report.score += park_score(board, coord),
            Category::Road => report.score += road_score(board, coord, &mut road_edges),
        }
    }

    if config.track_upkeep {
        let (profit, upkeep) = profit_and_upkeep(board);
        report.profit = profit;
        report.upkeep = upkeep;
    }

    report
}

/// Residential score: short-circuits to 1 on the first Industry neighbour.
fn residential_score(board: &Board, coord: Coord) -> i64 {
    let mut score = 0;
    for adj in board.neighbors4(coord) {
        match board.category_at(adj) {
            Some(Category::Industry) => return 1,
            Some(Category::Residential | Category::Commercial) => score += 1,
            Some(Category::Park) => score += 2,
            Some(Category::Road) | None => {}
        }
    }
    score
}

/// Park score: only the left and right neighbours count.
fn park_score(board: &Board, coord: Coord) -> i64 {
    horizontal_neighbors(coord)
        .into_iter()
        .filter(|&adj| board.category_at(adj) == Some(Category::Park))
        .count() as i64
}

/// Road score: one point per horizontal road edge not seen earlier in the scan.
fn road_score(board: &Board, coord: Coord, visited: &mut HashSet<(Coord, Coord)>) -> i64 {
    let mut score = 0;
    for adj in horizontal_neighbors(coord) {
        if board.category_at(adj) == Some(Category::Road) {
            let edge = if coord < adj { (coord, adj) } else { (adj, coord) };
            if visited.insert(edge) {
                score += 1;
            }
        }
    }
    score
}

fn horizontal_neighbors(coord: Coord) -> [Coord; 2] {
    [coord.offset(-1, 0), coord.offset(1, 0)]
}

fn count_neighbors(board: &Board, coord: Coord, category: Category) -> i64 {
    board
        .neighbors4(coord)
        .filter(|&adj| board.category_at(adj) == Some(category))
        .count() as i64
}

/// Profit and upkeep totals for the board.
fn profit_and_upkeep(board: &Board) -> (i64, i64) {
    let mut profit = 0;
    let mut upkeep = 0;

    for (coord, tile) in board.occupied() {
        match tile.category {
            Category::Residential => {
                profit += 1;
                if is_cluster(board, coord) {
                    upkeep += 1;
                }
            }
            Category::Industry => {
                profit += 2;
                upkeep += 1;
            }
            Category::Commercial => {
                profit += 3;
                upkeep += 2;
            }
            Category::Park | Category::Road => upkeep += 1,
        }
    }

    (profit, upkeep)
}

/// Size of the same-category 4-connected group containing `seed`.
///
/// Breadth-first flood fill. Returns 0 for an empty or off-board seed.
#[must_use]
pub fn cluster_size(board: &Board, seed: Coord) -> usize {
    let Some(category) = board.category_at(seed) else {
        return 0;
    };

    let mut visited = HashSet::from([seed]);
    let mut queue = VecDeque::from([seed]);

    while let Some(current) = queue.pop_front() {
        for adj in board.neighbors4(current) {
            if board.category_at(adj) == Some(category) && visited.insert(adj) {
                queue.push_back(adj);
            }
        }
    }

    visited.len()
}

/// True iff the tile at `seed` has at least one same-category tile
/// reachable through same-category neighbours.
#[must_use]
pub fn is_cluster(board: &Board, seed: Coord) -> bool {
    cluster_size(board, seed) > 1
}

/// Kani formal verification proofs.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Loss detection agrees with the sign of profit minus upkeep.
    #[kani::proof]
    fn prove_loss_matches_margin() {
        let profit: i32 = kani::any();
        let upkeep: i32 = kani::any();
        let report = ScoreReport {
            profit: i64::from(profit),
            upkeep: i64::from(upkeep),
            ..ScoreReport::default()
        };
        assert_eq!(report.is_loss(), i64::from(profit) - i64::from(upkeep) < 0);
    }

    /// Coin delta never overflows for per-board magnitudes.
    #[kani::proof]
    fn prove_coin_delta_no_overflow() {
        let industry: i32 = kani::any();
        let commercial: i32 = kani::any();
        let upkeep: i32 = kani::any();
        let report = ScoreReport {
            industry_coins: i64::from(industry),
            commercial_coins: i64::from(commercial),
            upkeep: i64::from(upkeep),
            ..ScoreReport::default()
        };
        let _ = report.coin_delta();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Tile;

    fn board_from(rows: &[&str]) -> Board {
        let height = rows.len() as u16;
        let width = rows[0].len() as u16;
        let mut board = Board::new(width, height).unwrap();
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                if let Some(category) = Category::from_symbol(symbol) {
                    board
                        .set(Coord::new(x as i32, y as i32), Tile::new(category))
                        .unwrap();
                }
            }
        }
        board
    }

    fn arcade() -> SessionConfig {
        SessionConfig::arcade(5)
    }

    #[test]
    fn test_empty_board_scores_zero() {
        let board = Board::square(5).unwrap();
        assert_eq!(recompute(&board, &arcade()), ScoreReport::default());
    }

    #[test]
    fn test_residential_short_circuit() {
        // R at centre with Industry above, Parks left/right, Commercial below.
        let board = board_from(&[".I.", "PRP", ".C."]);
        assert_eq!(residential_score(&board, Coord::new(1, 1)), 1);
    }

    #[test]
    fn test_residential_accumulates() {
        let board = board_from(&[".R.", "PRP", ".C."]);
        // R(1) + P(2) + P(2) + C(1)
        assert_eq!(residential_score(&board, Coord::new(1, 1)), 6);
    }

    #[test]
    fn test_industry_flat_and_coins() {
        let board = board_from(&["RIR"]);
        let report = recompute(&board, &arcade());
        // Industry 1, each residence scores 1 (industry neighbour).
        assert_eq!(report.score, 3);
        assert_eq!(report.industry_coins, 2);
    }

    #[test]
    fn test_residential_with_two_industries_earns_two_coins() {
        let board = board_from(&["IRI"]);
        let report = recompute(&board, &arcade());
        assert_eq!(report.industry_coins, 2);
    }

    #[test]
    fn test_commercial_score_and_coins() {
        let board = board_from(&["CC", "R."]);
        let report = recompute(&board, &arcade());
        // Each C scores 1 from the other; R scores 1 from the C above it.
        assert_eq!(report.score, 3);
        assert_eq!(report.commercial_coins, 1);
        assert_eq!(report.coin_delta(), 1);
    }

    #[test]
    fn test_park_horizontal_only() {
        let vertical = board_from(&["P", "P", "P"]);
        assert_eq!(recompute(&vertical, &arcade()).score, 0);

        let horizontal = board_from(&["PPP"]);
        assert_eq!(park_score(&horizontal, Coord::new(1, 0)), 2);
        // 1 + 2 + 1
        assert_eq!(recompute(&horizontal, &arcade()).score, 4);
    }

    #[test]
    fn test_road_edge_counted_once() {
        let pair = board_from(&["**"]);
        assert_eq!(recompute(&pair, &arcade()).score, 1);

        let line = board_from(&["****"]);
        assert_eq!(recompute(&line, &arcade()).score, 3);

        let vertical = board_from(&["*", "*"]);
        assert_eq!(recompute(&vertical, &arcade()).score, 0);
    }

    #[test]
    fn test_cluster_detection() {
        let board = board_from(&["RR.", "..R", "..R"]);
        assert!(is_cluster(&board, Coord::new(0, 0)));
        assert_eq!(cluster_size(&board, Coord::new(2, 1)), 2);
        assert_eq!(cluster_size(&board, Coord::new(1, 1)), 0);

        let lone = board_from(&["RI"]);
        assert!(!is_cluster(&lone, Coord::new(0, 0)));
    }

    #[test]
    fn test_profit_and_upkeep() {
        let board = board_from(&["RRI", "CP*"]);
        let report = recompute(&board, &SessionConfig::freeplay());
        // R+R (clustered): profit 2, upkeep 2; I: 2/1; C: 3/2; P: 0/1; *: 0/1
        assert_eq!(report.profit, 7);
        assert_eq!(report.upkeep, 7);
        assert!(!report.is_loss());
    }

    #[test]
    fn test_upkeep_off_in_arcade() {
        let board = board_from(&["RRI"]);
        let report = recompute(&board, &arcade());
        assert_eq!(report.profit, 0);
        assert_eq!(report.upkeep, 0);
    }

    #[test]
    fn test_coin_delta_subtracts_upkeep() {
        let board = board_from(&["PP"]);
        let report = recompute(&board, &SessionConfig::freeplay());
        assert_eq!(report.upkeep, 2);
        assert_eq!(report.coin_delta(), -2);
        assert!(report.is_loss());
    }
}
