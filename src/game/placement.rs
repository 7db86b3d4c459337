//! Placement legality.

use crate::error::{GameError, GameResult};
use crate::game::{Board, Coord};

/// Where a new building may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRule {
    /// Must touch an occupied cell (after the first placement).
    Adjacent,
    /// Any empty in-bounds cell.
    Anywhere,
}

impl PlacementRule {
    /// Pick the rule from a `require_adjacency` flag.
    #[must_use]
    pub const fn from_flag(require_adjacency: bool) -> Self {
        if require_adjacency {
            PlacementRule::Adjacent
        } else {
            PlacementRule::Anywhere
        }
    }

    /// Check a placement, reporting why it is refused.
    ///
    /// The first placement of a game is always free. Both `turn_number == 0`
    /// and an empty board count as "first", since a restored game can carry a
    /// non-zero turn count on a cleared board.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`], [`GameError::CellOccupied`] or
    /// [`GameError::InvalidPlacement`].
    pub fn check(self, board: &Board, turn_number: u32, coord: Coord) -> GameResult<()> {
        if board.get(coord)?.is_some() {
            return Err(GameError::CellOccupied {
                x: coord.x,
                y: coord.y,
            });
        }

        if turn_number == 0 || board.is_empty() {
            return Ok(());
        }

        match self {
            PlacementRule::Anywhere => Ok(()),
            PlacementRule::Adjacent if board.has_occupied_neighbor(coord) => Ok(()),
            PlacementRule::Adjacent => Err(GameError::InvalidPlacement {
                x: coord.x,
                y: coord.y,
            }),
        }
    }

    /// True iff a building may be placed at `coord`.
    #[must_use]
    pub fn is_legal(self, board: &Board, turn_number: u32, coord: Coord) -> bool {
        self.check(board, turn_number, coord).is_ok()
    }

    /// Every cell where a building may currently be placed.
    pub fn legal_cells(self, board: &Board, turn_number: u32) -> impl Iterator<Item = Coord> + '_ {
        board
            .iter()
            .map(|(coord, _)| coord)
            .filter(move |&coord| self.is_legal(board, turn_number, coord))
    }
}

/// Convenience form of [`PlacementRule::is_legal`].
#[must_use]
pub fn is_legal(board: &Board, turn_number: u32, coord: Coord, require_adjacency: bool) -> bool {
    PlacementRule::from_flag(require_adjacency).is_legal(board, turn_number, coord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Category, Tile};

    fn board_with_center() -> Board {
        let mut board = Board::square(5).unwrap();
        board
            .set(Coord::new(2, 2), Tile::new(Category::Residential))
            .unwrap();
        board
    }

    #[test]
    fn test_first_placement_anywhere() {
        let board = Board::square(5).unwrap();
        for (coord, _) in board.iter() {
            assert!(is_legal(&board, 0, coord, true));
        }
    }

    #[test]
    fn test_empty_board_with_later_turn() {
        let board = Board::square(5).unwrap();
        assert!(is_legal(&board, 7, Coord::new(4, 4), true));
    }

    #[test]
    fn test_turn_zero_on_occupied_board() {
        let board = board_with_center();
        assert!(is_legal(&board, 0, Coord::new(0, 0), true));
    }

    #[test]
    fn test_adjacency_required() {
        let board = board_with_center();
        assert!(is_legal(&board, 1, Coord::new(2, 1), true));
        assert!(is_legal(&board, 1, Coord::new(3, 2), true));
        assert!(!is_legal(&board, 1, Coord::new(3, 3), true)); // diagonal
        assert_eq!(
            PlacementRule::Adjacent.check(&board, 1, Coord::new(0, 0)),
            Err(GameError::InvalidPlacement { x: 0, y: 0 })
        );
    }

    #[test]
    fn test_anywhere_rule() {
        let board = board_with_center();
        assert!(is_legal(&board, 1, Coord::new(0, 0), false));
    }

    #[test]
    fn test_occupied_and_out_of_bounds() {
        let board = board_with_center();
        assert_eq!(
            PlacementRule::Anywhere.check(&board, 1, Coord::new(2, 2)),
            Err(GameError::CellOccupied { x: 2, y: 2 })
        );
        assert_eq!(
            PlacementRule::Anywhere.check(&board, 1, Coord::new(5, 0)),
            Err(GameError::OutOfBounds { x: 5, y: 0 })
        );
    }

    #[test]
    fn test_legal_cells() {
        let board = board_with_center();
        let cells: Vec<_> = PlacementRule::Adjacent.legal_cells(&board, 1).collect();
        assert_eq!(cells.len(), 4);
    }
}
