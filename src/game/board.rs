//! Board, tile and category types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// A coordinate on the board.
///
/// Signed so that requests left of or above the board can be expressed and
/// rejected with [`GameError::OutOfBounds`] instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate shifted by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Get adjacent coordinates (up, down, left, right).
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains in-bounds coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, width: u16, height: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;
        let (w, h) = (i32::from(width), i32::from(height));

        for candidate in [
            self.offset(0, -1), // up
            self.offset(0, 1),  // down
            self.offset(-1, 0), // left
            self.offset(1, 0),  // right
        ] {
            if candidate.x >= 0 && candidate.x < w && candidate.y >= 0 && candidate.y < h {
                result[count as usize] = candidate;
                count += 1;
            }
        }

        (result, count)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Building category of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Housing. Scores from neighbours, earns coins next to industry.
    Residential,
    /// Factories. Flat score, feeds residential coin income.
    Industry,
    /// Shops. Scores from commercial neighbours, earns coins from residents.
    Commercial,
    /// Green space. Scores from horizontal park neighbours only.
    Park,
    /// Streets. Scores once per horizontal road connection.
    Road,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 5] = [
        Category::Residential,
        Category::Industry,
        Category::Commercial,
        Category::Park,
        Category::Road,
    ];

    /// Single-character map symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Category::Residential => 'R',
            Category::Industry => 'I',
            Category::Commercial => 'C',
            Category::Park => 'P',
            Category::Road => '*',
        }
    }

    /// Parse a map symbol (case-insensitive for letters).
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'R' => Some(Category::Residential),
            'I' => Some(Category::Industry),
            'C' => Some(Category::Commercial),
            'P' => Some(Category::Park),
            '*' => Some(Category::Road),
            _ => None,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Category::Residential => "Residential",
            Category::Industry => "Industry",
            Category::Commercial => "Commercial",
            Category::Park => "Park",
            Category::Road => "Road",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Category::from_symbol(c).ok_or_else(|| format!("unknown building symbol '{c}'"));
        }
        Category::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown building '{s}'"))
    }
}

/// A placed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Category of the building.
    pub category: Category,
}

impl Tile {
    /// Create a tile of the given category.
    #[must_use]
    pub const fn new(category: Category) -> Self {
        Self { category }
    }
}

/// The city grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Width of the board in cells.
    width: u16,
    /// Height of the board in cells.
    height: u16,
    /// Cells stored in row-major order.
    cells: Vec<Option<Tile>>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            cells: vec![None; size],
        })
    }

    /// Create an empty square board.
    #[must_use]
    pub fn square(size: u16) -> Option<Self> {
        Self::new(size, size)
    }

    /// Get the width of the board.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the board.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Option<Tile>] {
        &self.cells
    }

    /// Check if a coordinate is within the board bounds.
    #[must_use]
    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.x < i32::from(self.width)
            && coord.y < i32::from(self.height)
    }

    /// Check if a coordinate lies on the outermost ring of cells.
    #[must_use]
    pub fn is_border(&self, coord: Coord) -> bool {
        self.is_in_bounds(coord)
            && (coord.x == 0
                || coord.y == 0
                || coord.x == i32::from(self.width) - 1
                || coord.y == i32::from(self.height) - 1)
    }

    /// Convert a coordinate to an index into the cell array.
    #[allow(clippy::cast_sign_loss)]
    fn index(&self, coord: Coord) -> GameResult<usize> {
        if self.is_in_bounds(coord) {
            Ok(coord.y as usize * usize::from(self.width) + coord.x as usize)
        } else {
            Err(GameError::OutOfBounds {
                x: coord.x,
                y: coord.y,
            })
        }
    }

    /// Get the tile at the given coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] if the coordinate is off the board.
    pub fn get(&self, coord: Coord) -> GameResult<Option<Tile>> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Category at a coordinate, or `None` when empty or off the board.
    #[must_use]
    #[inline]
    pub fn category_at(&self, coord: Coord) -> Option<Category> {
        self.get(coord).ok().flatten().map(|tile| tile.category)
    }

    /// Set the tile at the given coordinate, overwriting whatever is there.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] if the coordinate is off the board.
    pub fn set(&mut self, coord: Coord, tile: Tile) -> GameResult<()> {
        let idx = self.index(coord)?;
        self.cells[idx] = Some(tile);
        Ok(())
    }

    /// Empty the cell at the given coordinate, returning the removed tile.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] off the board and
    /// [`GameError::NothingToDemolish`] if the cell is already empty.
    pub fn clear(&mut self, coord: Coord) -> GameResult<Tile> {
        let idx = self.index(coord)?;
        self.cells[idx].take().ok_or(GameError::NothingToDemolish {
            x: coord.x,
            y: coord.y,
        })
    }

    /// True iff no empty cell remains.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// True iff no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// In-bounds neighbours of a coordinate, in up, down, left, right order.
    pub fn neighbors4(&self, coord: Coord) -> impl Iterator<Item = Coord> + use<> {
        let (adjacent, count) = coord.adjacent(self.width, self.height);
        adjacent.into_iter().take(usize::from(count))
    }

    /// True iff any 4-neighbour of the coordinate is occupied.
    #[must_use]
    pub fn has_occupied_neighbor(&self, coord: Coord) -> bool {
        self.neighbors4(coord)
            .any(|adj| self.category_at(adj).is_some())
    }

    /// Iterate over all coordinates and cells.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Option<Tile>)> + '_ {
        let width = usize::from(self.width);
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            let x = (idx % width) as i32;
            let y = (idx / width) as i32;
            (Coord::new(x, y), *cell)
        })
    }

    /// Iterate over occupied cells only.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, Tile)> + '_ {
        self.iter().filter_map(|(coord, cell)| cell.map(|tile| (coord, tile)))
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Tile>]> + '_ {
        self.cells.chunks(usize::from(self.width))
    }

    /// Copy this board into the centre of a board of at least the given size.
    ///
    /// The old content lands at `[offset, offset + old)` on each axis where
    /// `offset = (new - old) / 2`. Requested dimensions smaller than the
    /// current ones are raised to the current ones, so this never shrinks.
    #[must_use]
    pub fn resize_centered(&self, new_width: u16, new_height: u16) -> Board {
        let width = new_width.max(self.width);
        let height = new_height.max(self.height);
        let offset_x = usize::from((width - self.width) / 2);
        let offset_y = usize::from((height - self.height) / 2);

        let mut cells = vec![None; usize::from(width) * usize::from(height)];
        for (row_idx, row) in self.rows().enumerate() {
            let start = (row_idx + offset_y) * usize::from(width) + offset_x;
            cells[start..start + row.len()].copy_from_slice(row);
        }

        Board {
            width,
            height,
            cells,
        }
    }
}
