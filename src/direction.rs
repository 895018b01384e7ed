use core::fmt;

use crate::maze_grid::Pos;

/// One of the four orthogonal movement directions on the grid.
///
/// The enumeration order is significant: [`Direction::CARDINALS`] fixes the
/// neighbour traversal order (Right, Down, Left, Up) used by the solver, which
/// makes its output deterministic for a given grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// The fixed neighbour enumeration order used throughout the crate.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// The `(row, col)` delta of a single step in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }

    /// The position one step away. May leave the grid; callers bounds-check.
    pub fn step(self, pos: Pos) -> Pos {
        let (d_row, d_col) = self.offset();
        Pos::new(pos.row + d_row, pos.col + d_col)
    }

    /// Arrow glyph used in [`fmt::Display`] dumps and by the renderer to pick
    /// an arrow sprite.
    pub fn glyph(self) -> char {
        match self {
            Direction::Right => '>',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Up => '^',
        }
    }

    /// Connector bit of the cell side a step in this direction exits through:
    /// 1 = top, 2 = left, 4 = bottom, 8 = right. The renderer ORs these into a
    /// 4-bit mask per cell to select one of the 15 line sprites.
    pub fn side_bit(self) -> u8 {
        match self {
            Direction::Right => 0b1000,
            Direction::Down => 0b0100,
            Direction::Left => 0b0010,
            Direction::Up => 0b0001,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}
