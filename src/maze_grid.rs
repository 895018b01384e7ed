use core::fmt;
use std::error::Error;
use std::num::NonZeroU8;

use itertools::Itertools;
use log::debug;
use smallvec::SmallVec;

use crate::direction::Direction;

/// Bit 0 of a packed flag byte: the cell is a goal ("castle").
pub const FLAG_GOAL: u8 = 0b0000_0001;
/// Bit 1: a wall on the edge shared with the cell one column to the left.
pub const FLAG_WALL_LEFT: u8 = 0b0000_0010;
/// Bit 2: a wall on the edge shared with the cell one row above.
pub const FLAG_WALL_TOP: u8 = 0b0000_0100;
/// Bits 3-7 hold the occupant id (0 = none, 1..=31 = agent identity).
const OCCUPANT_SHIFT: u32 = 3;

/// A grid position as `(row, col)`, with row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub fn new(row: i32, col: i32) -> Pos {
        Pos { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One decoded grid cell.
///
/// Wall ownership follows the packed encoding: a cell stores the wall on its
/// own left and top edges; the walls on its right and bottom edges belong to
/// the respective neighbours. Wall flags pointing off the grid are carried but
/// meaningless, [`MazeGrid::passable`] never consults them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub goal: bool,
    pub wall_left: bool,
    pub wall_top: bool,
    pub occupant: Option<NonZeroU8>,
}

impl Cell {
    /// Decodes one packed flag byte: bit 0 goal, bit 1 left wall, bit 2 top
    /// wall, bits 3-7 occupant id. The editor keeps goal and occupant
    /// mutually exclusive; if a malformed byte carries both, the goal wins.
    pub fn from_flags(flags: u8) -> Cell {
        let goal = flags & FLAG_GOAL != 0;
        Cell {
            goal,
            wall_left: flags & FLAG_WALL_LEFT != 0,
            wall_top: flags & FLAG_WALL_TOP != 0,
            occupant: if goal {
                None
            } else {
                NonZeroU8::new(flags >> OCCUPANT_SHIFT)
            },
        }
    }

    /// Re-packs the cell into the editor's flag byte.
    pub fn to_flags(self) -> u8 {
        let mut flags = 0u8;
        if self.goal {
            flags |= FLAG_GOAL;
        }
        if self.wall_left {
            flags |= FLAG_WALL_LEFT;
        }
        if self.wall_top {
            flags |= FLAG_WALL_TOP;
        }
        if let Some(id) = self.occupant {
            flags |= id.get() << OCCUPANT_SHIFT;
        }
        flags
    }
}

/// Error produced by [`MazeGrid::from_text`]. A failed parse constructs no
/// grid, so a caller holding a previous grid keeps it untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseGridError {
    /// The input holds no rows at all.
    Empty,
    /// A row with a different number of columns than the first row.
    RaggedRow {
        line: usize,
        expected: usize,
        got: usize,
    },
    /// A token that is not a flag byte in `0..=255`.
    InvalidToken { line: usize, token: String },
}

impl fmt::Display for ParseGridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseGridError::Empty => write!(f, "grid text contains no rows"),
            ParseGridError::RaggedRow {
                line,
                expected,
                got,
            } => write!(f, "line {line}: expected {expected} columns, got {got}"),
            ParseGridError::InvalidToken { line, token } => {
                write!(f, "line {line}: invalid cell flags {token:?}")
            }
        }
    }
}

impl Error for ParseGridError {}

/// Wall-edge maze topology: a rectangular grid of [`Cell`]s with walls sitting
/// on the edges between adjacent cells.
///
/// The editor mutates the grid cell by cell; the solver only ever reads a
/// snapshot of it through [`passable`](Self::passable), [`is_goal`](Self::is_goal)
/// and [`neighbors`](Self::neighbors). All positional accessors treat an
/// out-of-bounds position as a contract violation and panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl MazeGrid {
    /// Creates an open grid: no walls, no goals, no occupants.
    pub fn new(rows: usize, cols: usize) -> MazeGrid {
        assert!(
            rows <= i32::MAX as usize && cols <= i32::MAX as usize,
            "grid dimensions {rows}x{cols} exceed the supported coordinate range"
        );
        MazeGrid {
            cells: vec![Cell::default(); rows * cols],
            rows,
            cols,
        }
    }

    /// Builds a grid from the editor's flat row-major flag bytes.
    pub fn from_flags(rows: usize, cols: usize, flags: &[u8]) -> MazeGrid {
        assert_eq!(
            flags.len(),
            rows * cols,
            "flag array of length {} does not match a {rows}x{cols} grid",
            flags.len()
        );
        let mut grid = MazeGrid::new(rows, cols);
        for (cell, &byte) in grid.cells.iter_mut().zip(flags) {
            *cell = Cell::from_flags(byte);
        }
        grid
    }

    /// Re-packs every cell into the editor's flat flag-byte array.
    pub fn to_flags(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.to_flags()).collect()
    }

    /// Parses the persisted grid format: one row per line, whitespace-separated
    /// flag bytes. Blank lines are skipped.
    pub fn from_text(text: &str) -> Result<MazeGrid, ParseGridError> {
        let mut cells: Vec<Cell> = Vec::new();
        let mut cols = 0usize;
        let mut rows = 0usize;
        for (ix, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = ix + 1;
            let start = cells.len();
            for token in line.split_whitespace() {
                let byte: u8 = token.parse().map_err(|_| ParseGridError::InvalidToken {
                    line: line_no,
                    token: token.to_owned(),
                })?;
                cells.push(Cell::from_flags(byte));
            }
            let got = cells.len() - start;
            if rows == 0 {
                cols = got;
            } else if got != cols {
                return Err(ParseGridError::RaggedRow {
                    line: line_no,
                    expected: cols,
                    got,
                });
            }
            rows += 1;
        }
        if rows == 0 || cols == 0 {
            return Err(ParseGridError::Empty);
        }
        debug!("parsed {rows}x{cols} grid from text");
        Ok(MazeGrid { cells, rows, cols })
    }

    /// Serialises the grid back into the persisted text format.
    pub fn to_text(&self) -> String {
        let mut text = (0..self.rows)
            .map(|r| {
                (0..self.cols)
                    .map(|c| {
                        self.cell(Pos::new(r as i32, c as i32))
                            .to_flags()
                            .to_string()
                    })
                    .join(" ")
            })
            .join("\n");
        text.push('\n');
        text
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows
            && (pos.col as usize) < self.cols
    }

    fn index(&self, pos: Pos) -> usize {
        assert!(
            self.in_bounds(pos),
            "position {pos} out of bounds for {}x{} grid",
            self.rows,
            self.cols
        );
        pos.row as usize * self.cols + pos.col as usize
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[self.index(pos)]
    }

    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        let ix = self.index(pos);
        self.cells[ix] = cell;
    }

    /// Places or removes a goal. Placing one evicts any occupant, mirroring
    /// the exclusivity rule of the packed encoding.
    pub fn set_goal(&mut self, pos: Pos, goal: bool) {
        let ix = self.index(pos);
        self.cells[ix].goal = goal;
        if goal {
            self.cells[ix].occupant = None;
        }
    }

    /// Places or removes an occupant. Placing one clears the goal flag.
    pub fn set_occupant(&mut self, pos: Pos, occupant: Option<NonZeroU8>) {
        let ix = self.index(pos);
        self.cells[ix].occupant = occupant;
        if occupant.is_some() {
            self.cells[ix].goal = false;
        }
    }

    pub fn set_wall_left(&mut self, pos: Pos, wall: bool) {
        let ix = self.index(pos);
        self.cells[ix].wall_left = wall;
    }

    pub fn set_wall_top(&mut self, pos: Pos, wall: bool) {
        let ix = self.index(pos);
        self.cells[ix].wall_top = wall;
    }

    pub fn is_goal(&self, pos: Pos) -> bool {
        self.cell(pos).goal
    }

    /// Whether a step from `pos` in `dir` stays on the grid and crosses no
    /// wall. The wall on a shared edge is stored on the higher-row or
    /// higher-column cell, so Right/Down consult the destination cell and
    /// Left/Up consult `pos` itself. Passability is symmetric by construction.
    pub fn passable(&self, pos: Pos, dir: Direction) -> bool {
        let from = self.cell(pos);
        let to = dir.step(pos);
        if !self.in_bounds(to) {
            return false;
        }
        match dir {
            Direction::Right => !self.cell(to).wall_left,
            Direction::Down => !self.cell(to).wall_top,
            Direction::Left => !from.wall_left,
            Direction::Up => !from.wall_top,
        }
    }

    /// The passable neighbours of `pos`, in the fixed
    /// [`Direction::CARDINALS`] order.
    pub fn neighbors(&self, pos: Pos) -> SmallVec<[(Direction, Pos); 4]> {
        Direction::CARDINALS
            .into_iter()
            .filter(|&dir| self.passable(pos, dir))
            .map(|dir| (dir, dir.step(pos)))
            .collect()
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let cols = self.cols;
        (0..self.rows)
            .flat_map(move |r| (0..cols).map(move |c| Pos::new(r as i32, c as i32)))
    }

    /// All goal cells in row-major order. This order seeds the solver's
    /// frontier, so it is part of the deterministic-output contract.
    pub fn goals(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(move |&p| self.cell(p).goal)
    }

    /// All occupants as `(id, position)` in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = (NonZeroU8, Pos)> + '_ {
        self.positions()
            .filter_map(move |p| self.cell(p).occupant.map(|id| (id, p)))
    }
}

impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let cell = self.cell(Pos::new(r as i32, c as i32));
                f.write_str(if r == 0 || cell.wall_top { "+-" } else { "+ " })?;
            }
            writeln!(f, "+")?;
            for c in 0..self.cols {
                let cell = self.cell(Pos::new(r as i32, c as i32));
                let wall = if c == 0 || cell.wall_left { '|' } else { ' ' };
                let glyph = if cell.goal {
                    'X'
                } else if let Some(id) = cell.occupant {
                    char::from_digit(id.get() as u32, 36).unwrap_or('?')
                } else {
                    '.'
                };
                write!(f, "{wall}{glyph}")?;
            }
            writeln!(f, "|")?;
        }
        for _ in 0..self.cols {
            f.write_str("+-")?;
        }
        writeln!(f, "+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_goal_wins_over_occupant() {
        let cell = Cell::from_flags(0b0000_1001);
        assert!(cell.goal);
        assert_eq!(cell.occupant, None);
    }

    #[test]
    fn decode_occupant_and_walls() {
        let cell = Cell::from_flags(0b0001_0110);
        assert!(!cell.goal);
        assert!(cell.wall_left);
        assert!(cell.wall_top);
        assert_eq!(cell.occupant, NonZeroU8::new(2));
    }

    #[test]
    fn flags_round_trip() {
        for flags in [0u8, 0b001, 0b010, 0b100, 0b111, 0b0000_1000, 0b1111_1110] {
            assert_eq!(Cell::from_flags(flags).to_flags(), flags);
        }
    }

    #[test]
    fn passability_is_symmetric() {
        let mut grid = MazeGrid::new(3, 3);
        grid.set_wall_left(Pos::new(1, 1), true);
        grid.set_wall_top(Pos::new(2, 1), true);
        grid.set_wall_top(Pos::new(1, 2), true);
        for pos in grid.positions().collect::<Vec<_>>() {
            for dir in Direction::CARDINALS {
                let to = dir.step(pos);
                if grid.in_bounds(to) {
                    assert_eq!(
                        grid.passable(pos, dir),
                        grid.passable(to, dir.opposite()),
                        "asymmetric edge {pos} {dir}"
                    );
                }
            }
        }
    }

    #[test]
    fn boundary_wall_flags_are_ignored() {
        let mut grid = MazeGrid::new(2, 2);
        grid.set_wall_left(Pos::new(0, 0), true);
        grid.set_wall_top(Pos::new(0, 0), true);
        // The flags refer to edges with no neighbour; movement off the grid
        // is impassable either way and the in-grid edges stay open.
        assert!(!grid.passable(Pos::new(0, 0), Direction::Left));
        assert!(!grid.passable(Pos::new(0, 0), Direction::Up));
        assert_eq!(grid.neighbors(Pos::new(0, 0)).len(), 2);
    }

    #[test]
    fn neighbors_follow_cardinal_order() {
        let grid = MazeGrid::new(3, 3);
        let center = Pos::new(1, 1);
        let dirs: Vec<Direction> = grid.neighbors(center).iter().map(|&(d, _)| d).collect();
        assert_eq!(dirs, Direction::CARDINALS.to_vec());
        assert_eq!(
            grid.neighbors(center)[0],
            (Direction::Right, Pos::new(1, 2))
        );
    }

    #[test]
    fn walls_block_both_sides() {
        let mut grid = MazeGrid::new(1, 2);
        grid.set_wall_left(Pos::new(0, 1), true);
        assert!(!grid.passable(Pos::new(0, 0), Direction::Right));
        assert!(!grid.passable(Pos::new(0, 1), Direction::Left));
    }

    #[test]
    fn goal_and_occupant_setters_are_exclusive() {
        let mut grid = MazeGrid::new(1, 1);
        let pos = Pos::new(0, 0);
        grid.set_occupant(pos, NonZeroU8::new(3));
        grid.set_goal(pos, true);
        assert_eq!(grid.cell(pos).occupant, None);
        grid.set_occupant(pos, NonZeroU8::new(3));
        assert!(!grid.cell(pos).goal);
    }

    #[test]
    fn parse_text_round_trip() {
        let text = "1 0 8\n0 6 0\n";
        let grid = MazeGrid::from_text(text).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert!(grid.is_goal(Pos::new(0, 0)));
        assert_eq!(grid.cell(Pos::new(0, 2)).occupant, NonZeroU8::new(1));
        assert!(grid.cell(Pos::new(1, 1)).wall_left);
        assert!(grid.cell(Pos::new(1, 1)).wall_top);
        assert_eq!(grid.to_text(), text);
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let err = MazeGrid::from_text("1 0\n0\n").unwrap_err();
        assert_eq!(
            err,
            ParseGridError::RaggedRow {
                line: 2,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn parse_rejects_bad_tokens() {
        let err = MazeGrid::from_text("1 256\n").unwrap_err();
        assert_eq!(
            err,
            ParseGridError::InvalidToken {
                line: 1,
                token: "256".to_owned()
            }
        );
        assert!(MazeGrid::from_text("\n  \n").unwrap_err() == ParseGridError::Empty);
    }

    #[test]
    fn flags_array_round_trip() {
        let flags = [1u8, 0, 2, 4, 16, 0];
        let grid = MazeGrid::from_flags(2, 3, &flags);
        assert_eq!(grid.to_flags(), flags.to_vec());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_access_panics() {
        MazeGrid::new(2, 2).cell(Pos::new(2, 0));
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn mismatched_flag_length_panics() {
        MazeGrid::from_flags(2, 2, &[0, 0, 0]);
    }
}
