use crate::direction::Direction;
use crate::maze_grid::{MazeGrid, Pos};
use crate::solver::DirectionField;

/// Per-cell drawing hints for the renderer, derived from the routes of every
/// occupant on the grid.
///
/// For each cell this records a 4-bit connector mask (which of its sides a
/// traced route passes through, see [`Direction::side_bit`]) and at most one
/// arrow direction. The renderer maps the mask to one of the 15 non-empty
/// line sprites and the arrow to a compass glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOverlay {
    rows: usize,
    cols: usize,
    paths: Vec<u8>,
    arrows: Vec<Option<Direction>>,
}

impl PathOverlay {
    /// Traces the route of every occupant and accumulates the overlay.
    ///
    /// The first route to claim a cell decides its arrow; a later route
    /// merges into it and stops extending there, since the remainder of the
    /// way to the goal is already drawn.
    pub fn build(grid: &MazeGrid, field: &DirectionField) -> PathOverlay {
        let mut overlay = PathOverlay {
            rows: grid.rows(),
            cols: grid.cols(),
            paths: vec![0; grid.cell_count()],
            arrows: vec![None; grid.cell_count()],
        };
        for (_, start) in grid.occupants() {
            overlay.absorb(field, start);
        }
        overlay
    }

    fn absorb(&mut self, field: &DirectionField, start: Pos) {
        let mut entry_bit = 0u8;
        let mut at = start;
        loop {
            let ix = self.index(at);
            if entry_bit != 0 {
                self.paths[ix] |= entry_bit;
            }
            let Some(dir) = field.direction(at) else {
                // A goal, or an unreachable start: nothing further to draw.
                break;
            };
            self.paths[ix] |= dir.side_bit();
            if self.arrows[ix].is_some() {
                break;
            }
            self.arrows[ix] = Some(dir);
            entry_bit = dir.opposite().side_bit();
            at = dir.step(at);
        }
    }

    fn index(&self, pos: Pos) -> usize {
        assert!(
            pos.row >= 0
                && pos.col >= 0
                && (pos.row as usize) < self.rows
                && (pos.col as usize) < self.cols,
            "position {pos} out of bounds for {}x{} overlay",
            self.rows,
            self.cols
        );
        pos.row as usize * self.cols + pos.col as usize
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Connector mask of `pos`: 0 if no route touches the cell, otherwise the
    /// OR of the side bits of every route passing through it.
    pub fn path_mask(&self, pos: Pos) -> u8 {
        self.paths[self.index(pos)]
    }

    /// Arrow shown on `pos`, if any route steps out of it.
    pub fn arrow(&self, pos: Pos) -> Option<Direction> {
        self.arrows[self.index(pos)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;
    use std::num::NonZeroU8;

    #[test]
    fn corridor_route_masks() {
        // Goal at column 0, occupant at column 4; route runs straight left.
        let mut grid = MazeGrid::new(1, 5);
        grid.set_goal(Pos::new(0, 0), true);
        grid.set_occupant(Pos::new(0, 4), NonZeroU8::new(1));
        let field = solve(&grid);
        let overlay = PathOverlay::build(&grid, &field);

        // Left exit is 2, right entry is 8.
        let masks: Vec<u8> = (0..5).map(|c| overlay.path_mask(Pos::new(0, c))).collect();
        assert_eq!(masks, vec![8, 10, 10, 10, 2]);
        assert_eq!(overlay.arrow(Pos::new(0, 4)), Some(Direction::Left));
        assert_eq!(overlay.arrow(Pos::new(0, 1)), Some(Direction::Left));
        assert_eq!(overlay.arrow(Pos::new(0, 0)), None);
    }

    #[test]
    fn merging_route_stops_at_existing_arrow() {
        // Goal at (0,0); the occupant at (0,1) draws its route first
        // (row-major), then the one at (1,1) merges into (0,1) and stops.
        let mut grid = MazeGrid::new(2, 2);
        grid.set_goal(Pos::new(0, 0), true);
        grid.set_occupant(Pos::new(0, 1), NonZeroU8::new(1));
        grid.set_occupant(Pos::new(1, 1), NonZeroU8::new(2));
        let field = solve(&grid);
        let overlay = PathOverlay::build(&grid, &field);

        // (0,1) carries its own left exit plus the bottom entry of the
        // merging route; the goal cell only ever received the first route.
        assert_eq!(overlay.path_mask(Pos::new(0, 1)), 0b0110);
        assert_eq!(overlay.path_mask(Pos::new(1, 1)), 0b0001);
        assert_eq!(overlay.path_mask(Pos::new(0, 0)), 0b1000);
        assert_eq!(overlay.arrow(Pos::new(0, 1)), Some(Direction::Left));
        assert_eq!(overlay.arrow(Pos::new(1, 1)), Some(Direction::Up));
    }

    #[test]
    fn unreachable_or_homed_occupants_draw_nothing() {
        let mut grid = MazeGrid::new(1, 3);
        grid.set_goal(Pos::new(0, 0), true);
        grid.set_wall_left(Pos::new(0, 2), true);
        grid.set_occupant(Pos::new(0, 2), NonZeroU8::new(1));
        let field = solve(&grid);
        let overlay = PathOverlay::build(&grid, &field);
        for c in 0..3 {
            assert_eq!(overlay.path_mask(Pos::new(0, c)), 0);
            assert_eq!(overlay.arrow(Pos::new(0, c)), None);
        }
    }
}
