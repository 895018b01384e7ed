//! # edgemaze
//!
//! Maze analysis for hand-drawn grids with walls on cell *edges* rather than
//! full blocked tiles. Given a grid of packed cell flags (goals, edge walls,
//! occupants), a single breadth-first flood from all goal cells at once
//! produces a [`DirectionField`]: for every reachable cell, its distance to
//! the nearest goal and the one step that moves it closer. From the field,
//! [`DirectionField::trace`] walks any cell's route hop by hop and
//! [`PathOverlay`] turns the routes of all occupants into the connector masks
//! and arrow picks a sprite renderer needs.
//!
//! Since every edge has unit cost, plain BFS already yields shortest paths;
//! neighbours are expanded in a fixed Right, Down, Left, Up order so repeated
//! solves of the same grid are byte-for-byte identical.
//!
//! ```
//! use edgemaze::{solve, Direction, MazeGrid, Pos};
//!
//! let mut grid = MazeGrid::new(1, 3);
//! grid.set_goal(Pos::new(0, 0), true);
//! let field = solve(&grid);
//! assert_eq!(field.distance(Pos::new(0, 2)), Some(2));
//! assert_eq!(field.direction(Pos::new(0, 2)), Some(Direction::Left));
//! ```

pub mod direction;
pub mod maze_grid;
pub mod overlay;
pub mod solver;

pub use direction::Direction;
pub use maze_grid::{Cell, MazeGrid, ParseGridError, Pos};
pub use overlay::PathOverlay;
pub use solver::{solve, DirectionField, FieldEntry, Trace};
