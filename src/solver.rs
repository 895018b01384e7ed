use core::fmt;
use std::collections::VecDeque;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use log::debug;

use crate::direction::Direction;
use crate::maze_grid::{MazeGrid, Pos};

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// What the solver knows about one reachable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEntry {
    /// Steps to the nearest goal.
    pub distance: u32,
    /// Next hop toward that goal; `None` on the goals themselves.
    pub direction: Option<Direction>,
}

/// The solver's output: for every cell reachable from some goal, the distance
/// to the nearest goal and the single next step toward it.
///
/// Cells absent from the field are unreachable. Goal cells are present with
/// distance 0 and no direction. The field is a plain value: it holds no
/// reference to the grid it was solved from and is discarded wholesale when
/// the editor re-solves after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionField {
    rows: usize,
    cols: usize,
    entries: FxIndexMap<Pos, FieldEntry>,
}

impl DirectionField {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of reachable cells, goals included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, pos: Pos) -> Option<FieldEntry> {
        self.entries.get(&pos).copied()
    }

    /// Whether `pos` can reach some goal (true for the goals themselves).
    pub fn is_reachable(&self, pos: Pos) -> bool {
        self.entries.contains_key(&pos)
    }

    pub fn distance(&self, pos: Pos) -> Option<u32> {
        self.entry(pos).map(|e| e.distance)
    }

    /// The next hop from `pos` toward its nearest goal. `None` means `pos` is
    /// either a goal or unreachable; [`is_reachable`](Self::is_reachable)
    /// distinguishes the two.
    pub fn direction(&self, pos: Pos) -> Option<Direction> {
        self.entry(pos).and_then(|e| e.direction)
    }

    /// Entries in BFS discovery order (goals first, then distance layers).
    pub fn iter(&self) -> impl Iterator<Item = (Pos, FieldEntry)> + '_ {
        self.entries.iter().map(|(&pos, &entry)| (pos, entry))
    }

    /// Starts a walk from `start` toward its nearest goal. Each call is
    /// independent, so a trace can be restarted at will.
    pub fn trace(&self, start: Pos) -> Trace<'_> {
        Trace {
            field: self,
            at: start,
            steps: 0,
        }
    }
}

impl fmt::Display for DirectionField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let glyph = match self.entry(Pos::new(r as i32, c as i32)) {
                    Some(FieldEntry {
                        direction: Some(dir),
                        ..
                    }) => dir.glyph(),
                    Some(_) => 'X',
                    None => '.',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Lazy walk along the direction field, yielding `(position, next hop)` pairs
/// until a cell with no direction entry is reached (a goal, or the start
/// itself if it is unreachable).
///
/// Distances strictly decrease along the walk, so a well-formed field
/// terminates within `rows * cols` hops; exceeding that bound means the field
/// is internally inconsistent and is treated as a contract violation.
#[derive(Clone)]
pub struct Trace<'a> {
    field: &'a DirectionField,
    at: Pos,
    steps: usize,
}

impl Iterator for Trace<'_> {
    type Item = (Pos, Direction);

    fn next(&mut self) -> Option<(Pos, Direction)> {
        let dir = self.field.direction(self.at)?;
        assert!(
            self.steps < self.field.rows * self.field.cols,
            "direction field cycle detected at {}",
            self.at
        );
        self.steps += 1;
        let hop = (self.at, dir);
        self.at = dir.step(self.at);
        Some(hop)
    }
}

/// Floods the grid breadth-first from every goal cell at once and records, per
/// reached cell, the distance and the step leading one cell closer to a goal.
///
/// Neighbours are expanded in the fixed Right, Down, Left, Up order and the
/// first writer wins, so for a given grid the output is fully deterministic.
/// An empty goal set yields an empty field.
pub fn solve(grid: &MazeGrid) -> DirectionField {
    let mut entries =
        FxIndexMap::with_capacity_and_hasher(grid.cell_count(), FxBuildHasher::default());
    let mut frontier = VecDeque::new();
    for goal in grid.goals() {
        entries.insert(
            goal,
            FieldEntry {
                distance: 0,
                direction: None,
            },
        );
        frontier.push_back(goal);
    }
    let goal_count = frontier.len();
    while let Some(pos) = frontier.pop_front() {
        let distance = entries[&pos].distance;
        for (dir, next) in grid.neighbors(pos) {
            if entries.contains_key(&next) {
                continue;
            }
            // The neighbour's next hop points back at the cell it was
            // discovered from, one step closer to a goal.
            entries.insert(
                next,
                FieldEntry {
                    distance: distance + 1,
                    direction: Some(dir.opposite()),
                },
            );
            frontier.push_back(next);
        }
    }
    debug!(
        "flooded {} of {} cells from {} goal(s)",
        entries.len(),
        grid.cell_count(),
        goal_count
    );
    DirectionField {
        rows: grid.rows(),
        cols: grid.cols(),
        entries,
    }
}
