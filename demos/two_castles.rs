use std::num::NonZeroU8;

use edgemaze::{solve, MazeGrid, PathOverlay, Pos};

// Two castles and two agents on a 4x4 grid; each agent is routed to its
// nearest castle and the combined routes are turned into renderer hints.

fn main() {
    let mut grid = MazeGrid::new(4, 4);
    grid.set_goal(Pos::new(0, 3), true);
    grid.set_goal(Pos::new(3, 0), true);
    grid.set_wall_left(Pos::new(1, 2), true);
    grid.set_wall_top(Pos::new(2, 1), true);
    grid.set_occupant(Pos::new(3, 3), NonZeroU8::new(1));
    grid.set_occupant(Pos::new(1, 0), NonZeroU8::new(2));
    println!("{grid}");

    let field = solve(&grid);
    println!("{field}");

    for (id, start) in grid.occupants() {
        let hops: Vec<String> = field
            .trace(start)
            .map(|(pos, dir)| format!("{pos}{dir}"))
            .collect();
        println!("agent {id} from {start}: {}", hops.join(" "));
    }

    let overlay = PathOverlay::build(&grid, &field);
    for pos in grid.positions() {
        if let Some(arrow) = overlay.arrow(pos) {
            println!(
                "{pos}: arrow {arrow}, line sprite {:#06b}",
                overlay.path_mask(pos)
            );
        }
    }
}
