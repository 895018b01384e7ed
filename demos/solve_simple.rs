use edgemaze::{solve, MazeGrid, Pos};

// Solves a 3x3 maze with shape
//  +-+-+-+
//  |.   X|
//  + +-+ +
//  |.|. .|
//  + + + +
//  |. . .|
//  +-+-+-+
// where X marks the castle, and prints the resulting direction field.

fn main() {
    let mut grid = MazeGrid::new(3, 3);
    grid.set_goal(Pos::new(0, 2), true);
    grid.set_wall_top(Pos::new(1, 1), true);
    grid.set_wall_left(Pos::new(1, 1), true);
    println!("{grid}");

    let field = solve(&grid);
    println!("{field}");
    for (pos, entry) in field.iter() {
        println!(
            "{pos}: distance {}, next hop {}",
            entry.distance,
            entry
                .direction
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_owned())
        );
    }
}
