use astar_sandbox::search::{SearchOutcome, StepControl};
use astar_sandbox::SandboxGrid;
use grid_util::point::Point;

// In this example a path is painted on a 5x5 grid with shape
// S#...
// .#.#.
// .#.#.
// .#.#E
// ...#.
// where
// - # marks a barrier
// - S marks the start
// - E marks the end
fn main() {
    let mut grid = SandboxGrid::new(5, 400);
    for y in 0..4 {
        grid.set_barrier(Point::new(1, y));
    }
    for y in 1..5 {
        grid.set_barrier(Point::new(3, y));
    }
    grid.set_start(Point::new(0, 0));
    grid.set_end(Point::new(4, 3));
    match grid.run_search(|_| StepControl::Continue) {
        SearchOutcome::PathFound(path) => {
            println!("A path of {} edges has been found:", path.len() - 1);
            for p in path {
                println!("{:?}", p);
            }
            println!("{}", grid);
        }
        outcome => println!("No path: {:?}", outcome),
    }
}
