use astar_sandbox::search::{SearchOutcome, StepControl};
use astar_sandbox::SandboxGrid;
use grid_util::point::Point;

// Prints the grid after every search step, showing the frontier (o), the
// closed set (x) and finally the reconstructed path (*) growing cell by
// cell. This is what a rendering collaborator would draw each frame.
fn main() {
    let mut grid = SandboxGrid::new(8, 640);
    for y in 2..8 {
        grid.set_barrier(Point::new(3, y));
    }
    for y in 0..6 {
        grid.set_barrier(Point::new(5, y));
    }
    grid.set_start(Point::new(0, 7));
    grid.set_end(Point::new(7, 0));
    let mut step = 0;
    let outcome = grid.run_search(|view| {
        step += 1;
        println!("step {}:", step);
        println!("{}", view);
        StepControl::Continue
    });
    match outcome {
        SearchOutcome::PathFound(path) => {
            println!("final grid:");
            println!("{}", grid);
            println!("path length: {} edges", path.len() - 1);
        }
        outcome => println!("no path: {:?}", outcome),
    }
}
