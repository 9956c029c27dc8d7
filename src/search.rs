//! The A* engine and path reconstructor. Operates on the neighbour lists
//! the grid computed up front and mutates node states (open/closed/path) as
//! it goes, so a caller can render progress from inside the step callback.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use grid_util::point::Point;
use log::info;

use crate::SandboxGrid;

/// Score sentinel for cells the search has not reached yet. Strictly larger
/// than any finite score on the grid.
const INFINITY: u32 = u32::MAX;

/// Signal returned by the caller's step callback at every step boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepControl {
    Continue,
    /// Abort the search promptly, leaving grid state as-is.
    Cancel,
}

/// Outcome of one engine invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A shortest path exists; carries the ordered start-to-end cell
    /// sequence (edge count = `len() - 1`).
    PathFound(Vec<Point>),
    /// The frontier emptied without reaching the end cell.
    NoPathExists,
    /// The step callback requested termination before the search completed.
    Cancelled,
}

/// Manhattan distance. Admissible and consistent on a 4-connected
/// unit-cost grid, so the search returns a path of minimal edge count.
pub fn manhattan(a: &Point, b: &Point) -> u32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as u32
}

struct FrontierEntry {
    f_score: u32,
    seq: u32,
    ix: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score.eq(&other.f_score) && self.seq.eq(&other.seq)
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Inverted so the max-heap pops the smallest f_score; equal
        // f_scores fall back to the push sequence number, making the
        // earlier-pushed entry win. The cell index is never ordered.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            s => s,
        }
    }
}

/// Transient per-invocation state. Scores and parent pointers are arrays
/// indexed by the grid's row-major cell index.
struct SearchState {
    g_score: Vec<u32>,
    f_score: Vec<u32>,
    came_from: Vec<usize>,
    frontier: BinaryHeap<FrontierEntry>,
    in_frontier: Vec<bool>,
    seq: u32,
}

impl SearchState {
    fn new(cells: usize) -> SearchState {
        SearchState {
            g_score: vec![INFINITY; cells],
            f_score: vec![INFINITY; cells],
            came_from: vec![usize::MAX; cells],
            frontier: BinaryHeap::new(),
            in_frontier: vec![false; cells],
            seq: 0,
        }
    }

    fn push(&mut self, f_score: u32, ix: usize) {
        self.frontier.push(FrontierEntry {
            f_score,
            seq: self.seq,
            ix,
        });
        self.in_frontier[ix] = true;
        self.seq += 1;
    }
}

/// Runs an A* search from `start` to `end` over the grid's current
/// neighbour lists, marking discovered cells open and expanded cells
/// closed. `on_step` is called with a view of the grid after every
/// expansion and after every path-marking step; returning
/// [StepControl::Cancel] aborts the search.
///
/// Panics if `start` equals `end` or either lies off the grid; both are
/// caller bugs. The grid's neighbour lists must be fresh, which
/// [SandboxGrid::run_search] guarantees.
pub fn search<F>(grid: &mut SandboxGrid, start: Point, end: Point, mut on_step: F) -> SearchOutcome
where
    F: FnMut(&SandboxGrid) -> StepControl,
{
    assert!(start != end, "search requires distinct start and end cells");
    assert!(
        grid.in_bounds(start.x, start.y) && grid.in_bounds(end.x, end.y),
        "search endpoints must lie on the grid"
    );
    let mut state = SearchState::new(grid.size() * grid.size());
    let start_ix = grid.get_ix(start);
    let end_ix = grid.get_ix(end);
    state.g_score[start_ix] = 0;
    state.f_score[start_ix] = manhattan(&start, &end);
    let start_f = state.f_score[start_ix];
    state.push(start_f, start_ix);

    while let Some(FrontierEntry { ix: current_ix, .. }) = state.frontier.pop() {
        state.in_frontier[current_ix] = false;
        if current_ix == end_ix {
            return match reconstruct(grid, &state.came_from, end, &mut on_step) {
                Some(path) => {
                    grid.node_mut(end).mark_end();
                    info!(
                        "found a path of {} edges from {} to {}",
                        path.len() - 1,
                        start,
                        end
                    );
                    SearchOutcome::PathFound(path)
                }
                None => {
                    info!("search cancelled during path reconstruction");
                    SearchOutcome::Cancelled
                }
            };
        }
        let current = grid.point_of(current_ix);
        let neighbours = grid.node(current).neighbours().to_vec();
        let tentative_g = state.g_score[current_ix] + 1;
        for neighbour in neighbours {
            let neighbour_ix = grid.get_ix(neighbour);
            if tentative_g < state.g_score[neighbour_ix] {
                state.came_from[neighbour_ix] = current_ix;
                state.g_score[neighbour_ix] = tentative_g;
                state.f_score[neighbour_ix] = tentative_g + manhattan(&neighbour, &end);
                if !state.in_frontier[neighbour_ix] {
                    let f_score = state.f_score[neighbour_ix];
                    state.push(f_score, neighbour_ix);
                    grid.node_mut(neighbour).mark_open();
                }
            }
        }
        if on_step(grid) == StepControl::Cancel {
            info!("search cancelled after expanding {}", current);
            return SearchOutcome::Cancelled;
        }
        if current != start {
            grid.node_mut(current).mark_closed();
        }
    }
    info!("frontier exhausted: no path from {} to {}", start, end);
    SearchOutcome::NoPathExists
}

/// Walks the parent pointers back from the end cell, marking every
/// intermediate cell as a path node and invoking the step callback once per
/// cell marked. Start and end keep their own marks. Returns the ordered
/// start-to-end sequence, or [None] if the callback cancelled the walk.
fn reconstruct<F>(
    grid: &mut SandboxGrid,
    came_from: &[usize],
    end: Point,
    on_step: &mut F,
) -> Option<Vec<Point>>
where
    F: FnMut(&SandboxGrid) -> StepControl,
{
    let mut path = vec![end];
    let mut current_ix = grid.get_ix(end);
    while came_from[current_ix] != usize::MAX {
        current_ix = came_from[current_ix];
        let current = grid.point_of(current_ix);
        path.push(current);
        if !grid.node(current).is_start() {
            grid.node_mut(current).mark_path();
            if on_step(grid) == StepControl::Cancel {
                return None;
            }
        }
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeState;

    fn expect_path(outcome: SearchOutcome) -> Vec<Point> {
        match outcome {
            SearchOutcome::PathFound(path) => path,
            other => panic!("expected a path, got {:?}", other),
        }
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(manhattan(&Point::new(0, 0), &Point::new(4, 4)), 8);
        assert_eq!(manhattan(&Point::new(3, 1), &Point::new(1, 2)), 3);
        assert_eq!(manhattan(&Point::new(2, 2), &Point::new(2, 2)), 0);
    }

    /// On an empty 5x5 grid the corner-to-corner path has the Manhattan
    /// length of 8 edges.
    #[test]
    fn empty_grid_shortest_path() {
        let mut grid = SandboxGrid::new(5, 500);
        grid.set_start(Point::new(0, 0));
        grid.set_end(Point::new(4, 4));
        let path = expect_path(grid.run_search(|_| StepControl::Continue));
        assert_eq!(path.len() - 1, 8);
        assert_eq!(path[0], Point::new(0, 0));
        assert_eq!(path[8], Point::new(4, 4));
    }

    /// A wall down column 2 with a single gap at row 4 forces the path
    /// through the gap cell.
    #[test]
    fn wall_with_gap_routes_through_gap() {
        let mut grid = SandboxGrid::new(5, 500);
        for y in 0..4 {
            grid.set_barrier(Point::new(2, y));
        }
        grid.set_start(Point::new(0, 0));
        grid.set_end(Point::new(4, 4));
        let path = expect_path(grid.run_search(|_| StepControl::Continue));
        assert!(path.contains(&Point::new(2, 4)));
        // The gap sits on the end's row, so the detour is still monotone.
        assert_eq!(path.len() - 1, 8);
    }

    /// With both endpoints on row 0 the same wall makes the shortest path
    /// strictly longer than the unobstructed Manhattan distance.
    #[test]
    fn wall_with_gap_lengthens_path() {
        let mut grid = SandboxGrid::new(5, 500);
        for y in 0..4 {
            grid.set_barrier(Point::new(2, y));
        }
        grid.set_start(Point::new(0, 0));
        grid.set_end(Point::new(4, 0));
        let path = expect_path(grid.run_search(|_| StepControl::Continue));
        assert!(path.contains(&Point::new(2, 4)));
        assert_eq!(path.len() - 1, 12);
    }

    /// Adjacent start and end: one edge, no intermediate path marks.
    #[test]
    fn adjacent_start_and_end() {
        let mut grid = SandboxGrid::new(5, 500);
        grid.set_start(Point::new(0, 0));
        grid.set_end(Point::new(1, 0));
        let path = expect_path(grid.run_search(|_| StepControl::Continue));
        assert_eq!(path.len() - 1, 1);
        assert!(grid.nodes().all(|n| !n.is_path()));
    }

    /// A sealed-off start exhausts the frontier: reachable cells end up
    /// closed, unreachable cells stay empty.
    #[test]
    fn sealed_start_exhausts_frontier() {
        let mut grid = SandboxGrid::new(5, 500);
        // Pocket of three cells around the start corner.
        grid.set_barrier(Point::new(2, 0));
        grid.set_barrier(Point::new(1, 1));
        grid.set_barrier(Point::new(0, 2));
        grid.set_start(Point::new(0, 0));
        grid.set_end(Point::new(4, 4));
        let outcome = grid.run_search(|_| StepControl::Continue);
        assert_eq!(outcome, SearchOutcome::NoPathExists);
        assert!(grid.node(Point::new(1, 0)).is_closed());
        assert!(grid.node(Point::new(0, 1)).is_closed());
        for node in grid.nodes() {
            match node.point() {
                p if p == Point::new(0, 0) => assert!(node.is_start()),
                p if p == Point::new(4, 4) => assert!(node.is_end()),
                p if p == Point::new(1, 0) || p == Point::new(0, 1) => {
                    assert!(node.is_closed())
                }
                _ => assert!(node.is_barrier() || node.is_empty()),
            }
        }
    }

    /// Identical grids yield identical paths; the push sequence number
    /// makes tie-breaking deterministic.
    #[test]
    fn deterministic_tie_breaking() {
        let build = || {
            let mut grid = SandboxGrid::new(8, 400);
            grid.set_barrier(Point::new(3, 3));
            grid.set_barrier(Point::new(4, 3));
            grid.set_barrier(Point::new(3, 4));
            grid.set_start(Point::new(0, 0));
            grid.set_end(Point::new(7, 7));
            grid
        };
        let first = expect_path(build().run_search(|_| StepControl::Continue));
        let second = expect_path(build().run_search(|_| StepControl::Continue));
        assert_eq!(first, second);
    }

    /// The callback runs once per expansion and a cancel request aborts the
    /// search at that boundary.
    #[test]
    fn cancel_mid_search() {
        let mut grid = SandboxGrid::new(10, 500);
        grid.set_start(Point::new(0, 0));
        grid.set_end(Point::new(9, 9));
        let mut steps = 0;
        let outcome = grid.run_search(|_| {
            steps += 1;
            if steps == 3 {
                StepControl::Cancel
            } else {
                StepControl::Continue
            }
        });
        assert_eq!(outcome, SearchOutcome::Cancelled);
        assert_eq!(steps, 3);
        // Partially coloured cells remain; a later reset clears them.
        assert!(grid.nodes().any(|n| n.is_open()));
        grid.reset_grid();
        assert!(grid.nodes().all(|n| n.state() == NodeState::Empty));
    }

    /// The callback observes intermediate open/closed marks while the
    /// search runs.
    #[test]
    fn callback_sees_progress() {
        let mut grid = SandboxGrid::new(6, 300);
        grid.set_start(Point::new(0, 0));
        grid.set_end(Point::new(5, 5));
        let mut saw_open = false;
        let outcome = grid.run_search(|view| {
            saw_open |= view.nodes().any(|n| n.is_open());
            StepControl::Continue
        });
        assert!(matches!(outcome, SearchOutcome::PathFound(_)));
        assert!(saw_open);
    }
}
