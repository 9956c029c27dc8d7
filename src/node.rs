use grid_util::point::Point;

use crate::SandboxGrid;

/// Symbolic state tag of a single cell. Exactly one tag applies at a time;
/// mapping tags to colors is the renderer's business, the core only ever
/// tests and sets the tags themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeState {
    /// Untouched, traversable cell.
    #[default]
    Empty,
    /// Discovered by the search but not yet finalized (in the frontier).
    Open,
    /// Finalized by the search; no further improvement is considered.
    Closed,
    /// Painted obstacle; never traversed and never listed as a neighbour.
    Barrier,
    Start,
    End,
    /// Lies on the reconstructed shortest path.
    Path,
}

/// A single cell of a [SandboxGrid]: its coordinate, derived pixel origin,
/// state tag and the neighbour list cached by the last
/// [refresh_all_neighbours](SandboxGrid::refresh_all_neighbours).
#[derive(Clone, Debug)]
pub struct Node {
    point: Point,
    x_px: i32,
    y_px: i32,
    state: NodeState,
    neighbours: Vec<Point>,
}

impl Node {
    pub(crate) fn new(point: Point, cell_size: u32) -> Node {
        Node {
            point,
            x_px: point.x * cell_size as i32,
            y_px: point.y * cell_size as i32,
            state: NodeState::Empty,
            neighbours: Vec::new(),
        }
    }

    /// Cell coordinate; `x` is the column and `y` the row.
    pub fn point(&self) -> Point {
        self.point
    }

    /// Top-left pixel of the cell rectangle, for gridline and fill drawing.
    pub fn screen_position(&self) -> (i32, i32) {
        (self.x_px, self.y_px)
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state == NodeState::Empty
    }
    pub fn is_open(&self) -> bool {
        self.state == NodeState::Open
    }
    pub fn is_closed(&self) -> bool {
        self.state == NodeState::Closed
    }
    pub fn is_barrier(&self) -> bool {
        self.state == NodeState::Barrier
    }
    pub fn is_start(&self) -> bool {
        self.state == NodeState::Start
    }
    pub fn is_end(&self) -> bool {
        self.state == NodeState::End
    }
    pub fn is_path(&self) -> bool {
        self.state == NodeState::Path
    }

    pub(crate) fn mark_start(&mut self) {
        self.state = NodeState::Start;
    }
    pub(crate) fn mark_end(&mut self) {
        self.state = NodeState::End;
    }
    pub(crate) fn mark_barrier(&mut self) {
        self.state = NodeState::Barrier;
    }
    pub(crate) fn mark_open(&mut self) {
        self.state = NodeState::Open;
    }
    pub(crate) fn mark_closed(&mut self) {
        self.state = NodeState::Closed;
    }
    pub(crate) fn mark_path(&mut self) {
        self.state = NodeState::Path;
    }
    pub(crate) fn reset(&mut self) {
        self.state = NodeState::Empty;
    }

    /// The passable neighbours as of the last
    /// [refresh_all_neighbours](SandboxGrid::refresh_all_neighbours) call.
    pub fn neighbours(&self) -> &[Point] {
        &self.neighbours
    }

    pub(crate) fn set_neighbours(&mut self, neighbours: Vec<Point>) {
        self.neighbours = neighbours;
    }

    /// Scans the four grid-adjacent cells in a fixed down, up, right, left
    /// order and keeps those that lie inside the grid and are not barriers.
    /// Out-of-bounds candidates are silently excluded. The order decides
    /// which of several equal-length shortest paths the search prefers, not
    /// optimality.
    pub fn passable_neighbours(&self, grid: &SandboxGrid) -> Vec<Point> {
        [
            Point::new(self.point.x, self.point.y + 1),
            Point::new(self.point.x, self.point.y - 1),
            Point::new(self.point.x + 1, self.point.y),
            Point::new(self.point.x - 1, self.point.y),
        ]
        .into_iter()
        .filter(|p| grid.in_bounds(p.x, p.y) && !grid.node(*p).is_barrier())
        .collect()
    }
}
