//! # astar_sandbox
//!
//! The core of an interactive grid pathfinding demonstrator. A caller
//! paints a start cell, an end cell and barrier cells on a square grid,
//! then triggers an [A*](https://en.wikipedia.org/wiki/A*_search_algorithm)
//! search whose progress is written into the node states themselves, so a
//! rendering collaborator can draw the frontier, the closed set and the
//! final path as they grow. Assumes a static, 4-connected, unit-cost grid
//! with no diagonal movement. Tracks
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! of the passable cells so callers can test reachability without running
//! a search.

pub mod node;
pub mod search;


use core::fmt;

use grid_util::point::Point;
use itertools::Itertools;
use log::{debug, info, warn};
use petgraph::unionfind::UnionFind;

use crate::node::{Node, NodeState};
use crate::search::{search, SearchOutcome, StepControl};

/// A square grid of [Node]s plus the start/end bookkeeping and connected
/// components of its passable cells. Cells are stored row-major
/// (`ix = row * size + col`); a cell coordinate is a [Point] with `x` the
/// column and `y` the row.
#[derive(Clone, Debug)]
pub struct SandboxGrid {
    size: usize,
    cell_size: u32,
    nodes: Vec<Node>,
    start: Option<Point>,
    end: Option<Point>,
    components: UnionFind<usize>,
    components_dirty: bool,
}

impl SandboxGrid {
    /// Builds a `rows` x `rows` grid of empty nodes. The cell edge length
    /// in pixels is `pixel_width / rows`; any remainder pixels are simply
    /// unrendered.
    pub fn new(rows: usize, pixel_width: u32) -> SandboxGrid {
        let cell_size = pixel_width / rows as u32;
        let mut grid = SandboxGrid {
            size: rows,
            cell_size,
            nodes: Self::build_nodes(rows, cell_size),
            start: None,
            end: None,
            components: UnionFind::new(rows * rows),
            components_dirty: false,
        };
        grid.generate_components();
        grid
    }

    fn build_nodes(rows: usize, cell_size: u32) -> Vec<Node> {
        (0..rows as i32)
            .cartesian_product(0..rows as i32)
            .map(|(y, x)| Node::new(Point::new(x, y), cell_size))
            .collect()
    }

    /// Grid dimension N (rows = columns = N).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell edge length in pixels, for gridline drawing.
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    pub(crate) fn get_ix(&self, point: Point) -> usize {
        point.y as usize * self.size + point.x as usize
    }

    pub(crate) fn point_of(&self, ix: usize) -> Point {
        Point::new((ix % self.size) as i32, (ix / self.size) as i32)
    }

    pub fn node(&self, point: Point) -> &Node {
        &self.nodes[self.get_ix(point)]
    }

    pub(crate) fn node_mut(&mut self, point: Point) -> &mut Node {
        let ix = self.get_ix(point);
        &mut self.nodes[ix]
    }

    /// All nodes in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Maps a pixel coordinate to the cell containing it. The caller
    /// guarantees the coordinate lies inside the rendered grid area.
    pub fn cell_for_point(&self, x_px: i32, y_px: i32) -> Point {
        Point::new(x_px / self.cell_size as i32, y_px / self.cell_size as i32)
    }

    /// Recomputes every node's passable-neighbour list. Must run after any
    /// barrier change and before a search; the engine trusts the lists as
    /// given.
    pub fn refresh_all_neighbours(&mut self) {
        let lists = self
            .nodes
            .iter()
            .map(|node| node.passable_neighbours(self))
            .collect_vec();
        for (node, neighbours) in self.nodes.iter_mut().zip(lists) {
            node.set_neighbours(neighbours);
        }
    }

    /// Places the start marker. Ignored (with a debug line) if a start
    /// already exists elsewhere or the target cell is a barrier or the
    /// end.
    pub fn set_start(&mut self, point: Point) {
        if !self.in_bounds(point.x, point.y) {
            debug!("ignoring start edit outside the grid: {}", point);
            return;
        }
        if let Some(existing) = self.start {
            if existing != point {
                debug!(
                    "ignoring start edit at {}: start already at {}",
                    point, existing
                );
            }
            return;
        }
        if self.node(point).is_barrier() || self.node(point).is_end() {
            debug!("ignoring start edit on occupied cell {}", point);
            return;
        }
        self.node_mut(point).mark_start();
        self.start = Some(point);
    }

    /// Places the end marker, under the same policy as
    /// [set_start](Self::set_start).
    pub fn set_end(&mut self, point: Point) {
        if !self.in_bounds(point.x, point.y) {
            debug!("ignoring end edit outside the grid: {}", point);
            return;
        }
        if let Some(existing) = self.end {
            if existing != point {
                debug!(
                    "ignoring end edit at {}: end already at {}",
                    point, existing
                );
            }
            return;
        }
        if self.node(point).is_barrier() || self.node(point).is_start() {
            debug!("ignoring end edit on occupied cell {}", point);
            return;
        }
        self.node_mut(point).mark_end();
        self.end = Some(point);
    }

    /// Paints a barrier. Ignored on the start or end cell. Placing a
    /// barrier can split a component, so regeneration is deferred to the
    /// next [update](Self::update).
    pub fn set_barrier(&mut self, point: Point) {
        if !self.in_bounds(point.x, point.y) {
            debug!("ignoring barrier edit outside the grid: {}", point);
            return;
        }
        let node = self.node(point);
        if node.is_start() || node.is_end() {
            debug!("ignoring barrier edit on start/end cell {}", point);
            return;
        }
        if node.is_barrier() {
            return;
        }
        self.node_mut(point).mark_barrier();
        self.components_dirty = true;
    }

    /// Resets a cell to empty, forgetting a start/end marker placed there.
    /// Clearing a barrier joins the cell back up with the components of
    /// its passable neighbours.
    pub fn clear_cell(&mut self, point: Point) {
        if !self.in_bounds(point.x, point.y) {
            debug!("ignoring clear edit outside the grid: {}", point);
            return;
        }
        let was_barrier = self.node(point).is_barrier();
        if self.start == Some(point) {
            self.start = None;
        }
        if self.end == Some(point) {
            self.end = None;
        }
        self.node_mut(point).reset();
        if was_barrier {
            let ix = self.get_ix(point);
            for neighbour in self.node(point).passable_neighbours(self) {
                self.components.union(ix, self.get_ix(neighbour));
            }
        }
    }

    /// Replaces every node with a fresh empty one and forgets the start
    /// and end markers.
    pub fn reset_grid(&mut self) {
        info!("rebuilding {0}x{0} grid", self.size);
        self.nodes = Self::build_nodes(self.size, self.cell_size);
        self.start = None;
        self.end = None;
        self.generate_components();
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links 4-connected
    /// passable neighbours into the same components.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.size * self.size);
        self.components_dirty = false;
        for (y, x) in (0..self.size as i32).cartesian_product(0..self.size as i32) {
            let point = Point::new(x, y);
            if self.node(point).is_barrier() {
                continue;
            }
            let parent_ix = self.get_ix(point);
            for neighbour in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                if self.in_bounds(neighbour.x, neighbour.y) && !self.node(neighbour).is_barrier() {
                    self.components.union(parent_ix, self.get_ix(neighbour));
                }
            }
        }
    }

    /// Retrieves the component id a given cell belongs to.
    pub fn get_component(&self, point: &Point) -> usize {
        self.components.find(self.get_ix(*point))
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if self.in_bounds(start.x, start.y) && self.in_bounds(goal.x, goal.y) {
            !self
                .components
                .equiv(self.get_ix(*start), self.get_ix(*goal))
        } else {
            true
        }
    }

    /// Refreshes the neighbour lists and components, then runs the A*
    /// engine from the painted start to the painted end. `on_step` is
    /// called with a view of the grid after every expansion and every
    /// path-marking step.
    ///
    /// Panics if start and end have not both been placed; invoking the
    /// search without them is a caller bug, not a recoverable condition.
    pub fn run_search<F>(&mut self, on_step: F) -> SearchOutcome
    where
        F: FnMut(&SandboxGrid) -> StepControl,
    {
        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => panic!("run_search requires both a start and an end cell"),
        };
        self.refresh_all_neighbours();
        self.update();
        if self.unreachable(&start, &end) {
            info!(
                "{} and {} are on different components, expecting frontier exhaustion",
                start, end
            );
        } else {
            info!("{} is reachable from {}, searching", end, start);
        }
        let outcome = search(self, start, end, on_step);
        if outcome == SearchOutcome::NoPathExists && self.reachable(&start, &end) {
            warn!(
                "components consider {} reachable from {} but the search found no path",
                end, start
            );
        }
        outcome
    }
}

impl fmt::Display for SandboxGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                let glyph = match self.node(Point::new(x, y)).state() {
                    NodeState::Empty => '.',
                    NodeState::Open => 'o',
                    NodeState::Closed => 'x',
                    NodeState::Barrier => '#',
                    NodeState::Start => 'S',
                    NodeState::End => 'E',
                    NodeState::Path => '*',
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
