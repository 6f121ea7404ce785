//! # Pathfinding Module
//!
//! Best-first search over the tile grid with diagonal movement and a
//! configurable wall-crossing penalty.
//!
//! The search is A*-style: the open set is ordered by accumulated distance
//! plus a straight-line heuristic, with a monotone insertion counter as a
//! deterministic tie-break for equal-cost nodes. Walls are either impassable
//! (infinite penalty) or crossable at an additive cost, which is how the map
//! generator probes connectivity versus how gameplay lets burrowing
//! creatures tunnel.
//!
//! The pathfinder is a pure read-only consumer of the grid; all working data
//! lives for the duration of one `path_to` call.

use crate::geometry::{Direction, Position};
use crate::mapgen::Grid;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Grid pathfinder borrowing the grid it searches.
///
/// # Examples
///
/// ```
/// use warren::{Grid, GridPather, Position, Tile};
///
/// let mut grid = Grid::new(10, 3, Tile::EmptySpace);
/// for x in 1..9 {
///     grid.set(x, 1, Tile::Walkable);
/// }
/// let pather = GridPather::new(&grid);
/// let path = pather.path_to_pt(
///     Position::new(1, 1),
///     Position::new(8, 1),
///     f64::INFINITY,
///     100,
/// );
/// assert_eq!(path.first(), Some(&Position::new(1, 1)));
/// assert_eq!(path.last(), Some(&Position::new(8, 1)));
/// ```
pub struct GridPather<'a> {
    grid: &'a Grid,
}

/// Heap entry for the open set.
///
/// Ordered so that the smallest estimated total cost pops first; among equal
/// costs the earliest-inserted node wins, which keeps the search fully
/// deterministic for a fixed grid and query.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    estimate: f64,
    seq: u64,
    g: f64,
    depth: u32,
    position: Position,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.estimate == other.estimate && self.seq == other.seq
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior in BinaryHeap; ties fall
        // back to insertion order (earlier seq pops first).
        other
            .estimate
            .partial_cmp(&self.estimate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-known route information per visited position.
#[derive(Debug, Clone, Copy)]
struct NodeRecord {
    g: f64,
    /// Direction taken to arrive here from the parent; None only at source
    arrived_by: Option<Direction>,
}

impl<'a> GridPather<'a> {
    /// Creates a pathfinder over the given grid.
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Finds a route from `source` to `destination` as a direction sequence.
    ///
    /// `wall_crossing_penalty` is added to the cost of every step onto a
    /// non-walkable tile; `f64::INFINITY` makes such tiles impassable.
    /// `max_depth` bounds how many steps from the source a node may be
    /// before it is pruned.
    ///
    /// Returns an empty sequence when `source == destination` or when no
    /// route is found within the depth budget.
    pub fn path_to(
        &self,
        source: Position,
        destination: Position,
        wall_crossing_penalty: f64,
        max_depth: u32,
    ) -> Vec<Direction> {
        if source == destination || !self.grid.in_bounds(source) {
            return Vec::new();
        }

        let impassable = wall_crossing_penalty.is_infinite();
        let mut open = BinaryHeap::new();
        let mut records: HashMap<Position, NodeRecord> = HashMap::new();
        let mut seq: u64 = 0;

        records.insert(
            source,
            NodeRecord {
                g: 0.0,
                arrived_by: None,
            },
        );
        open.push(OpenNode {
            estimate: source.euclidean_distance(destination),
            seq,
            g: 0.0,
            depth: 0,
            position: source,
        });

        while let Some(node) = open.pop() {
            // A rediscovery with a strictly better cost re-pushed this
            // position; the superseded entry is skipped when it surfaces.
            match records.get(&node.position) {
                Some(record) if record.g < node.g => continue,
                _ => {}
            }

            if node.position == destination {
                return self.reconstruct(&records, source, destination);
            }

            if node.depth >= max_depth {
                continue;
            }

            for dir in Direction::ALL {
                let neighbor = node.position.step(dir);
                if !self.grid.in_bounds(neighbor) {
                    continue;
                }

                let walkable = self.grid.is_walkable(neighbor);
                if impassable && !walkable {
                    continue;
                }
                if impassable && dir.is_diagonal() && !self.corners_walkable(node.position, dir) {
                    continue;
                }

                let delta = dir.to_delta();
                let mut step_cost = (delta.x as f64).hypot(delta.y as f64);
                if !walkable {
                    step_cost += wall_crossing_penalty;
                }

                let tentative = node.g + step_cost;
                let known = records.get(&neighbor).map(|r| r.g).unwrap_or(f64::INFINITY);
                if tentative < known {
                    records.insert(
                        neighbor,
                        NodeRecord {
                            g: tentative,
                            arrived_by: Some(dir),
                        },
                    );
                    seq += 1;
                    open.push(OpenNode {
                        estimate: tentative + neighbor.euclidean_distance(destination),
                        seq,
                        g: tentative,
                        depth: node.depth + 1,
                        position: neighbor,
                    });
                }
            }
        }

        Vec::new()
    }

    /// Finds a route and replays it as grid positions.
    ///
    /// The sequence starts at `source` and ends at `destination`; it is
    /// empty exactly when [`GridPather::path_to`] returns empty.
    pub fn path_to_pt(
        &self,
        source: Position,
        destination: Position,
        wall_crossing_penalty: f64,
        max_depth: u32,
    ) -> Vec<Position> {
        let directions = self.path_to(source, destination, wall_crossing_penalty, max_depth);
        if directions.is_empty() {
            return Vec::new();
        }

        let mut points = Vec::with_capacity(directions.len() + 1);
        let mut current = source;
        points.push(current);
        for dir in directions {
            current = current.step(dir);
            points.push(current);
        }
        points
    }

    /// Both orthogonal tiles flanking a diagonal step must be walkable, so
    /// walkable-only searches cannot cut through wall corners.
    fn corners_walkable(&self, from: Position, dir: Direction) -> bool {
        let delta = dir.to_delta();
        self.grid.is_walkable(Position::new(from.x + delta.x, from.y))
            && self.grid.is_walkable(Position::new(from.x, from.y + delta.y))
    }

    /// Walks the arrival directions backwards from the goal and reverses.
    fn reconstruct(
        &self,
        records: &HashMap<Position, NodeRecord>,
        source: Position,
        destination: Position,
    ) -> Vec<Direction> {
        let mut path = Vec::new();
        let mut current = destination;
        while current != source {
            let dir = match records.get(&current).and_then(|r| r.arrived_by) {
                Some(dir) => dir,
                // Broken parent chain; treat as unreachable
                None => return Vec::new(),
            };
            path.push(dir);
            current = current.step(dir.opposite());
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::Tile;

    fn corridor_grid() -> Grid {
        let mut grid = Grid::new(10, 3, Tile::EmptySpace);
        for x in 0..10 {
            grid.set(x, 1, Tile::Walkable);
        }
        grid
    }

    #[test]
    fn test_same_source_and_destination() {
        let grid = corridor_grid();
        let pather = GridPather::new(&grid);
        let p = Position::new(3, 1);
        assert!(pather.path_to(p, p, f64::INFINITY, 100).is_empty());
        assert!(pather.path_to_pt(p, p, f64::INFINITY, 100).is_empty());
    }

    #[test]
    fn test_straight_corridor() {
        let grid = corridor_grid();
        let pather = GridPather::new(&grid);
        let path = pather.path_to(Position::new(1, 1), Position::new(8, 1), f64::INFINITY, 100);
        assert_eq!(path.len(), 7);
        assert!(path.iter().all(|&d| d == Direction::East));
    }

    #[test]
    fn test_path_to_pt_endpoints_and_steps() {
        let mut grid = Grid::new(12, 12, Tile::EmptySpace);
        for x in 2..10 {
            for y in 2..10 {
                grid.set(x, y, Tile::Walkable);
            }
        }
        let pather = GridPather::new(&grid);
        let source = Position::new(2, 2);
        let destination = Position::new(9, 9);
        let points = pather.path_to_pt(source, destination, f64::INFINITY, 200);

        assert_eq!(points.first(), Some(&source));
        assert_eq!(points.last(), Some(&destination));
        for pair in points.windows(2) {
            let delta = pair[1] - pair[0];
            assert!(Direction::from_delta(delta).is_some());
        }
        // Diagonals make this an 8-step route
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn test_infinite_penalty_never_crosses_walls() {
        let mut grid = corridor_grid();
        grid.set(5, 1, Tile::EmptySpace); // sever the corridor
        let pather = GridPather::new(&grid);
        let path = pather.path_to(Position::new(1, 1), Position::new(8, 1), f64::INFINITY, 500);
        assert!(path.is_empty());
    }

    #[test]
    fn test_finite_penalty_crosses_at_cost() {
        let mut grid = corridor_grid();
        grid.set(5, 1, Tile::EmptySpace);
        let pather = GridPather::new(&grid);
        let points = pather.path_to_pt(Position::new(1, 1), Position::new(8, 1), 10.0, 500);
        assert_eq!(points.first(), Some(&Position::new(1, 1)));
        assert_eq!(points.last(), Some(&Position::new(8, 1)));
        assert!(points.contains(&Position::new(5, 1)));
    }

    #[test]
    fn test_no_corner_cutting_with_infinite_penalty() {
        // Two walkable diagonal cells with non-walkable orthogonal corners:
        //   .x
        //   x.
        let mut grid = Grid::new(4, 4, Tile::EmptySpace);
        grid.set(1, 1, Tile::Walkable);
        grid.set(2, 2, Tile::Walkable);
        let pather = GridPather::new(&grid);
        let path = pather.path_to(Position::new(1, 1), Position::new(2, 2), f64::INFINITY, 50);
        assert!(path.is_empty());

        // Opening one corner allows the orthogonal detour
        grid.set(2, 1, Tile::Walkable);
        let pather = GridPather::new(&grid);
        let path = pather.path_to(Position::new(1, 1), Position::new(2, 2), f64::INFINITY, 50);
        assert!(!path.is_empty());
    }

    #[test]
    fn test_max_depth_prunes() {
        let grid = corridor_grid();
        let pather = GridPather::new(&grid);
        let source = Position::new(0, 1);
        let destination = Position::new(9, 1);
        assert!(pather.path_to(source, destination, f64::INFINITY, 4).is_empty());
        assert_eq!(
            pather.path_to(source, destination, f64::INFINITY, 9).len(),
            9
        );
    }

    #[test]
    fn test_symmetry_without_penalty() {
        let mut grid = Grid::new(16, 16, Tile::EmptySpace);
        for x in 1..15 {
            grid.set(x, 3, Tile::Walkable);
            grid.set(x, 9, Tile::Walkable);
        }
        for y in 3..10 {
            grid.set(7, y, Tile::Walkable);
        }
        let pather = GridPather::new(&grid);
        let a = Position::new(1, 3);
        let b = Position::new(14, 9);
        let forward = pather.path_to(a, b, f64::INFINITY, 500);
        let backward = pather.path_to(b, a, f64::INFINITY, 500);
        assert!(!forward.is_empty());
        assert!(!backward.is_empty());
        assert_eq!(forward.len(), backward.len());
    }

    #[test]
    fn test_deterministic_ties() {
        let mut grid = Grid::new(10, 10, Tile::EmptySpace);
        for x in 1..9 {
            for y in 1..9 {
                grid.set(x, y, Tile::Walkable);
            }
        }
        let pather = GridPather::new(&grid);
        let first = pather.path_to(Position::new(1, 1), Position::new(8, 8), f64::INFINITY, 100);
        for _ in 0..5 {
            let again =
                pather.path_to(Position::new(1, 1), Position::new(8, 8), f64::INFINITY, 100);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_out_of_bounds_source() {
        let grid = corridor_grid();
        let pather = GridPather::new(&grid);
        let path = pather.path_to(Position::new(-3, 1), Position::new(5, 1), 1.0, 100);
        assert!(path.is_empty());
    }
}
