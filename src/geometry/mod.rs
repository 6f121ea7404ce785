//! # Geometry Module
//!
//! Integer grid geometry: positions, axis-aligned areas and 8-way directions.
//!
//! Everything in the map engine addresses the grid with `(x, y)` integer
//! coordinates, x growing to the east and y growing to the south.

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the tile grid.
///
/// # Examples
///
/// ```
/// use warren::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }

    /// Returns the position one step in the given direction.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }

    /// Returns all 8 adjacent positions in the fixed expansion order of
    /// [`Direction::ALL`].
    pub fn adjacent_positions(self) -> Vec<Position> {
        Direction::ALL.iter().map(|d| self.step(*d)).collect()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Directions for grid movement (4 orthogonal + 4 diagonal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    /// All 8 directions in clockwise order starting north.
    ///
    /// The pathfinder expands neighbors in this order, so the order is part
    /// of the deterministic tie-breaking contract.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
    ];

    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.to_delta(), Position::new(0, -1));
    /// assert_eq!(Direction::Southeast.to_delta(), Position::new(1, 1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::Northeast => Position::new(1, -1),
            Direction::East => Position::new(1, 0),
            Direction::Southeast => Position::new(1, 1),
            Direction::South => Position::new(0, 1),
            Direction::Southwest => Position::new(-1, 1),
            Direction::West => Position::new(-1, 0),
            Direction::Northwest => Position::new(-1, -1),
        }
    }

    /// Converts a position delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a unit direction.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (1, -1) => Some(Direction::Northeast),
            (1, 0) => Some(Direction::East),
            (1, 1) => Some(Direction::Southeast),
            (0, 1) => Some(Direction::South),
            (-1, 1) => Some(Direction::Southwest),
            (-1, 0) => Some(Direction::West),
            (-1, -1) => Some(Direction::Northwest),
            _ => None,
        }
    }

    /// Whether this direction moves on both axes at once.
    pub fn is_diagonal(self) -> bool {
        let d = self.to_delta();
        d.x != 0 && d.y != 0
    }

    /// The opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::Northeast => Direction::Southwest,
            Direction::East => Direction::West,
            Direction::Southeast => Direction::Northwest,
            Direction::South => Direction::North,
            Direction::Southwest => Direction::Northeast,
            Direction::West => Direction::East,
            Direction::Northwest => Direction::Southeast,
        }
    }
}

/// An axis-aligned rectangle in grid coordinates.
///
/// Used for room placement results and for quadtree hitboxes. The rectangle
/// spans `[x, x + width) x [y, y + height)`.
///
/// # Examples
///
/// ```
/// use warren::{Area, Position};
///
/// let area = Area::new(5, 5, 10, 8);
/// assert!(area.contains(Position::new(7, 7)));
/// assert!(!area.contains(Position::new(20, 20)));
/// assert_eq!(area.center(), Position::new(10, 9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Area {
    /// Creates a new area from its top-left corner and dimensions.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an area from a center point and dimensions.
    pub fn around(center: Position, width: i32, height: i32) -> Self {
        Self::new(center.x - width / 2, center.y - height / 2, width, height)
    }

    /// Whether this area covers no cells.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Area in cells.
    pub fn size(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// The center position of the area.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Checks if a position lies inside this area.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width
            && pos.y < self.y + self.height
    }

    /// Checks if another area lies entirely inside this one.
    pub fn contains_area(&self, other: &Area) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    /// Checks if this area overlaps another.
    pub fn intersects(&self, other: &Area) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.x >= other.x + other.width
            || other.x >= self.x + self.width
            || self.y >= other.y + other.height
            || other.y >= self.y + self.height)
    }

    /// Splits the area into four quadrants around its center.
    ///
    /// Order: top-left, top-right, bottom-left, bottom-right. Odd dimensions
    /// give the extra row/column to the bottom/right quadrants so the four
    /// pieces tile the parent exactly.
    pub fn quadrants(&self) -> [Area; 4] {
        let half_w = self.width / 2;
        let half_h = self.height / 2;
        let cx = self.x + half_w;
        let cy = self.y + half_h;
        [
            Area::new(self.x, self.y, half_w, half_h),
            Area::new(cx, self.y, self.width - half_w, half_h),
            Area::new(self.x, cy, half_w, self.height - half_h),
            Area::new(cx, cy, self.width - half_w, self.height - half_h),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_arithmetic() {
        let a = Position::new(3, 4);
        let b = Position::new(1, -2);
        assert_eq!(a + b, Position::new(4, 2));
        assert_eq!(a - b, Position::new(2, 6));
        assert_eq!(Position::origin(), Position::new(0, 0));
    }

    #[test]
    fn test_position_distances() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert!((a.euclidean_distance(b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_direction_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_delta(dir.to_delta()), Some(dir));
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Direction::from_delta(Position::new(2, 0)), None);
        assert_eq!(Direction::from_delta(Position::new(0, 0)), None);
    }

    #[test]
    fn test_diagonals() {
        assert!(Direction::Northeast.is_diagonal());
        assert!(!Direction::North.is_diagonal());
        let diagonal_count = Direction::ALL.iter().filter(|d| d.is_diagonal()).count();
        assert_eq!(diagonal_count, 4);
    }

    #[test]
    fn test_adjacent_positions() {
        let adjacent = Position::new(5, 5).adjacent_positions();
        assert_eq!(adjacent.len(), 8);
        for pos in adjacent {
            assert_eq!(Position::new(5, 5).manhattan_distance(pos) <= 2, true);
            assert_ne!(pos, Position::new(5, 5));
        }
    }

    #[test]
    fn test_area_containment() {
        let area = Area::new(5, 5, 10, 8);
        assert!(area.contains(Position::new(5, 5)));
        assert!(area.contains(Position::new(14, 12)));
        assert!(!area.contains(Position::new(15, 12)));
        assert!(!area.contains(Position::new(4, 5)));

        let inner = Area::new(6, 6, 3, 3);
        assert!(area.contains_area(&inner));
        assert!(!inner.contains_area(&area));
    }

    #[test]
    fn test_area_intersection() {
        let a = Area::new(5, 5, 10, 8);
        let b = Area::new(10, 8, 6, 6);
        let c = Area::new(20, 20, 5, 5);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));

        let degenerate = Area::new(7, 7, 0, 4);
        assert!(degenerate.is_empty());
        assert!(!a.intersects(&degenerate));
    }

    #[test]
    fn test_quadrants_tile_parent() {
        let area = Area::new(2, 3, 7, 9);
        let quads = area.quadrants();
        let total: i64 = quads.iter().map(|q| q.size()).sum();
        assert_eq!(total, area.size());
        for q in &quads {
            assert!(area.contains_area(q) || q.is_empty());
        }
        // Quadrants must not overlap each other
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert!(!quads[i].intersects(&quads[j]));
            }
        }
    }
}
