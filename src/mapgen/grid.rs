//! # Tile Grid
//!
//! The fixed-size 2D tile grid produced by map generation.
//!
//! The grid is addressed by `(x, y)` with x the outer index,
//! `0 <= x < width`, `0 <= y < height`. All accessors are bounds-checked;
//! out-of-range reads return `None` and out-of-range writes are ignored, so
//! generation code can stamp shapes near the border without clipping logic
//! at every call site.

use crate::geometry::Position;
use serde::{Deserialize, Serialize};

/// A single cell of the map.
///
/// Generated grids only ever contain these four values. The transient
/// "undetermined" state used while compositing fuzzy room borders is
/// expressed as `Option<Tile>` inside the generator's staging buffer and
/// can never leak into a published grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Unexcavated space surrounding rooms and hallways
    EmptySpace,
    /// A solid wall (written by gameplay effects, never by generation)
    Wall,
    /// Walkable floor: room interiors and hallways
    Walkable,
    /// A pit inside a room
    Hole,
}

impl Tile {
    /// Whether creatures can stand on this tile.
    pub fn is_walkable(self) -> bool {
        self == Tile::Walkable
    }

    /// Single-character representation used by the preview tool and tests.
    pub fn glyph(self) -> char {
        match self {
            Tile::EmptySpace => ' ',
            Tile::Wall => '#',
            Tile::Walkable => '.',
            Tile::Hole => 'o',
        }
    }
}

/// A fixed-size 2D grid of tiles.
///
/// # Examples
///
/// ```
/// use warren::{Grid, Tile};
///
/// let mut grid = Grid::new(10, 5, Tile::EmptySpace);
/// grid.set(3, 2, Tile::Walkable);
/// assert_eq!(grid.get(3, 2), Some(Tile::Walkable));
/// assert_eq!(grid.get(10, 2), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid filled with the given tile.
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width * height],
        }
    }

    /// Grid width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        // x is the outer index
        x * self.height + y
    }

    /// Reads the tile at (x, y), or None when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        if x < self.width && y < self.height {
            Some(self.tiles[self.index(x, y)])
        } else {
            None
        }
    }

    /// Reads the tile at a position, or None when out of bounds.
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        self.get(pos.x as usize, pos.y as usize)
    }

    /// Writes the tile at (x, y). Out-of-bounds writes are ignored.
    ///
    /// Returns true when the write landed inside the grid.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) -> bool {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.tiles[idx] = tile;
            true
        } else {
            false
        }
    }

    /// Writes the tile at a position. Out-of-bounds writes are ignored.
    pub fn set_pos(&mut self, pos: Position, tile: Tile) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        self.set(pos.x as usize, pos.y as usize, tile)
    }

    /// Whether a position is inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Whether the tile at a position is walkable floor.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).map(Tile::is_walkable).unwrap_or(false)
    }

    /// Counts tiles of a given kind.
    pub fn count_of(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Iterates over all tiles with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        let height = self.height;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &t)| (i / height, i % height, t))
    }
}

impl std::fmt::Display for Grid {
    /// Renders the grid row by row as glyphs, for the preview tool and for
    /// eyeballing failing tests.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                // Indices are in range by construction
                write!(f, "{}", self.tiles[self.index(x, y)].glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 5, Tile::EmptySpace);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.count_of(Tile::EmptySpace), 50);
    }

    #[test]
    fn test_bounds_checked_access() {
        let mut grid = Grid::new(4, 3, Tile::EmptySpace);
        assert!(grid.set(3, 2, Tile::Walkable));
        assert!(!grid.set(4, 0, Tile::Walkable));
        assert!(!grid.set(0, 3, Tile::Walkable));
        assert_eq!(grid.get(3, 2), Some(Tile::Walkable));
        assert_eq!(grid.get(4, 2), None);
        assert_eq!(grid.tile(Position::new(-1, 0)), None);
        assert!(!grid.set_pos(Position::new(0, -1), Tile::Hole));
    }

    #[test]
    fn test_x_major_addressing() {
        let mut grid = Grid::new(3, 2, Tile::EmptySpace);
        grid.set(2, 0, Tile::Hole);
        grid.set(0, 1, Tile::Walkable);
        let collected: Vec<_> = grid.iter().filter(|(_, _, t)| *t != Tile::EmptySpace).collect();
        assert_eq!(
            collected,
            vec![(0, 1, Tile::Walkable), (2, 0, Tile::Hole)]
        );
    }

    #[test]
    fn test_walkability() {
        let mut grid = Grid::new(3, 3, Tile::EmptySpace);
        grid.set(1, 1, Tile::Walkable);
        grid.set(2, 2, Tile::Hole);
        assert!(grid.is_walkable(Position::new(1, 1)));
        assert!(!grid.is_walkable(Position::new(2, 2)));
        assert!(!grid.is_walkable(Position::new(0, 0)));
        assert!(!grid.is_walkable(Position::new(5, 5)));
    }

    #[test]
    fn test_display_shape() {
        let mut grid = Grid::new(3, 2, Tile::EmptySpace);
        grid.set(0, 0, Tile::Walkable);
        grid.set(2, 1, Tile::Wall);
        let rendered = grid.to_string();
        assert_eq!(rendered, ".  \n  #\n");
    }
}
