//! # Warren
//!
//! Procedural dungeon-map generation and grid pathfinding.
//!
//! ## Architecture Overview
//!
//! Warren is organized around a handful of small, composable pieces:
//!
//! - **Geometry**: integer positions, axis-aligned areas and 8-way directions
//! - **Grid**: a fixed-size 2D tile grid owned by each generated map
//! - **Generation System**: rooms with fuzzy borders and interior holes,
//!   placed without excessive overlap and linked by curved hallways
//! - **Pathfinding**: best-first search over the grid with diagonal movement
//!   and a configurable wall-crossing penalty
//! - **Spatial Index**: an arena-backed quadtree used by the generator to
//!   find nearby room centers (and usable for live entities by callers)
//!
//! ## Determinism
//!
//! Every randomized operation takes an explicit `StdRng` handle. Seeding the
//! generator with the same seed and parameters reproduces the exact same
//! grid, tile for tile.

pub mod geometry;
pub mod mapgen;
pub mod pathfind;
pub mod spatial;

// Core module re-exports
pub use geometry::{Area, Direction, Position};
pub use mapgen::{
    GeneratedMap, GenerationStats, Grid, GridSize, HallwayProperties, MapGenerator, MapParams,
    RoomProperties, Tile, ZoneProperties,
};
pub use pathfind::GridPather;
pub use spatial::{ElementId, QuadTree, SubdivisionPolicy, Visit};

/// Core error type for the Warren map engine.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation parameters are degenerate or contradictory
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Map engine configuration constants.
pub mod config {
    /// Default grid width in tiles
    pub const DEFAULT_GRID_WIDTH: usize = 150;

    /// Default grid height in tiles
    pub const DEFAULT_GRID_HEIGHT: usize = 100;

    /// Retry budget for placing one room before it is skipped
    pub const ROOM_PLACEMENT_ATTEMPTS: u32 = 30;

    /// Retry budget for placing one hole inside a room before it is skipped
    pub const HOLE_PLACEMENT_ATTEMPTS: u32 = 10;

    /// Depth of the quadtree built over room centers during generation
    pub const CONNECTIVITY_TREE_DEPTH: u32 = 4;

    /// Per-node capacity of the connectivity quadtree
    pub const CONNECTIVITY_TREE_CAPACITY: usize = 4;
}
