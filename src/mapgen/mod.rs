//! # Map Generation Module
//!
//! Procedural dungeon-map generation: statistical parameters in, tile grid out.
//!
//! The entry point is [`MapGenerator::generate`], which consumes a grid size,
//! a non-empty list of [`RoomProperties`] (one per "biome" pass) and one
//! [`HallwayProperties`], and produces a [`GeneratedMap`]: the finished
//! [`Grid`], the rectangular areas of the rooms that were placed, and some
//! incidental [`GenerationStats`].
//!
//! All property structs are plain serde-serializable values; the resource
//! layer typically deserializes them from a JSON document.

pub mod generator;
pub mod grid;

pub use generator::{GeneratedMap, MapGenerator};
pub use grid::{Grid, Tile};

use crate::{WarrenError, WarrenResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn require_non_negative(field: &str, value: f64) -> WarrenResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(WarrenError::InvalidParameters(format!(
            "{} must be finite and >= 0, got {}",
            field, value
        )))
    }
}

/// Dimensions of the grid to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    /// Creates a new grid size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Validates that both dimensions are positive.
    pub fn validate(&self) -> WarrenResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WarrenError::InvalidParameters(format!(
                "grid size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_GRID_WIDTH,
            crate::config::DEFAULT_GRID_HEIGHT,
        )
    }
}

/// Stochastic shape parameters for one rectangular zone (a room or a hole).
///
/// `avg_size` is an area target in cells; the zone's height is drawn around
/// the square root of the sampled area and clamped to
/// `[min_height, max_height]`, and the width follows from the area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneProperties {
    /// Average zone area in cells
    pub avg_size: f64,
    /// Standard deviation of the zone area
    pub size_deviation: f64,
    /// Scale of border perturbations (0 disables fuzzing)
    pub borders_fuzziness: f64,
    /// Standard deviation of border perturbations
    pub borders_fuzzy_deviation: f64,
    /// Length of one border segment between perturbation samples
    pub borders_fuzzy_distance: f64,
    /// Minimum zone height in cells
    pub min_height: f64,
    /// Maximum zone height in cells
    pub max_height: f64,
}

impl ZoneProperties {
    /// Validates that every field is finite, non-negative and mutually
    /// consistent. Degenerate parameters are rejected here rather than
    /// risking division by zero or unbounded loops deep in generation.
    pub fn validate(&self) -> WarrenResult<()> {
        require_non_negative("avg_size", self.avg_size)?;
        require_non_negative("size_deviation", self.size_deviation)?;
        require_non_negative("borders_fuzziness", self.borders_fuzziness)?;
        require_non_negative("borders_fuzzy_deviation", self.borders_fuzzy_deviation)?;
        require_non_negative("borders_fuzzy_distance", self.borders_fuzzy_distance)?;
        require_non_negative("min_height", self.min_height)?;
        require_non_negative("max_height", self.max_height)?;

        if self.borders_fuzzy_distance < 1.0 {
            return Err(WarrenError::InvalidParameters(
                "borders_fuzzy_distance must be >= 1 (it is used as a segment step)".to_string(),
            ));
        }
        if self.min_height > self.max_height {
            return Err(WarrenError::InvalidParameters(format!(
                "min_height ({}) exceeds max_height ({})",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }
}

/// Room and hole shape parameters plus counts for one generation pass.
///
/// Multiple `RoomProperties` can be supplied to [`MapGenerator::generate`];
/// each pass is processed independently and the placed rooms are pooled
/// together before the connectivity phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomProperties {
    /// Shape of the rooms themselves
    pub zone: ZoneProperties,
    /// Shape of the holes punched into rooms
    pub holes: ZoneProperties,
    /// Average number of rooms for this pass
    pub avg_rooms_n: f64,
    /// Standard deviation of the room count
    pub rooms_n_dev: f64,
    /// Average number of holes per room
    pub avg_holes_n: f64,
    /// Standard deviation of the hole count
    pub holes_n_dev: f64,
}

impl RoomProperties {
    /// Validates counts and both zone specs.
    pub fn validate(&self) -> WarrenResult<()> {
        self.zone.validate()?;
        self.holes.validate()?;
        require_non_negative("avg_rooms_n", self.avg_rooms_n)?;
        require_non_negative("rooms_n_dev", self.rooms_n_dev)?;
        require_non_negative("avg_holes_n", self.avg_holes_n)?;
        require_non_negative("holes_n_dev", self.holes_n_dev)?;
        Ok(())
    }
}

/// Parameters controlling hallway shape and thickness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallwayProperties {
    /// Scale of the per-segment direction perturbation, in radians
    pub curliness: f64,
    /// Below this center distance a hallway is carved straight
    pub curly_min_distance: f64,
    /// Average length of one curl segment
    pub curly_segment_avg_size: f64,
    /// Standard deviation of the curl segment length
    pub curly_segment_dev: f64,
    /// Average hallway width
    pub avg_width: f64,
    /// Standard deviation of the hallway width
    pub width_dev: f64,
    /// Minimum hallway width
    pub min_width: f64,
    /// Maximum hallway width
    pub max_width: f64,
}

impl HallwayProperties {
    /// Validates widths, distances and segment sizes.
    pub fn validate(&self) -> WarrenResult<()> {
        require_non_negative("curliness", self.curliness)?;
        require_non_negative("curly_min_distance", self.curly_min_distance)?;
        require_non_negative("curly_segment_avg_size", self.curly_segment_avg_size)?;
        require_non_negative("curly_segment_dev", self.curly_segment_dev)?;
        require_non_negative("avg_width", self.avg_width)?;
        require_non_negative("width_dev", self.width_dev)?;
        require_non_negative("min_width", self.min_width)?;
        require_non_negative("max_width", self.max_width)?;

        if self.curly_min_distance < 1.0 {
            return Err(WarrenError::InvalidParameters(
                "curly_min_distance must be >= 1".to_string(),
            ));
        }
        if self.curly_segment_avg_size < 1.0 {
            return Err(WarrenError::InvalidParameters(
                "curly_segment_avg_size must be >= 1".to_string(),
            ));
        }
        if self.min_width > self.max_width {
            return Err(WarrenError::InvalidParameters(format!(
                "min_width ({}) exceeds max_width ({})",
                self.min_width, self.max_width
            )));
        }
        Ok(())
    }
}

impl Default for HallwayProperties {
    fn default() -> Self {
        Self {
            curliness: 0.6,
            curly_min_distance: 8.0,
            curly_segment_avg_size: 6.0,
            curly_segment_dev: 2.0,
            avg_width: 2.0,
            width_dev: 0.8,
            min_width: 1.0,
            max_width: 4.0,
        }
    }
}

/// Everything `generate` needs, bundled for (de)serialization.
///
/// This is the document shape the resource layer persists; the engine itself
/// never writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapParams {
    pub size: GridSize,
    pub rooms: Vec<RoomProperties>,
    pub hallways: HallwayProperties,
}

impl MapParams {
    /// Validates the whole parameter set.
    pub fn validate(&self) -> WarrenResult<()> {
        self.size.validate()?;
        if self.rooms.is_empty() {
            return Err(WarrenError::InvalidParameters(
                "at least one room-properties entry is required".to_string(),
            ));
        }
        for room in &self.rooms {
            room.validate()?;
        }
        self.hallways.validate()
    }

    /// A small, quick parameter set for tests.
    pub fn for_testing() -> Self {
        Self {
            size: GridSize::new(80, 40),
            rooms: vec![RoomProperties {
                zone: ZoneProperties {
                    avg_size: 60.0,
                    size_deviation: 15.0,
                    borders_fuzziness: 1.5,
                    borders_fuzzy_deviation: 0.6,
                    borders_fuzzy_distance: 3.0,
                    min_height: 4.0,
                    max_height: 10.0,
                },
                holes: ZoneProperties {
                    avg_size: 6.0,
                    size_deviation: 2.0,
                    borders_fuzziness: 0.8,
                    borders_fuzzy_deviation: 0.4,
                    borders_fuzzy_distance: 2.0,
                    min_height: 1.0,
                    max_height: 3.0,
                },
                avg_rooms_n: 6.0,
                rooms_n_dev: 1.0,
                avg_holes_n: 1.0,
                holes_n_dev: 0.5,
            }],
            hallways: HallwayProperties::default(),
        }
    }
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            size: GridSize::default(),
            rooms: vec![RoomProperties {
                zone: ZoneProperties {
                    avg_size: 120.0,
                    size_deviation: 40.0,
                    borders_fuzziness: 2.0,
                    borders_fuzzy_deviation: 0.8,
                    borders_fuzzy_distance: 4.0,
                    min_height: 5.0,
                    max_height: 16.0,
                },
                holes: ZoneProperties {
                    avg_size: 9.0,
                    size_deviation: 4.0,
                    borders_fuzziness: 1.0,
                    borders_fuzzy_deviation: 0.5,
                    borders_fuzzy_distance: 2.0,
                    min_height: 1.0,
                    max_height: 4.0,
                },
                avg_rooms_n: 10.0,
                rooms_n_dev: 2.0,
                avg_holes_n: 1.5,
                holes_n_dev: 1.0,
            }],
            hallways: HallwayProperties::default(),
        }
    }
}

/// Counters reported alongside a generated map.
///
/// Purely diagnostic; nothing in the engine reads these back.
#[derive(Debug, Clone, Default)]
pub struct GenerationStats {
    /// Rooms requested across all passes
    pub rooms_requested: usize,
    /// Rooms successfully placed
    pub rooms_placed: usize,
    /// Rooms skipped after exhausting placement retries
    pub rooms_skipped: usize,
    /// Holes successfully punched
    pub holes_placed: usize,
    /// Holes skipped after exhausting placement retries
    pub holes_skipped: usize,
    /// Hallways carved during the connectivity phase
    pub hallways_carved: usize,
    /// Connectivity path queries issued
    pub path_queries: usize,
    /// Wall-clock time spent in generate()
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(MapParams::default().validate().is_ok());
        assert!(MapParams::for_testing().validate().is_ok());
    }

    #[test]
    fn test_zero_grid_rejected() {
        let mut params = MapParams::for_testing();
        params.size = GridSize::new(0, 40);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_empty_room_list_rejected() {
        let mut params = MapParams::for_testing();
        params.rooms.clear();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_contradictory_heights_rejected() {
        let mut params = MapParams::for_testing();
        params.rooms[0].zone.min_height = 12.0;
        params.rooms[0].zone.max_height = 4.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_and_nan_fields_rejected() {
        let mut params = MapParams::for_testing();
        params.hallways.curliness = -0.1;
        assert!(params.validate().is_err());

        let mut params = MapParams::for_testing();
        params.rooms[0].zone.avg_size = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_segment_distance_rejected() {
        // Used as a step divisor during fuzzing, so it must stay >= 1.
        let mut params = MapParams::for_testing();
        params.rooms[0].zone.borders_fuzzy_distance = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_json_round_trip() {
        let params = MapParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: MapParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
