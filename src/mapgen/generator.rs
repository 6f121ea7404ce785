//! # Map Generator
//!
//! Turns statistical parameters into a tile grid.
//!
//! Generation proceeds in three phases:
//! 1. Rooms: for each room-properties pass, sample a room count, then place
//!    each room by bounded random retries and stamp it with fuzzy borders
//!    and interior holes.
//! 2. Connectivity: index room centers in a quadtree, derive a
//!    characteristic query distance from the pairwise distance
//!    distribution, and probe nearby pairs with a walkable-only path
//!    search.
//! 3. Hallways: pairs that fail the probe get a curved hallway carved
//!    directly into the grid.
//!
//! Every randomized step draws from the `StdRng` handed to `generate`, so a
//! fixed seed and parameter set reproduces the grid exactly.

use crate::geometry::{Area, Position};
use crate::mapgen::{
    GenerationStats, Grid, GridSize, HallwayProperties, MapParams, RoomProperties, Tile,
    ZoneProperties,
};
use crate::pathfind::GridPather;
use crate::spatial::{QuadTree, SubdivisionPolicy, Visit};
use crate::{config, WarrenResult};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Instant;

/// Output of one `generate` call.
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    /// The finished tile grid
    pub grid: Grid,
    /// Areas of the rooms that were placed, in placement order
    pub rooms: Vec<Area>,
    /// Diagnostic counters
    pub stats: GenerationStats,
}

/// Procedural dungeon-map generator.
///
/// The struct itself only carries retry budgets and the connectivity skip
/// chance; all shape parameters arrive per call.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use warren::{MapGenerator, MapParams};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let generator = MapGenerator::new();
/// let map = generator
///     .generate_params(&MapParams::for_testing(), &mut rng)
///     .unwrap();
/// assert!(!map.rooms.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MapGenerator {
    /// Retry budget for placing one room
    pub room_placement_attempts: u32,
    /// Retry budget for placing one hole
    pub hole_placement_attempts: u32,
    /// Chance to skip the connectivity probe for one neighbor pair, which
    /// keeps the map from becoming a fully meshed web of hallways
    pub connect_skip_chance: f64,
}

impl MapGenerator {
    /// Creates a generator with the default retry budgets.
    pub fn new() -> Self {
        Self {
            room_placement_attempts: config::ROOM_PLACEMENT_ATTEMPTS,
            hole_placement_attempts: config::HOLE_PLACEMENT_ATTEMPTS,
            connect_skip_chance: 0.5,
        }
    }

    /// Generates a map from a bundled parameter document.
    pub fn generate_params(
        &self,
        params: &MapParams,
        rng: &mut StdRng,
    ) -> WarrenResult<GeneratedMap> {
        self.generate(params.size, &params.rooms, &params.hallways, rng)
    }

    /// Generates a map.
    ///
    /// Validates all parameters up front and fails fast on degenerate
    /// inputs; past validation there is no error path, only rooms and holes
    /// that get skipped when their placement retries run out.
    pub fn generate(
        &self,
        size: GridSize,
        room_props: &[RoomProperties],
        hallway_props: &HallwayProperties,
        rng: &mut StdRng,
    ) -> WarrenResult<GeneratedMap> {
        let params = MapParams {
            size,
            rooms: room_props.to_vec(),
            hallways: hallway_props.clone(),
        };
        params.validate()?;

        let started = Instant::now();
        let mut grid = Grid::new(size.width, size.height, Tile::EmptySpace);
        let mut stats = GenerationStats::default();
        let mut rooms = Vec::new();

        for (pass, props) in room_props.iter().enumerate() {
            let rooms_n = sample_count(rng, props.avg_rooms_n, props.rooms_n_dev);
            let mut hole_budget = sample_count(
                rng,
                props.avg_holes_n * rooms_n as f64,
                props.holes_n_dev,
            );
            debug!(
                "pass {}: {} rooms requested, {} holes budgeted",
                pass, rooms_n, hole_budget
            );
            stats.rooms_requested += rooms_n;

            for i in 0..rooms_n {
                let rooms_left = rooms_n - i;
                // Spread the hole budget across the rooms still to come,
                // remainder landing on earlier rooms.
                let holes_n = hole_budget.div_ceil(rooms_left);
                match self.place_holed_room(&mut grid, props, holes_n, rng, &mut stats) {
                    Some(area) => {
                        trace!("placed room {:?} with {} holes", area, holes_n);
                        rooms.push(area);
                        stats.rooms_placed += 1;
                        hole_budget = hole_budget.saturating_sub(holes_n);
                    }
                    None => {
                        trace!("skipped room after {} attempts", self.room_placement_attempts);
                        stats.rooms_skipped += 1;
                    }
                }
            }
        }

        self.ensure_pathing(&mut grid, &rooms, hallway_props, rng, &mut stats);

        stats.elapsed = started.elapsed();
        info!(
            "generated {}x{} map: {} rooms ({} skipped), {} hallways, {:?}",
            size.width,
            size.height,
            stats.rooms_placed,
            stats.rooms_skipped,
            stats.hallways_carved,
            stats.elapsed
        );

        Ok(GeneratedMap { grid, rooms, stats })
    }

    /// Attempts to place one room and punch its holes.
    ///
    /// The room rectangle must land entirely on `EmptySpace`; after the
    /// retry budget runs out the room is skipped and `None` is returned.
    fn place_holed_room(
        &self,
        grid: &mut Grid,
        props: &RoomProperties,
        holes_n: usize,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
    ) -> Option<Area> {
        let area = self.try_place_zone(grid, &props.zone, rng)?;
        stamp_zone(grid, &area, Tile::Walkable, &props.zone, rng);

        for _ in 0..holes_n {
            match self.try_place_hole(&area, &props.holes, rng) {
                Some(hole) => {
                    stamp_zone(grid, &hole, Tile::Hole, &props.holes, rng);
                    stats.holes_placed += 1;
                }
                None => stats.holes_skipped += 1,
            }
        }
        Some(area)
    }

    /// Random placement of a room rectangle onto empty space.
    fn try_place_zone(
        &self,
        grid: &Grid,
        zone: &ZoneProperties,
        rng: &mut StdRng,
    ) -> Option<Area> {
        let gw = grid.width() as i32;
        let gh = grid.height() as i32;
        for _ in 0..self.room_placement_attempts {
            let (w, h) = sample_zone_dims(rng, zone);
            let w = w.min(gw);
            let h = h.min(gh);
            if w < 1 || h < 1 {
                continue;
            }
            let x = if gw == w { 0 } else { rng.gen_range(0..=(gw - w)) };
            let y = if gh == h { 0 } else { rng.gen_range(0..=(gh - h)) };
            let candidate = Area::new(x, y, w, h);
            if self.area_is_empty_space(grid, &candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Random placement of a hole rectangle inside a room.
    fn try_place_hole(
        &self,
        room: &Area,
        zone: &ZoneProperties,
        rng: &mut StdRng,
    ) -> Option<Area> {
        for _ in 0..self.hole_placement_attempts {
            let (w, h) = sample_zone_dims(rng, zone);
            if w < 1 || h < 1 || w > room.width || h > room.height {
                continue;
            }
            let x = room.x + rng.gen_range(0..=(room.width - w));
            let y = room.y + rng.gen_range(0..=(room.height - h));
            return Some(Area::new(x, y, w, h));
        }
        None
    }

    fn area_is_empty_space(&self, grid: &Grid, area: &Area) -> bool {
        for x in area.x..(area.x + area.width) {
            for y in area.y..(area.y + area.height) {
                if grid.tile(Position::new(x, y)) != Some(Tile::EmptySpace) {
                    return false;
                }
            }
        }
        true
    }

    /// Connectivity phase: probe nearby room pairs with a walkable-only
    /// path search and carve hallways where the probe fails.
    ///
    /// This is a heuristic, not a guarantee: the random skips and the
    /// percentile-derived query distance keep hallway count reasonable but
    /// do not prove full connectivity for pathological room layouts.
    fn ensure_pathing(
        &self,
        grid: &mut Grid,
        rooms: &[Area],
        hallways: &HallwayProperties,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
    ) {
        if rooms.len() < 2 {
            return;
        }

        let centers: Vec<Position> = rooms.iter().map(Area::center).collect();
        let bounds = Area::new(0, 0, grid.width() as i32, grid.height() as i32);
        let mut tree: QuadTree<usize> = QuadTree::new(
            bounds,
            config::CONNECTIVITY_TREE_DEPTH,
            config::CONNECTIVITY_TREE_CAPACITY,
            SubdivisionPolicy::Static,
        );
        for (i, center) in centers.iter().enumerate() {
            tree.insert(Area::new(center.x, center.y, 1, 1), i);
        }

        let selected = selected_distance(&centers);
        let wide = (grid.width().max(grid.height()) as f64) / 10.0;
        let radius = selected.max(wide).max(1.0);
        let probe_depth = (2.0 * selected).ceil().max(16.0) as u32;
        debug!(
            "connectivity: selected distance {:.1}, query radius {:.1}",
            selected, radius
        );

        for (i, center) in centers.iter().enumerate() {
            let region = Area::around(*center, (2.0 * radius) as i32, (2.0 * radius) as i32);
            let mut neighbors = Vec::new();
            tree.visit(&region, |_, &other| {
                if other != i {
                    neighbors.push(other);
                }
                Visit::Continue
            });

            for j in neighbors {
                if centers[i].euclidean_distance(centers[j]) > radius {
                    continue;
                }
                if rng.gen_bool(self.connect_skip_chance) {
                    continue;
                }
                self.ensure_tworoom_path(
                    grid,
                    centers[i],
                    centers[j],
                    probe_depth,
                    hallways,
                    rng,
                    stats,
                );
            }
        }

        // Final sweep: neighbors in quadtree traversal order get linked so
        // the random skips above cannot leave obvious islands behind.
        let order: Vec<usize> = tree
            .traversal_order()
            .into_iter()
            .filter_map(|id| tree.get(id).copied())
            .collect();
        for pair in order.windows(2) {
            self.ensure_tworoom_path(
                grid,
                centers[pair[0]],
                centers[pair[1]],
                probe_depth,
                hallways,
                rng,
                stats,
            );
        }
    }

    /// Probes one room pair and carves a hallway when no walkable route
    /// exists within the depth budget.
    #[allow(clippy::too_many_arguments)]
    fn ensure_tworoom_path(
        &self,
        grid: &mut Grid,
        from: Position,
        to: Position,
        probe_depth: u32,
        hallways: &HallwayProperties,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
    ) {
        stats.path_queries += 1;
        let connected = {
            let pather = GridPather::new(grid);
            !pather.path_to(from, to, f64::INFINITY, probe_depth).is_empty()
        };
        if !connected {
            carve_hallway(grid, from, to, hallways, rng);
            stats.hallways_carved += 1;
        }
    }
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws from a normal distribution via the Box-Muller transform.
///
/// The crate keeps its own gaussian: only uniform draws come from the rng,
/// so seeding behavior stays independent of distribution-crate internals.
fn sample_normal(rng: &mut StdRng, mean: f64, dev: f64) -> f64 {
    if dev <= 0.0 {
        return mean;
    }
    let u1 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2 = rng.gen::<f64>();
    mean + dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// A positive-clamped normal draw rounded to a count.
fn sample_count(rng: &mut StdRng, avg: f64, dev: f64) -> usize {
    sample_normal(rng, avg, dev).round().max(0.0) as usize
}

/// Samples zone dimensions: an area target shapes the rectangle, with both
/// axes clamped to the zone's height limits.
fn sample_zone_dims(rng: &mut StdRng, zone: &ZoneProperties) -> (i32, i32) {
    let lo = zone.min_height.max(1.0);
    let hi = zone.max_height.max(lo);
    let target_area = sample_normal(rng, zone.avg_size, zone.size_deviation).max(1.0);
    let side = target_area.sqrt();
    let height = sample_normal(rng, side, side * 0.25).clamp(lo, hi);
    let width = (target_area / height).clamp(lo, hi);
    (width.round() as i32, height.round() as i32)
}

/// Characteristic connectivity-query radius: the larger of a low percentile
/// of all pairwise center distances and half the mean distance.
fn selected_distance(centers: &[Position]) -> f64 {
    let mut distances = Vec::new();
    for (i, a) in centers.iter().enumerate() {
        for b in &centers[(i + 1)..] {
            distances.push(a.euclidean_distance(*b));
        }
    }
    if distances.is_empty() {
        return 0.0;
    }
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let p15 = distances[(distances.len() * 15) / 100];
    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    p15.max(0.5 * mean)
}

// -- zone stamping with border fuzzing -------------------------------------

/// Stamps a zone rectangle into the grid with fuzzy borders.
///
/// The shape is composited in a staging buffer of `Option<Tile>` oversized
/// by twice a derived shift on all sides, so extruded pixels cannot clip;
/// only `Some` cells are copied out, preserving neighboring tiles already
/// in the grid. The copy is bounds-checked on both buffers: a pathological
/// deviation clips at the margin instead of writing out of bounds.
fn stamp_zone(grid: &mut Grid, target: &Area, tile: Tile, zone: &ZoneProperties, rng: &mut StdRng) {
    let shift = (zone.borders_fuzziness + 4.0 * zone.borders_fuzzy_deviation).ceil() as i32;
    let margin = 2 * shift.max(0);
    let w = target.width;
    let h = target.height;
    let sw = w + 2 * margin;
    let sh = h + 2 * margin;

    let mut staging = StagingBuffer::new(sw, sh);
    for x in 0..w {
        for y in 0..h {
            staging.set(margin + x, margin + y, Some(tile));
        }
    }

    if zone.borders_fuzziness > 0.0 {
        let top = fuzz_offsets(rng, w, zone, h as f64 / 2.0);
        let bottom = fuzz_offsets(rng, w, zone, h as f64 / 2.0);
        let left = fuzz_offsets(rng, h, zone, w as f64 / 2.0);
        let right = fuzz_offsets(rng, h, zone, w as f64 / 2.0);

        for x in 0..w {
            apply_edge_offset(
                &mut staging,
                top[x as usize],
                tile,
                |i| (margin + x, margin - i),
                |i| (margin + x, margin + i),
            );
            apply_edge_offset(
                &mut staging,
                bottom[x as usize],
                tile,
                |i| (margin + x, margin + h - 1 + i),
                |i| (margin + x, margin + h - 1 - i),
            );
        }
        for y in 0..h {
            apply_edge_offset(
                &mut staging,
                left[y as usize],
                tile,
                |i| (margin - i, margin + y),
                |i| (margin + i, margin + y),
            );
            apply_edge_offset(
                &mut staging,
                right[y as usize],
                tile,
                |i| (margin + w - 1 + i, margin + y),
                |i| (margin + w - 1 - i, margin + y),
            );
        }
    }

    for sx in 0..sw {
        for sy in 0..sh {
            if let Some(Some(t)) = staging.get(sx, sy) {
                grid.set_pos(
                    Position::new(target.x - margin + sx, target.y - margin + sy),
                    t,
                );
            }
        }
    }
}

/// Applies one column/row of edge fuzz: positive offsets extrude `offset`
/// pixels outward from the edge, negative offsets erode inward.
fn apply_edge_offset(
    staging: &mut StagingBuffer,
    offset: i32,
    tile: Tile,
    outward: impl Fn(i32) -> (i32, i32),
    inward: impl Fn(i32) -> (i32, i32),
) {
    if offset > 0 {
        for i in 1..=offset {
            let (x, y) = outward(i);
            staging.set(x, y, Some(tile));
        }
    } else {
        for i in 0..(-offset) {
            let (x, y) = inward(i);
            staging.set(x, y, None);
        }
    }
}

/// Per-cell border displacements for one edge.
///
/// Perturbations are sampled at segment boundaries spaced
/// `borders_fuzzy_distance` apart and linearly interpolated between them,
/// so the silhouette wanders without jump discontinuities. Each sample is
/// clamped to half the opposite dimension.
fn fuzz_offsets(rng: &mut StdRng, len: i32, zone: &ZoneProperties, clamp_to: f64) -> Vec<i32> {
    let len = len.max(0) as usize;
    let seg = (zone.borders_fuzzy_distance.max(1.0)) as usize;
    let boundary_count = len / seg + 2;
    let boundaries: Vec<f64> = (0..boundary_count)
        .map(|_| {
            (sample_normal(rng, 0.0, zone.borders_fuzzy_deviation) * zone.borders_fuzziness)
                .clamp(-clamp_to, clamp_to)
        })
        .collect();

    (0..len)
        .map(|i| {
            let k = i / seg;
            let t = (i % seg) as f64 / seg as f64;
            (boundaries[k] * (1.0 - t) + boundaries[k + 1] * t).round() as i32
        })
        .collect()
}

/// The compositing buffer used while fuzzing one zone.
///
/// `None` means "undetermined": those cells are simply not copied into the
/// grid, which is how erosion leaves the underlying tiles untouched.
struct StagingBuffer {
    width: i32,
    height: i32,
    cells: Vec<Option<Tile>>,
}

impl StagingBuffer {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width.max(0) * height.max(0)) as usize],
        }
    }

    fn get(&self, x: i32, y: i32) -> Option<Option<Tile>> {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            Some(self.cells[(x * self.height + y) as usize])
        } else {
            None
        }
    }

    fn set(&mut self, x: i32, y: i32, value: Option<Tile>) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.cells[(x * self.height + y) as usize] = value;
        }
    }
}

// -- hallway carving -------------------------------------------------------

/// Carves a hallway between two points directly into the grid.
///
/// Below `curly_min_distance` the hallway is a straight thick line.
/// Otherwise it is a random walk: each segment's length is drawn around
/// `curly_segment_avg_size` and its direction is the remaining straight
/// line to the target rotated by a normal angle scaled by `curliness`; once
/// the walk is within `curly_min_distance` of the target a final straight
/// segment closes the gap exactly.
fn carve_hallway(
    grid: &mut Grid,
    from: Position,
    to: Position,
    props: &HallwayProperties,
    rng: &mut StdRng,
) {
    let mut current = (from.x as f64, from.y as f64);
    let target = (to.x as f64, to.y as f64);
    let mut last_cell = from;
    stamp_thick_point(grid, current, 0.0, 1.0);

    if from.euclidean_distance(to) >= props.curly_min_distance {
        loop {
            let (dx, dy) = (target.0 - current.0, target.1 - current.1);
            let remaining = dx.hypot(dy);
            if remaining < props.curly_min_distance {
                break;
            }
            let angle = dy.atan2(dx) + sample_normal(rng, 0.0, 1.0) * props.curliness;
            let length =
                sample_normal(rng, props.curly_segment_avg_size, props.curly_segment_dev)
                    .max(1.0)
                    .min(remaining);
            current = walk_segment(grid, current, angle, length, props, rng, &mut last_cell);
        }
    }

    // Closing straight segment to the exact target.
    let (dx, dy) = (target.0 - current.0, target.1 - current.1);
    let remaining = dx.hypot(dy);
    if remaining > 0.0 {
        walk_segment(
            grid,
            current,
            dy.atan2(dx),
            remaining,
            props,
            rng,
            &mut last_cell,
        );
    }
    stamp_walkable_connected(grid, to, &mut last_cell);
}

/// Walks one segment in unit steps, stamping a thick walkable point at each
/// step. Returns the endpoint of the walk.
fn walk_segment(
    grid: &mut Grid,
    start: (f64, f64),
    angle: f64,
    length: f64,
    props: &HallwayProperties,
    rng: &mut StdRng,
    last_cell: &mut Position,
) -> (f64, f64) {
    let (dx, dy) = (angle.cos(), angle.sin());
    let steps = length.ceil().max(1.0) as i32;
    let mut p = start;
    for _ in 0..steps {
        p.0 += dx;
        p.1 += dy;
        // Keep the walk on the grid so the carved chain cannot break at
        // the border when stamps clip.
        p.0 = p.0.clamp(0.0, (grid.width() as f64) - 1.0);
        p.1 = p.1.clamp(0.0, (grid.height() as f64) - 1.0);
        let width = sample_normal(rng, props.avg_width, props.width_dev)
            .clamp(props.min_width, props.max_width)
            .max(1.0);
        let cell = Position::new(p.0.round() as i32, p.1.round() as i32);
        stamp_walkable_connected(grid, cell, last_cell);
        stamp_thick_point(grid, p, angle, width);
    }
    p
}

/// Stamps a cell walkable and, when the previous stamped cell is a diagonal
/// neighbor, bridges the shared corner so the carved chain stays passable
/// for walkable-only searches that refuse corner cuts.
fn stamp_walkable_connected(grid: &mut Grid, cell: Position, last_cell: &mut Position) {
    if cell != *last_cell {
        let delta = cell - *last_cell;
        if delta.x.abs() == 1 && delta.y.abs() == 1 {
            grid.set_pos(Position::new(cell.x, last_cell.y), Tile::Walkable);
        }
        *last_cell = cell;
    }
    grid.set_pos(cell, Tile::Walkable);
}

/// Stamps a hallway cross-section: `width` cells perpendicular to the walk
/// direction, centered on the path point. Half-cell sampling along the
/// cross-section avoids rounding gaps.
fn stamp_thick_point(grid: &mut Grid, p: (f64, f64), angle: f64, width: f64) {
    let (px, py) = (-angle.sin(), angle.cos());
    let half = width / 2.0;
    let mut t = -half;
    while t <= half {
        let x = (p.0 + px * t).round() as i32;
        let y = (p.1 + py * t).round() as i32;
        grid.set_pos(Position::new(x, y), Tile::Walkable);
        t += 0.5;
    }
}
