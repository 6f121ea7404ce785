//! Integration tests for pathfinding over generated maps.

use rand::{rngs::StdRng, SeedableRng};
use warren::{Direction, GridPather, MapGenerator, MapParams, Position, Tile};

/// Parameters with gentle border fuzz and no holes, so every placed room
/// keeps a walkable center.
fn calm_params() -> MapParams {
    let mut params = MapParams::for_testing();
    params.rooms[0].zone.borders_fuzziness = 0.5;
    params.rooms[0].zone.borders_fuzzy_deviation = 0.2;
    params.rooms[0].zone.min_height = 5.0;
    params.rooms[0].avg_holes_n = 0.0;
    params.rooms[0].holes_n_dev = 0.0;
    params
}

fn generate(seed: u64) -> warren::GeneratedMap {
    let mut rng = StdRng::seed_from_u64(seed);
    MapGenerator::new()
        .generate_params(&calm_params(), &mut rng)
        .unwrap()
}

#[test]
fn test_round_trip_between_room_centers() {
    let map = generate(1001);
    assert!(map.rooms.len() >= 2);
    let a = map.rooms[0].center();
    let b = map.rooms[map.rooms.len() - 1].center();

    let pather = GridPather::new(&map.grid);
    let depth = (map.grid.width() * map.grid.height()) as u32;

    let forward = pather.path_to_pt(a, b, f64::INFINITY, depth);
    assert_eq!(forward.first(), Some(&a));
    assert_eq!(forward.last(), Some(&b));
    for pair in forward.windows(2) {
        assert!(Direction::from_delta(pair[1] - pair[0]).is_some());
        assert!(map.grid.is_walkable(pair[1]));
    }

    // Undirected graph: the reverse query must also succeed
    let backward = pather.path_to_pt(b, a, f64::INFINITY, depth);
    assert_eq!(backward.first(), Some(&b));
    assert_eq!(backward.last(), Some(&a));
}

#[test]
fn test_same_point_query_is_empty() {
    let map = generate(1002);
    let pather = GridPather::new(&map.grid);
    let center = map.rooms[0].center();
    assert!(pather.path_to(center, center, f64::INFINITY, 1000).is_empty());
    assert!(pather.path_to_pt(center, center, 0.0, 1000).is_empty());
}

#[test]
fn test_infinite_penalty_stays_on_floor() {
    let map = generate(1003);
    let pather = GridPather::new(&map.grid);
    let depth = (map.grid.width() * map.grid.height()) as u32;

    // Destination on unexcavated space can never be entered
    let (x, y, _) = map
        .grid
        .iter()
        .find(|(_, _, t)| *t == Tile::EmptySpace)
        .expect("generated maps keep some empty space");
    let rock = Position::new(x as i32, y as i32);
    let center = map.rooms[0].center();
    assert!(pather.path_to(center, rock, f64::INFINITY, depth).is_empty());

    // A finite penalty tunnels there at a cost
    let tunneled = pather.path_to_pt(center, rock, 4.0, depth);
    assert_eq!(tunneled.first(), Some(&center));
    assert_eq!(tunneled.last(), Some(&rock));
}

#[test]
fn test_direction_and_point_sequences_agree() {
    let map = generate(1004);
    assert!(map.rooms.len() >= 2);
    let a = map.rooms[0].center();
    let b = map.rooms[1].center();
    let pather = GridPather::new(&map.grid);
    let depth = (map.grid.width() * map.grid.height()) as u32;

    let directions = pather.path_to(a, b, f64::INFINITY, depth);
    let points = pather.path_to_pt(a, b, f64::INFINITY, depth);
    assert_eq!(points.len(), directions.len() + 1);

    let mut replayed = a;
    for (dir, expected) in directions.iter().zip(points.iter().skip(1)) {
        replayed = replayed.step(*dir);
        assert_eq!(replayed, *expected);
    }
    assert_eq!(replayed, b);
}

#[test]
fn test_repeated_queries_are_deterministic() {
    let map = generate(1005);
    let pather = GridPather::new(&map.grid);
    let depth = (map.grid.width() * map.grid.height()) as u32;
    let a = map.rooms[0].center();
    let b = map.rooms[map.rooms.len() - 1].center();

    let first = pather.path_to(a, b, f64::INFINITY, depth);
    for _ in 0..3 {
        assert_eq!(pather.path_to(a, b, f64::INFINITY, depth), first);
    }
}
