//! # Warren Map Preview Entry Point
//!
//! Generates a map from parameters (built-in defaults or a JSON document)
//! and prints it as ASCII, optionally overlaying a pathfinding probe
//! between two points.

use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use warren::{GridPather, MapGenerator, MapParams, Position, WarrenError, WarrenResult};

/// Command line arguments for the map preview tool.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "Procedural dungeon-map generation preview")]
#[command(version)]
struct Args {
    /// Random seed for map generation
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Grid width in tiles (overrides the params document)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in tiles (overrides the params document)
    #[arg(long)]
    height: Option<usize>,

    /// Path to a JSON generation-parameters document
    #[arg(short, long)]
    params: Option<std::path::PathBuf>,

    /// Pathfinding probe as "x1,y1,x2,y2"; the route is overlaid with '*'
    #[arg(long)]
    path: Option<String>,
}

fn main() -> WarrenResult<()> {
    env_logger::init();
    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<MapParams>(&text)?
        }
        None => MapParams::default(),
    };
    if let Some(width) = args.width {
        params.size.width = width;
    }
    if let Some(height) = args.height {
        params.size.height = height;
    }

    info!("generating {}x{} map with seed {}", params.size.width, params.size.height, args.seed);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let map = MapGenerator::new().generate_params(&params, &mut rng)?;

    let mut rendered: Vec<Vec<char>> = (0..map.grid.height())
        .map(|y| {
            (0..map.grid.width())
                .map(|x| map.grid.get(x, y).map(|t| t.glyph()).unwrap_or('?'))
                .collect()
        })
        .collect();

    if let Some(probe) = &args.path {
        let (source, destination) = parse_probe(probe)?;
        let pather = GridPather::new(&map.grid);
        let depth = (map.grid.width() * map.grid.height()) as u32;
        let route = pather.path_to_pt(source, destination, f64::INFINITY, depth);
        if route.is_empty() {
            info!("no walkable route from {:?} to {:?}", source, destination);
        } else {
            info!("route of {} steps found", route.len() - 1);
            for point in route {
                rendered[point.y as usize][point.x as usize] = '*';
            }
        }
    }

    for row in rendered {
        println!("{}", row.into_iter().collect::<String>());
    }
    println!(
        "rooms: {} placed, {} skipped | holes: {} | hallways: {} | {:?}",
        map.stats.rooms_placed,
        map.stats.rooms_skipped,
        map.stats.holes_placed,
        map.stats.hallways_carved,
        map.stats.elapsed
    );
    Ok(())
}

/// Parses "x1,y1,x2,y2" into two probe positions.
fn parse_probe(probe: &str) -> WarrenResult<(Position, Position)> {
    let numbers: Vec<i32> = probe
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|e| WarrenError::InvalidParameters(format!("bad --path value: {}", e)))?;
    if numbers.len() != 4 {
        return Err(WarrenError::InvalidParameters(
            "--path expects exactly four comma-separated integers".to_string(),
        ));
    }
    Ok((
        Position::new(numbers[0], numbers[1]),
        Position::new(numbers[2], numbers[3]),
    ))
}
