//! DhruvaExplore - one planning cycle from the command line
//!
//! Loads a character map and an optional TOML configuration, runs either a
//! goal-directed plan (`--goal`) or a frontier exploration, and prints the map
//! with the resulting path drawn on it.
//!
//! ```text
//! dhruva-explore <map.txt> [--config dhruva-explore.toml] [--resolution 0.05]
//!                          [--start x,y[,theta]] [--goal x,y[,theta]]
//! ```

use std::path::Path;

use dhruva_explore::{
    CellClass, ExplorationPlanner, ExploreConfig, ExploreError, OccupancyGrid, Plan, Pose2D,
    Result, WorldPoint,
};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = "dhruva-explore.toml";
const DEFAULT_RESOLUTION: f32 = 0.05;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "dhruva_explore=info"
                    .parse()
                    .map_err(|e| ExploreError::Config(format!("bad log directive: {}", e)))?,
            ),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let map_path = args
        .get(1)
        .filter(|a| !a.starts_with("--"))
        .ok_or_else(|| ExploreError::InvalidInput("usage: dhruva-explore <map.txt> [options]".into()))?;

    let config_path = flag_value(&args, "--config");
    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from {}", path);
            ExploreConfig::load(Path::new(path))?
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG);
            ExploreConfig::load(Path::new(DEFAULT_CONFIG))?
        }
        None => {
            info!("Using default configuration");
            ExploreConfig::default()
        }
    };

    let resolution = match flag_value(&args, "--resolution") {
        Some(v) => v
            .parse::<f32>()
            .map_err(|e| ExploreError::InvalidInput(format!("bad --resolution: {}", e)))?,
        None => DEFAULT_RESOLUTION,
    };

    info!("DhruvaExplore v{}", env!("CARGO_PKG_VERSION"));
    let text = std::fs::read_to_string(map_path)?;
    let grid = OccupancyGrid::from_ascii(&text, resolution, WorldPoint::ZERO)?;
    info!(
        "Map {}x{} @ {:.3}m: {} free, {} occupied, {} inflated, {} unknown",
        grid.width(),
        grid.height(),
        grid.resolution(),
        grid.count(CellClass::Free),
        grid.count(CellClass::Occupied),
        grid.count(CellClass::InflatedOccupied),
        grid.count(CellClass::Unknown)
    );

    let start = match flag_value(&args, "--start") {
        Some(v) => parse_pose(v)?,
        None => first_free_pose(&grid)?,
    };
    let goal = flag_value(&args, "--goal").map(parse_pose).transpose()?;

    let mut planner = ExplorationPlanner::new(config.planner);
    let plan = match goal {
        Some(goal) => planner.make_plan(&grid, start, goal),
        None => planner.do_exploration(&grid, start),
    };

    match plan {
        Ok(plan) => {
            println!("{}", render(&grid, &plan));
            for pose in &plan.poses {
                println!("{:.3} {:.3} {:.3}", pose.x, pose.y, pose.theta);
            }
            Ok(())
        }
        Err(ExploreError::NoFrontiers) => {
            info!("No frontiers left: exploration complete");
            Ok(())
        }
        Err(e) => {
            warn!("No plan this cycle: {}", e);
            Err(e)
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Parse `x,y` or `x,y,theta` (meters, radians).
fn parse_pose(value: &str) -> Result<Pose2D> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| ExploreError::InvalidInput(format!("bad pose '{}': {}", value, e)))?;
    match parts.as_slice() {
        [x, y] => Ok(Pose2D::new(*x, *y, 0.0)),
        [x, y, theta] => Ok(Pose2D::new(*x, *y, *theta)),
        _ => Err(ExploreError::InvalidInput(format!(
            "pose '{}' needs 2 or 3 values",
            value
        ))),
    }
}

fn first_free_pose(grid: &OccupancyGrid) -> Result<Pose2D> {
    grid.cells()
        .iter()
        .position(|&c| c == CellClass::Free)
        .and_then(|i| grid.index_to_world(i))
        .map(|p| Pose2D::from_point(p, 0.0))
        .ok_or_else(|| ExploreError::DegenerateGrid("map has no free cell to start from".into()))
}

/// Map text with path cells drawn as `*`, start `S` and goal `G`.
fn render(grid: &OccupancyGrid, plan: &Plan) -> String {
    let mut rows: Vec<Vec<char>> = grid
        .to_ascii()
        .lines()
        .map(|l| l.chars().collect())
        .collect();
    let last = plan.cells.len().saturating_sub(1);
    for (i, &cell) in plan.cells.iter().enumerate() {
        let Some(coord) = grid.coord_of(cell) else {
            continue;
        };
        let row = grid.height() - 1 - coord.y as usize;
        let mark = match i {
            0 => 'S',
            _ if i == last => 'G',
            _ => '*',
        };
        rows[row][coord.x as usize] = mark;
    }
    rows.into_iter()
        .map(|r| r.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
