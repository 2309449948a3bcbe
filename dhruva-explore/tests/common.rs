//! Test utilities for DhruvaExplore.
//!
//! Fixture grids, a seeded grid generator and a brute-force reference for the
//! obstacle transform.

#![allow(dead_code)]

use dhruva_explore::{
    CellClass, DIAGONAL_COST, GridCoord, OccupancyGrid, PlannerConfig, Pose2D, STRAIGHT_COST,
    WorldPoint,
};

/// Parse a character map at the given resolution with the origin at zero.
pub fn grid(text: &str, resolution: f32) -> OccupancyGrid {
    OccupancyGrid::from_ascii(text, resolution, WorldPoint::ZERO).expect("fixture map")
}

/// Pose at the center of cell (x, y).
pub fn cell_pose(grid: &OccupancyGrid, x: i32, y: i32, theta: f32) -> Pose2D {
    Pose2D::from_point(grid.grid_to_world(GridCoord::new(x, y)), theta)
}

/// Small deterministic generator for fixture grids.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Uniform in [0, 100).
    pub fn percent(&mut self) -> u32 {
        self.next_u32() % 100
    }
}

/// Grid with scattered occupied, inflated and unknown cells.
pub fn random_grid(width: usize, height: usize, seed: u64) -> OccupancyGrid {
    let mut rng = Lcg::new(seed);
    let cells = (0..width * height)
        .map(|_| match rng.percent() {
            0..=14 => CellClass::Occupied,
            15..=19 => CellClass::InflatedOccupied,
            20..=29 => CellClass::Unknown,
            _ => CellClass::Free,
        })
        .collect();
    OccupancyGrid::new(width, height, 0.1, WorldPoint::ZERO, cells).expect("random grid")
}

/// Reference obstacle distances by repeated relaxation until nothing changes.
///
/// Walks coordinates directly rather than the grid's neighbor helpers.
pub fn brute_force_obstacle_distances(grid: &OccupancyGrid, config: &PlannerConfig) -> Vec<u32> {
    let n = grid.cell_count();
    let mut dist = vec![u32::MAX; n];
    for (i, d) in dist.iter_mut().enumerate() {
        if grid.is_obstacle_seed(i, config) {
            *d = 0;
        }
    }

    let offsets = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 1),
    ];

    loop {
        let mut changed = false;
        for i in 0..n {
            if !grid.is_passable(i, config) || dist[i] == 0 {
                continue;
            }
            let x = (i % grid.width()) as i32;
            let y = (i / grid.width()) as i32;
            for (dx, dy) in offsets {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= grid.width() as i32 || ny >= grid.height() as i32 {
                    continue;
                }
                let j = ny as usize * grid.width() + nx as usize;
                if dist[j] == u32::MAX {
                    continue;
                }
                let step = if dx != 0 && dy != 0 {
                    DIAGONAL_COST
                } else {
                    STRAIGHT_COST
                };
                if dist[j] + step < dist[i] {
                    dist[i] = dist[j] + step;
                    changed = true;
                }
            }
        }
        if !changed {
            return dist;
        }
    }
}
