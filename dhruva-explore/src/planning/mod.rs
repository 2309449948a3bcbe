//! Path planning module.
//!
//! This module provides:
//! - Obstacle transform: cost from the nearest obstacle cell
//! - Exploration transform: cost to the nearest goal, weighted by obstacle
//!   proximity and an optional heading penalty at the seeds
//! - Gradient-descent trajectory extraction over either field
//!
//! Both transforms run on the same propagation engine. A third, unweighted
//! field seeded at the robot cell answers reachability queries for frontier
//! detection. Building a field and walking it are separate steps joined by an
//! explicit [`TransformField`] handoff.

mod exploration_transform;
mod field;
mod obstacle_transform;
mod trajectory;
mod wavefront;

pub use exploration_transform::{
    ExplorationSeed, angle_danger, angle_difference, build_exploration_transform,
    distance_weight, goal_seeds,
};
pub use field::TransformField;
pub use obstacle_transform::{build_obstacle_transform, cell_danger};
pub use trajectory::{cells_to_poses, extract_trajectory};

use crate::config::PlannerConfig;
use crate::grid::OccupancyGrid;

/// Cost of an axis-aligned step.
pub const STRAIGHT_COST: u32 = 3;
/// Cost of a diagonal step (≈ STRAIGHT_COST × √2).
pub const DIAGONAL_COST: u32 = 4;

/// Plain step-cost field seeded at `start`, spreading through passable cells.
///
/// A cell is reachable from the robot iff its value is not the sentinel.
pub fn build_reachability(
    grid: &OccupancyGrid,
    start: usize,
    config: &PlannerConfig,
) -> TransformField {
    let mut field = TransformField::new(grid.width(), grid.height());
    let stats = wavefront::propagate(
        grid,
        &mut field,
        [(start, 0)],
        |n| grid.is_passable(n, config),
        |_| 0,
        None,
    );
    tracing::debug!(
        "Reachability from cell {}: {} cells reached",
        start,
        stats.finalized
    );
    field
}
