//! Exploration transform: goal-seeded wavefront with obstacle danger and an
//! optional heading penalty on the seeds.

use super::field::TransformField;
use super::obstacle_transform::cell_danger;
use super::wavefront;
use crate::config::PlannerConfig;
use crate::core::{Pose2D, WorldPoint};
use crate::error::{ExploreError, Result};
use crate::grid::OccupancyGrid;
use crate::utils::angle_between;

/// Goals closer than this (meters) get their heading penalty scaled up.
const NEAR_GOAL_DIST: f32 = 0.5;
const NEAR_GOAL_WEIGHT: f32 = 5.0;

/// A goal cell and the cost it starts the wave with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExplorationSeed {
    pub cell: usize,
    pub cost: u32,
}

impl ExplorationSeed {
    pub fn at_zero(cell: usize) -> Self {
        Self { cell, cost: 0 }
    }
}

/// Unsigned turn in [0, π] from the robot heading to the bearing of `goal`.
pub fn angle_difference(start: &Pose2D, goal: WorldPoint) -> f32 {
    let bearing = start.position().angle_to(&goal);
    angle_between(start.theta, bearing)
}

/// Heading penalty for a turn of `angle` radians: cubic in the angle, so
/// small corrections are nearly free and turning around is expensive.
pub fn angle_danger(angle: f32, config: &PlannerConfig) -> u32 {
    (config.goal_angle_penalty * angle.powi(3)).max(0.0) as u32
}

/// Multiplier for the heading penalty of goals right next to the robot.
pub fn distance_weight(a: WorldPoint, b: WorldPoint) -> f32 {
    if a.distance(&b) < NEAR_GOAL_DIST {
        NEAR_GOAL_WEIGHT
    } else {
        1.0
    }
}

/// Seed costs for a set of goal cells.
///
/// Without the angle penalty every goal starts at 0. With it, each goal pays
/// `angle_danger * distance_weight`, except a goal lying within
/// `same_frontier_dist` of `preferred` (the previous goal), which stays at 0
/// so the robot does not oscillate between frontiers.
pub fn goal_seeds(
    grid: &OccupancyGrid,
    start: &Pose2D,
    goals: &[usize],
    use_angle_penalty: bool,
    preferred: Option<WorldPoint>,
    config: &PlannerConfig,
) -> Vec<ExplorationSeed> {
    goals
        .iter()
        .filter_map(|&cell| {
            let position = grid.index_to_world(cell)?;
            if !use_angle_penalty {
                return Some(ExplorationSeed::at_zero(cell));
            }
            let keeps_previous = preferred
                .is_some_and(|p| p.distance(&position) < config.same_frontier_dist);
            if keeps_previous {
                return Some(ExplorationSeed::at_zero(cell));
            }
            let danger = angle_danger(angle_difference(start, position), config) as f32;
            let weight = distance_weight(start.position(), position);
            Some(ExplorationSeed {
                cell,
                cost: (danger * weight) as u32,
            })
        })
        .collect()
}

/// Build the exploration transform and check it reaches `start`.
///
/// Seeds on impassable cells are dropped. The start cell is always enterable
/// so a robot standing in an inflated margin can still be reached. With
/// `use_danger` the obstacle-proximity surcharge is added on every step.
///
/// Returns `NoPath` when no seed survives or the wave never reaches `start`.
pub fn build_exploration_transform(
    grid: &OccupancyGrid,
    obstacle: &TransformField,
    seeds: &[ExplorationSeed],
    start: usize,
    config: &PlannerConfig,
    use_danger: bool,
) -> Result<TransformField> {
    if !grid.is_valid(start) {
        return Err(ExploreError::InvalidInput(format!(
            "start cell {} is outside the grid",
            start
        )));
    }

    let usable: Vec<(usize, u32)> = seeds
        .iter()
        .filter(|s| s.cell == start || grid.is_passable(s.cell, config))
        .map(|s| (s.cell, s.cost))
        .collect();
    if usable.is_empty() {
        return Err(ExploreError::NoPath(format!(
            "none of {} goal cells is traversable",
            seeds.len()
        )));
    }

    let mut field = TransformField::new(grid.width(), grid.height());
    let stats = wavefront::propagate(
        grid,
        &mut field,
        usable,
        |n| n == start || grid.is_passable(n, config),
        |n| {
            if use_danger {
                cell_danger(obstacle, n, config)
            } else {
                0
            }
        },
        None,
    );

    tracing::debug!(
        "Exploration transform: {} seeds, {} cells finalized, start cost {}",
        stats.seeded,
        stats.finalized,
        field.cost(start)
    );

    if !field.is_reached(start) {
        return Err(ExploreError::NoPath(format!(
            "exploration transform never reached start cell {}",
            start
        )));
    }
    Ok(field)
}
