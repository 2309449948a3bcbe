//! Obstacle-distance transform and the danger term derived from it.

use super::field::TransformField;
use super::wavefront;
use crate::config::PlannerConfig;
use crate::grid::OccupancyGrid;

/// Build the obstacle transform for `grid`.
///
/// Every occupied cell (plus inflated-occupied cells when `use_inflated_obs`
/// is set) is a seed at cost 0. The wave spreads only through passable cells,
/// so the value of a free cell is the cheapest STRAIGHT/DIAGONAL walk to the
/// nearest obstacle. With `obstacle_cutoff_dist` set, cells past the cutoff
/// keep the sentinel, meaning "far from any obstacle". The cutoff never falls
/// inside `min_obstacle_dist`, so the danger term is unaffected by it.
pub fn build_obstacle_transform(grid: &OccupancyGrid, config: &PlannerConfig) -> TransformField {
    let mut field = TransformField::new(grid.width(), grid.height());
    let seeds = (0..grid.cell_count())
        .filter(|&i| grid.is_obstacle_seed(i, config))
        .map(|i| (i, 0));

    let stats = wavefront::propagate(
        grid,
        &mut field,
        seeds,
        |n| grid.is_passable(n, config),
        |_| 0,
        config.obstacle_cutoff_cost(grid.resolution()),
    );

    tracing::debug!(
        "Obstacle transform: {} seeds, {} cells finalized",
        stats.seeded,
        stats.finalized
    );
    field
}

/// Penalty for entering `index`, growing quadratically as the cell gets
/// closer than `min_obstacle_dist` to an obstacle.
///
/// Cells the obstacle wave never reached carry no penalty.
pub fn cell_danger(obstacle: &TransformField, index: usize, config: &PlannerConfig) -> u32 {
    let distance = obstacle.cost(index);
    let threshold = config.min_obstacle_cost();
    if distance > threshold {
        return 0;
    }
    let gap = (threshold - distance) as f32;
    (config.alpha * gap * gap).round() as u32
}
