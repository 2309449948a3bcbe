//! Discrete steepest descent over a finished transform field.

use crate::core::Pose2D;
use crate::error::{ExploreError, Result};
use crate::grid::OccupancyGrid;
use crate::planning::TransformField;

/// Walk downhill from `start` until a goal is reached.
///
/// The walk stays on cells owned by the same seed as `start`, which is the
/// lowest-indexed of the cheapest goals. Each step moves to the strictly
/// lowest such 8-neighbor; on ties the first in left, up, right, down, then
/// diagonal order wins, so straight moves beat diagonal ones at equal cost.
/// The walk ends at a cell of value 0 or at the owning seed cell.
///
/// Returns the visited cells, `start` first. A cell with no strictly lower
/// neighbor that is not a goal yields `NoPath`.
pub fn extract_trajectory(
    grid: &OccupancyGrid,
    field: &TransformField,
    start: usize,
) -> Result<Vec<usize>> {
    let mut current = start;
    let mut cost = field.get(start).ok_or_else(|| {
        ExploreError::InvalidInput(format!("start cell {} is outside the field", start))
    })?;
    if cost == TransformField::UNREACHED {
        return Err(ExploreError::NoPath(format!(
            "start cell {} was never reached by the transform",
            start
        )));
    }

    let goal = field.owner(start);
    let mut cells = vec![start];
    while cost != 0 && Some(current) != goal {
        let mut best: Option<(u32, usize)> = None;
        for neighbor in grid.adjacent(current).into_iter().flatten() {
            if field.owner(neighbor) != goal {
                continue;
            }
            let value = field.cost(neighbor);
            if value < best.map_or(cost, |(c, _)| c) {
                best = Some((value, neighbor));
            }
        }

        match best {
            Some((value, next)) => {
                cells.push(next);
                current = next;
                cost = value;
            }
            None => {
                tracing::warn!(
                    "Gradient descent stuck at cell {} (cost {}) after {} steps",
                    current,
                    cost,
                    cells.len() - 1
                );
                return Err(ExploreError::NoPath(format!(
                    "local minimum at cell {} with cost {}",
                    current, cost
                )));
            }
        }
    }

    Ok(cells)
}

/// Turn a cell sequence into poses.
///
/// The first pose is `start` as given and the last is `goal` as given. Every
/// pose in between sits at its cell center and faces the next cell.
pub fn cells_to_poses(
    grid: &OccupancyGrid,
    cells: &[usize],
    start: Pose2D,
    goal: Pose2D,
) -> Vec<Pose2D> {
    let mut poses = Vec::with_capacity(cells.len().max(2));
    poses.push(start);

    let centers: Vec<_> = cells
        .iter()
        .filter_map(|&c| grid.index_to_world(c))
        .collect();
    for pair in centers.windows(2).skip(1) {
        let heading = pair[0].angle_to(&pair[1]);
        poses.push(Pose2D::from_point(pair[0], heading));
    }

    poses.push(goal);
    poses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::core::{GridCoord, WorldPoint};
    use crate::grid::CellClass;
    use crate::planning::{
        ExplorationSeed, build_exploration_transform, build_obstacle_transform,
    };
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    fn field_to(grid: &OccupancyGrid, goal: GridCoord, start: GridCoord) -> TransformField {
        let config = PlannerConfig::default();
        let obstacle = build_obstacle_transform(grid, &config);
        build_exploration_transform(
            grid,
            &obstacle,
            &[ExplorationSeed::at_zero(grid.index_of(goal).unwrap())],
            grid.index_of(start).unwrap(),
            &config,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_descent_prefers_cheaper_diagonal() {
        let grid = OccupancyGrid::filled(8, 8, 0.1, WorldPoint::ZERO, CellClass::Free).unwrap();
        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(5, 3);
        let field = field_to(&grid, goal, start);
        let cells = extract_trajectory(&grid, &field, grid.index_of(start).unwrap()).unwrap();

        let coords: Vec<_> = cells.iter().map(|&c| grid.coord_of(c).unwrap()).collect();
        assert_eq!(coords.first(), Some(&start));
        assert_eq!(coords.last(), Some(&goal));
        // Octile path: 3 diagonal + 2 straight steps
        assert_eq!(cells.len(), 6);
        assert_eq!(coords[1], GridCoord::new(1, 1));
        assert_eq!(field.cost(*cells.last().unwrap()), 0);
    }

    #[test]
    fn test_descent_is_monotone() {
        let grid = OccupancyGrid::from_ascii(
            "..........
             ..######..
             ..#.......
             ..#.####..
             ..........",
            0.1,
            WorldPoint::ZERO,
        )
        .unwrap();
        let start = GridCoord::new(3, 2);
        let field = field_to(&grid, GridCoord::new(9, 4), start);
        let cells = extract_trajectory(&grid, &field, grid.index_of(start).unwrap()).unwrap();
        for pair in cells.windows(2) {
            assert!(field.cost(pair[1]) < field.cost(pair[0]));
        }
        assert_eq!(field.cost(*cells.last().unwrap()), 0);
    }

    #[test]
    fn test_start_on_goal_is_single_cell() {
        let grid = OccupancyGrid::filled(3, 3, 0.1, WorldPoint::ZERO, CellClass::Free).unwrap();
        let c = GridCoord::new(1, 1);
        let field = field_to(&grid, c, c);
        let cells = extract_trajectory(&grid, &field, grid.index_of(c).unwrap()).unwrap();
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn test_unreached_start_is_no_path() {
        let grid = OccupancyGrid::filled(3, 3, 0.1, WorldPoint::ZERO, CellClass::Free).unwrap();
        let field = TransformField::new(3, 3);
        let err = extract_trajectory(&grid, &field, 0).unwrap_err();
        assert!(matches!(err, ExploreError::NoPath(_)));
        assert!(matches!(
            extract_trajectory(&grid, &field, 42).unwrap_err(),
            ExploreError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_poses_face_direction_of_travel() {
        let grid = OccupancyGrid::filled(5, 5, 1.0, WorldPoint::ZERO, CellClass::Free).unwrap();
        let cells: Vec<usize> = [(0, 0), (1, 1), (2, 2), (3, 2)]
            .iter()
            .map(|&(x, y)| grid.index_of(GridCoord::new(x, y)).unwrap())
            .collect();
        let start = Pose2D::new(0.5, 0.5, 1.0);
        let goal = Pose2D::new(3.5, 2.5, -1.0);
        let poses = cells_to_poses(&grid, &cells, start, goal);

        assert_eq!(poses.len(), 4);
        assert_eq!(poses[0], start);
        assert_eq!(poses[3], goal);
        assert_relative_eq!(poses[1].x, 1.5);
        assert_relative_eq!(poses[1].theta, FRAC_PI_4, epsilon = 1e-6);
        assert_relative_eq!(poses[2].theta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_cost_goals_resolve_to_lowest_index() {
        let grid = OccupancyGrid::filled(5, 9, 0.1, WorldPoint::ZERO, CellClass::Free).unwrap();
        let config = PlannerConfig::default();
        let obstacle = build_obstacle_transform(&grid, &config);
        let low = grid.index_of(GridCoord::new(2, 0)).unwrap();
        let high = grid.index_of(GridCoord::new(2, 8)).unwrap();
        let start = grid.index_of(GridCoord::new(2, 4)).unwrap();

        // Seeding order must not matter
        for seeds in [[high, low], [low, high]] {
            let seeds = seeds.map(ExplorationSeed::at_zero);
            let field =
                build_exploration_transform(&grid, &obstacle, &seeds, start, &config, true)
                    .unwrap();
            assert_eq!(field.owner(start), Some(low));

            let cells = extract_trajectory(&grid, &field, start).unwrap();
            assert_eq!(cells.last(), Some(&low));
            assert_eq!(cells.len(), 5);
        }
    }
}
