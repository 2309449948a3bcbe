//! Invariants of the transforms, the descent and the frontier scan.

mod common;

use common::{brute_force_obstacle_distances, grid, random_grid};
use dhruva_explore::exploration::{FrontierConfig, FrontierDetector};
use dhruva_explore::planning::{
    ExplorationSeed, build_exploration_transform, build_obstacle_transform, build_reachability,
    cell_danger, extract_trajectory,
};
use dhruva_explore::{CellClass, ExploreError, OccupancyGrid, PlannerConfig, TransformField};

fn fixtures() -> Vec<OccupancyGrid> {
    let mut grids = vec![
        grid(
            "##########
             #........#
             #..##....#
             #..#..?..#
             #.....+..#
             ##########",
            0.1,
        ),
        grid(
            "+.........
             ..........
             ....#.....
             ..........
             .........#",
            0.1,
        ),
        grid(
            "..#..
             ..#..
             ..#..",
            0.1,
        ),
    ];
    grids.extend((0..6).map(|seed| random_grid(12, 9, seed)));
    grids
}

#[test]
fn obstacle_transform_matches_brute_force() {
    for config in [
        PlannerConfig::default(),
        PlannerConfig {
            use_inflated_obs: false,
            plan_in_unknown: true,
            ..Default::default()
        },
    ] {
        for (n, grid) in fixtures().iter().enumerate() {
            let field = build_obstacle_transform(grid, &config);
            let expected = brute_force_obstacle_distances(grid, &config);
            for i in 0..grid.cell_count() {
                if grid.is_obstacle_seed(i, &config) {
                    assert_eq!(field.cost(i), 0, "fixture {} seed {}", n, i);
                }
                assert_eq!(field.cost(i), expected[i], "fixture {} cell {}", n, i);
            }
        }
    }
}

#[test]
fn cutoff_keeps_danger_zone_exact() {
    // Cutoff of one cell at 1m resolution is raised to the danger threshold
    let config = PlannerConfig {
        obstacle_cutoff_dist: 1.0,
        min_obstacle_dist: 3,
        ..Default::default()
    };
    let threshold = config.min_obstacle_cost();
    for seed in 0..6 {
        let coarse = random_grid(12, 9, seed);
        let coarse = OccupancyGrid::new(
            coarse.width(),
            coarse.height(),
            1.0,
            coarse.origin(),
            coarse.cells().to_vec(),
        )
        .unwrap();
        let field = build_obstacle_transform(&coarse, &config);
        let expected = brute_force_obstacle_distances(&coarse, &config);
        for i in 0..coarse.cell_count() {
            if expected[i] <= threshold {
                assert_eq!(field.cost(i), expected[i], "seed {} cell {}", seed, i);
                assert_eq!(
                    cell_danger(&field, i, &config),
                    cell_danger_from(expected[i], &config),
                    "seed {} cell {}",
                    seed,
                    i
                );
            }
        }
    }
}

fn cell_danger_from(distance: u32, config: &PlannerConfig) -> u32 {
    let gap = config.min_obstacle_cost().saturating_sub(distance) as f32;
    (config.alpha * gap * gap).round() as u32
}

#[test]
fn transforms_are_idempotent() {
    let config = PlannerConfig::default();
    for grid in fixtures() {
        let a = build_obstacle_transform(&grid, &config);
        let b = build_obstacle_transform(&grid, &config);
        assert_eq!(a, b);

        let free: Vec<usize> = (0..grid.cell_count())
            .filter(|&i| grid.is_passable(i, &config))
            .collect();
        let (Some(&start), Some(&goal)) = (free.first(), free.last()) else {
            continue;
        };
        let seeds = [ExplorationSeed::at_zero(goal)];
        let first = build_exploration_transform(&grid, &a, &seeds, start, &config, true);
        let second = build_exploration_transform(&grid, &b, &seeds, start, &config, true);
        match (first, second) {
            (Ok(x), Ok(y)) => assert_eq!(x, y),
            (Err(ExploreError::NoPath(_)), Err(ExploreError::NoPath(_))) => {}
            (x, y) => panic!("runs disagree: {:?} vs {:?}", x.is_ok(), y.is_ok()),
        }
    }
}

#[test]
fn extracted_paths_descend_to_zero() {
    let config = PlannerConfig::default();
    let mut checked = 0;
    for grid in fixtures() {
        let obstacle = build_obstacle_transform(&grid, &config);
        let free: Vec<usize> = (0..grid.cell_count())
            .filter(|&i| grid.is_passable(i, &config))
            .collect();
        let Some(&goal) = free.last() else {
            continue;
        };
        let seeds = [ExplorationSeed::at_zero(goal)];

        for &start in free.iter().step_by(3) {
            let Ok(field) = build_exploration_transform(&grid, &obstacle, &seeds, start, &config, true)
            else {
                continue;
            };
            let cells = extract_trajectory(&grid, &field, start).expect("reached start descends");
            assert_eq!(cells.first(), Some(&start));
            for pair in cells.windows(2) {
                assert!(field.cost(pair[1]) <= field.cost(pair[0]));
                // Consecutive cells are 8-neighbors
                assert!(grid.adjacent(pair[0]).contains(&Some(pair[1])));
            }
            assert_eq!(field.cost(*cells.last().unwrap()), 0);
            checked += 1;
        }
    }
    assert!(checked > 20, "only {} paths checked", checked);
}

#[test]
fn frontier_classification_is_exact() {
    let config = PlannerConfig::default();
    let detector = FrontierDetector::new(FrontierConfig {
        min_frontier_size: 1,
        same_frontier_dist: 0.0,
    });

    for grid in fixtures() {
        let Some(start) = (0..grid.cell_count()).find(|&i| grid.class(i) == Some(CellClass::Free))
        else {
            continue;
        };
        let reach = build_reachability(&grid, start, &config);
        let scan = detector.detect(&grid, Some(&reach));

        for &cell in &scan.frontier_cells {
            assert_eq!(grid.class(cell), Some(CellClass::Free));
            assert!(grid.touches_unknown(cell));
            assert!(reach.is_reached(cell));
        }
        for &cell in &scan.non_frontier_cells {
            assert_eq!(grid.class(cell), Some(CellClass::Free));
            assert!(!grid.touches_unknown(cell));
        }

        // Every frontier cell lands in exactly one cluster
        let mut members: Vec<usize> = scan
            .frontiers
            .iter()
            .chain(&scan.rejected)
            .flat_map(|f| f.cells.iter().copied())
            .collect();
        members.sort_unstable();
        assert_eq!(members, scan.frontier_cells);
    }
}

#[test]
fn two_cell_frontier_is_filtered_by_min_size() {
    let grid = grid(
        "#######
         #?#####
         #.....#
         #.....#
         #######",
        0.1,
    );
    let scan = FrontierDetector::new(FrontierConfig {
        min_frontier_size: 3,
        same_frontier_dist: 0.0,
    })
    .detect(&grid, None);
    assert_eq!(scan.frontier_cells.len(), 2);
    assert!(scan.frontiers.is_empty());
    assert_eq!(scan.rejected.len(), 1);
    assert_eq!(scan.rejected[0].size(), 2);
}

#[test]
fn unreached_field_reports_sentinel() {
    let grid = grid("..#..", 0.1);
    let field = build_reachability(&grid, 0, &PlannerConfig::default());
    assert_eq!(field.cost(4), TransformField::UNREACHED);
    assert_eq!(field.get(99), None);
}
