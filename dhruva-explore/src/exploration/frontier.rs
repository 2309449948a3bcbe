//! Frontier detection for autonomous exploration.
//!
//! Identifies boundaries between known-free and unknown space, clusters them
//! into frontier regions, and emits one goal pose per region that faces the
//! unknown side.

use std::collections::VecDeque;

use crate::config::PlannerConfig;
use crate::core::{GridCoord, Pose2D, WorldPoint};
use crate::grid::{CellClass, OccupancyGrid};
use crate::planning::TransformField;

/// Configuration for frontier detection.
#[derive(Clone, Debug)]
pub struct FrontierConfig {
    /// Minimum number of cells for a valid frontier cluster
    pub min_frontier_size: usize,
    /// Clusters whose representatives are closer than this (meters) are merged
    pub same_frontier_dist: f32,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self::from(&PlannerConfig::default())
    }
}

impl From<&PlannerConfig> for FrontierConfig {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            min_frontier_size: config.min_frontier_size,
            same_frontier_dist: config.same_frontier_dist,
        }
    }
}

/// A frontier region (cluster of frontier cells).
#[derive(Clone, Debug, PartialEq)]
pub struct Frontier {
    /// Representative cell (linear index), the cluster cell nearest the centroid
    pub cell: usize,
    /// Representative cell in grid coordinates
    pub coord: GridCoord,
    /// Goal pose at the representative, facing the unknown
    pub pose: Pose2D,
    /// Member cells, ascending
    pub cells: Vec<usize>,
}

impl Frontier {
    /// Number of member cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn position(&self) -> WorldPoint {
        self.pose.position()
    }
}

/// Result of one frontier scan.
///
/// Every list is plain data for callers that want to draw or store it.
#[derive(Clone, Debug, Default)]
pub struct FrontierScan {
    /// Clusters that passed the size filter
    pub frontiers: Vec<Frontier>,
    /// Clusters dropped for being smaller than `min_frontier_size`
    pub rejected: Vec<Frontier>,
    /// All frontier cells, ascending
    pub frontier_cells: Vec<usize>,
    /// Reachable free cells with no unknown neighbor, ascending
    pub non_frontier_cells: Vec<usize>,
}

impl FrontierScan {
    pub fn is_empty(&self) -> bool {
        self.frontiers.is_empty()
    }
}

/// Frontier detector for exploration.
pub struct FrontierDetector {
    config: FrontierConfig,
}

impl FrontierDetector {
    /// Create a new frontier detector with configuration.
    pub fn new(config: FrontierConfig) -> Self {
        Self { config }
    }

    /// Scan the grid for frontiers.
    ///
    /// With `reach` supplied, only cells that field reached are considered;
    /// without it every free cell is.
    pub fn detect(&self, grid: &OccupancyGrid, reach: Option<&TransformField>) -> FrontierScan {
        // Step 1: Classify reachable free cells
        let mut scan = FrontierScan::default();
        for index in 0..grid.cell_count() {
            if grid.class(index) != Some(CellClass::Free) {
                continue;
            }
            if reach.is_some_and(|field| !field.is_reached(index)) {
                continue;
            }
            if grid.touches_unknown(index) {
                scan.frontier_cells.push(index);
            } else {
                scan.non_frontier_cells.push(index);
            }
        }

        if scan.frontier_cells.is_empty() {
            return scan;
        }

        // Step 2: Cluster by adjacency, then merge near-duplicates
        let clusters = self.cluster_frontiers(grid, &scan.frontier_cells);
        let clusters = self.merge_close_clusters(grid, clusters);

        // Step 3: Size filter
        for cells in clusters {
            let frontier = create_frontier(grid, cells);
            if frontier.size() >= self.config.min_frontier_size {
                scan.frontiers.push(frontier);
            } else {
                scan.rejected.push(frontier);
            }
        }

        tracing::debug!(
            "Frontier scan: {} cells, {} frontiers kept, {} too small",
            scan.frontier_cells.len(),
            scan.frontiers.len(),
            scan.rejected.len()
        );
        scan
    }

    /// Cluster frontier cells using 8-connected flood-fill.
    fn cluster_frontiers(
        &self,
        grid: &OccupancyGrid,
        frontier_cells: &[usize],
    ) -> Vec<Vec<usize>> {
        let mut is_frontier = vec![false; grid.cell_count()];
        for &cell in frontier_cells {
            is_frontier[cell] = true;
        }
        let mut visited = vec![false; grid.cell_count()];
        let mut clusters = Vec::new();

        for &start_cell in frontier_cells {
            if visited[start_cell] {
                continue;
            }

            let mut cluster = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(start_cell);
            visited[start_cell] = true;

            while let Some(current) = queue.pop_front() {
                cluster.push(current);
                for neighbor in grid.adjacent(current).into_iter().flatten() {
                    if is_frontier[neighbor] && !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }

            cluster.sort_unstable();
            clusters.push(cluster);
        }

        clusters
    }

    /// Merge clusters whose representatives are the same frontier.
    fn merge_close_clusters(
        &self,
        grid: &OccupancyGrid,
        clusters: Vec<Vec<usize>>,
    ) -> Vec<Vec<usize>> {
        let mut merged: Vec<(WorldPoint, Vec<usize>)> = Vec::with_capacity(clusters.len());

        for cells in clusters {
            let position = representative_position(grid, &cells);
            let existing = merged.iter_mut().find(|(other, _)| {
                is_same_frontier(position, *other, self.config.same_frontier_dist)
            });
            match existing {
                Some((other, group)) => {
                    group.extend(cells);
                    group.sort_unstable();
                    *other = representative_position(grid, &group[..]);
                }
                None => merged.push((position, cells)),
            }
        }

        merged.into_iter().map(|(_, cells)| cells).collect()
    }
}

/// Build a frontier from its member cells (ascending, non-empty).
fn create_frontier(grid: &OccupancyGrid, cells: Vec<usize>) -> Frontier {
    let cell = representative(grid, &cells);
    let coord = grid.coord_of(cell).unwrap_or_default();
    let position = grid.grid_to_world(coord);
    let yaw = yaw_to_unknown(grid, cell).unwrap_or(0.0);

    Frontier {
        cell,
        coord,
        pose: Pose2D::from_point(position, yaw),
        cells,
    }
}

/// Member cell nearest the cluster centroid; the lowest index wins ties.
fn representative(grid: &OccupancyGrid, cells: &[usize]) -> usize {
    let coords: Vec<(usize, GridCoord)> = cells
        .iter()
        .filter_map(|&c| grid.coord_of(c).map(|coord| (c, coord)))
        .collect();
    let n = coords.len().max(1) as f32;
    let cx = coords.iter().map(|(_, c)| c.x as f32).sum::<f32>() / n;
    let cy = coords.iter().map(|(_, c)| c.y as f32).sum::<f32>() / n;

    let mut best = cells.first().copied().unwrap_or_default();
    let mut best_dist = f32::MAX;
    for (cell, coord) in coords {
        let dx = coord.x as f32 - cx;
        let dy = coord.y as f32 - cy;
        let dist = dx * dx + dy * dy;
        if dist < best_dist {
            best_dist = dist;
            best = cell;
        }
    }
    best
}

fn representative_position(grid: &OccupancyGrid, cells: &[usize]) -> WorldPoint {
    grid.index_to_world(representative(grid, cells))
        .unwrap_or(WorldPoint::ZERO)
}

/// Heading from `index` toward its nearest unknown neighbor.
///
/// Straight neighbors are nearer than diagonal ones, so they are checked
/// first. `None` when no neighbor is unknown.
pub fn yaw_to_unknown(grid: &OccupancyGrid, index: usize) -> Option<f32> {
    let here = grid.coord_of(index)?;
    let unknown = grid
        .adjacent(index)
        .into_iter()
        .flatten()
        .find(|&n| grid.class(n) == Some(CellClass::Unknown))?;
    let there = grid.coord_of(unknown)?;
    Some(((there.y - here.y) as f32).atan2((there.x - here.x) as f32))
}

/// Whether the robot at `robot` has reached the frontier at `frontier`.
#[inline]
pub fn is_frontier_reached(
    robot: WorldPoint,
    frontier: WorldPoint,
    config: &PlannerConfig,
) -> bool {
    robot.distance(&frontier) < config.dist_for_goal_reached
}

/// Whether two frontier positions denote the same frontier.
#[inline]
pub fn is_same_frontier(a: WorldPoint, b: WorldPoint, same_frontier_dist: f32) -> bool {
    a.distance(&b) < same_frontier_dist
}
