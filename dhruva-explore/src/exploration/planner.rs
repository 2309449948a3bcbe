//! Exploration planner state machine.
//!
//! Sequences the obstacle transform, frontier scan, exploration transform and
//! gradient descent for one planning request, and owns the fallback policy:
//! a goal-directed plan that finds no path gets exactly one relaxed retry.
//!
//! Every field is rebuilt from scratch on each call. The last set is kept in
//! [`PlanningArtifacts`] for inspection until the next call clears it.

use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::core::{Pose2D, WorldPoint};
use crate::error::{ExploreError, Result};
use crate::grid::OccupancyGrid;
use crate::planning::{
    ExplorationSeed, TransformField, build_exploration_transform, build_obstacle_transform,
    build_reachability, cells_to_poses, extract_trajectory, goal_seeds,
};

use super::frontier::{Frontier, FrontierConfig, FrontierDetector, FrontierScan, is_frontier_reached};

/// Stage of the current planning call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlannerState {
    /// No call in progress
    Idle,
    /// Computing distance from obstacles
    BuildingObstacleTransform,
    /// Computing cost-to-goal from the goal set
    BuildingExplorationTransform,
    /// Walking the exploration transform from the start cell
    ExtractingTrajectory,
    /// Last call produced a plan
    Succeeded,
    /// Last call ended without a plan
    Failed,
}

/// Where a plan came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanSource {
    /// Regular transform pipeline
    Transform,
    /// Relaxed retry after the regular pipeline found no path
    Recovery,
    /// Returned by the external [`TrajectoryRefiner`]
    Refiner,
}

/// Ordered poses from start to goal.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    /// First is the start pose, last the goal or frontier pose
    pub poses: Vec<Pose2D>,
    /// Grid cells visited, start first
    pub cells: Vec<usize>,
    /// Exploration transform value at the start cell; `None` for refined plans
    pub cost: Option<u32>,
    pub source: PlanSource,
}

impl Plan {
    /// Final pose of the plan.
    pub fn goal(&self) -> Option<&Pose2D> {
        self.poses.last()
    }

    /// Summed straight-line length between consecutive poses, in meters.
    pub fn length(&self) -> f32 {
        self.poses.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    /// Wrap poses from a refiner. Unusable when shorter than two poses or
    /// when any pose falls off the grid.
    fn from_refined(grid: &OccupancyGrid, poses: Vec<Pose2D>) -> Option<Self> {
        if poses.len() < 2 {
            return None;
        }
        let mut cells: Vec<usize> = Vec::with_capacity(poses.len());
        for pose in &poses {
            let cell = grid.world_to_index(pose.position())?;
            if cells.last() != Some(&cell) {
                cells.push(cell);
            }
        }
        Some(Self {
            poses,
            cells,
            cost: None,
            source: PlanSource::Refiner,
        })
    }
}

/// External trajectory service consulted on recovery.
///
/// Given a start/goal pair it may return its own trajectory. Returning `None`
/// (or fewer than two poses) makes the planner fall back to its relaxed retry.
pub trait TrajectoryRefiner {
    fn refine(&self, start: &Pose2D, goal: &Pose2D) -> Option<Vec<Pose2D>>;
}

/// Fields and frontiers from the last call, as plain data.
#[derive(Clone, Debug, Default)]
pub struct PlanningArtifacts {
    pub obstacle: Option<TransformField>,
    pub exploration: Option<TransformField>,
    /// Unweighted field from the robot cell used for frontier reachability
    pub reachability: Option<TransformField>,
    pub frontiers: Option<FrontierScan>,
}

/// Call counters since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlannerStats {
    pub plan_requests: usize,
    pub exploration_requests: usize,
    /// Times the relaxed retry ran
    pub recoveries: usize,
    /// Recoveries answered by the refiner
    pub refined_plans: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Exploration-transform planner.
pub struct ExplorationPlanner {
    config: PlannerConfig,
    /// Current state
    state: PlannerState,
    /// Frontier detector
    detector: FrontierDetector,
    /// Frontier chosen by the last successful exploration
    previous_goal: Option<WorldPoint>,
    artifacts: PlanningArtifacts,
    stats: PlannerStats,
    refiner: Option<Box<dyn TrajectoryRefiner>>,
}

impl ExplorationPlanner {
    /// Create a new planner with configuration.
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            detector: FrontierDetector::new(FrontierConfig::from(&config)),
            config,
            state: PlannerState::Idle,
            previous_goal: None,
            artifacts: PlanningArtifacts::default(),
            stats: PlannerStats::default(),
            refiner: None,
        }
    }

    /// Create a new planner with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PlannerConfig::default())
    }

    /// Attach a trajectory service for the recovery path.
    pub fn with_refiner(mut self, refiner: Box<dyn TrajectoryRefiner>) -> Self {
        self.refiner = Some(refiner);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn previous_goal(&self) -> Option<WorldPoint> {
        self.previous_goal
    }

    pub fn artifacts(&self) -> &PlanningArtifacts {
        &self.artifacts
    }

    pub fn stats(&self) -> PlannerStats {
        self.stats
    }

    /// Drop every field and frontier list from the last call.
    pub fn reset_maps(&mut self) {
        self.artifacts = PlanningArtifacts::default();
        self.state = PlannerState::Idle;
    }

    /// Forget frontier bookkeeping only.
    pub fn clear_frontiers(&mut self) {
        self.previous_goal = None;
        self.artifacts.frontiers = None;
    }

    /// Plan from `start` to a fixed `goal`.
    ///
    /// Runs the obstacle and exploration transforms with the goal as the only
    /// seed, no heading penalty. On `NoPath` the relaxed retry of
    /// [`Self::recovery_make_plan`] runs once before giving up.
    pub fn make_plan(&mut self, grid: &OccupancyGrid, start: Pose2D, goal: Pose2D) -> Result<Plan> {
        self.reset_maps();
        self.stats.plan_requests += 1;

        let config = self.config.clone();
        let result = match self.plan_to_goal(grid, start, goal, &config, true, PlanSource::Transform)
        {
            Err(ExploreError::NoPath(reason)) => {
                warn!(
                    "No path to ({:.2}, {:.2}): {}; trying recovery",
                    goal.x, goal.y, reason
                );
                self.recover(grid, start, goal)
            }
            other => other,
        };
        self.finish(result)
    }

    /// Relaxed retry for a goal-directed plan.
    ///
    /// Asks the refiner first, if one is attached. Otherwise (or when it has
    /// nothing usable) replans treating inflated cells as free and without
    /// the obstacle danger term.
    pub fn recovery_make_plan(
        &mut self,
        grid: &OccupancyGrid,
        start: Pose2D,
        goal: Pose2D,
    ) -> Result<Plan> {
        self.reset_maps();
        self.stats.plan_requests += 1;
        let result = self.recover(grid, start, goal);
        self.finish(result)
    }

    /// Plan toward the best frontier.
    ///
    /// Fails with `NoFrontiers` when nothing is left to explore, which callers
    /// can read as "exploration complete".
    pub fn do_exploration(&mut self, grid: &OccupancyGrid, start: Pose2D) -> Result<Plan> {
        self.reset_maps();
        self.stats.exploration_requests += 1;
        let result = self.explore(grid, start, None);
        self.finish(result)
    }

    /// Like [`Self::do_exploration`], but keeps heading for the frontier
    /// `old_plan` was going to while it is still a viable frontier.
    pub fn do_alternative_exploration(
        &mut self,
        grid: &OccupancyGrid,
        start: Pose2D,
        old_plan: &Plan,
    ) -> Result<Plan> {
        self.reset_maps();
        self.stats.exploration_requests += 1;
        let preferred = old_plan.goal().map(|p| p.position());
        let result = self.explore(grid, start, preferred);
        self.finish(result)
    }

    /// Plan back into already-explored space when no frontier is left.
    ///
    /// The goal is picked from `history` by [`Self::find_inner_frontier`].
    pub fn do_inner_exploration(
        &mut self,
        grid: &OccupancyGrid,
        start: Pose2D,
        history: &[Pose2D],
    ) -> Result<Plan> {
        self.reset_maps();
        self.stats.exploration_requests += 1;
        let config = self.config.clone();
        let result = self.inner_goal(grid, start, history).and_then(|goal| {
            self.plan_to_goal(grid, start, goal, &config, true, PlanSource::Transform)
        });
        self.finish(result)
    }

    /// Pick a revisit goal from the driven trajectory.
    ///
    /// Candidates must be passable, reachable from `start` and farther than
    /// `dist_for_goal_reached`. Poses clear of the danger zone are preferred,
    /// then the one farthest from the robot.
    pub fn find_inner_frontier(
        &mut self,
        grid: &OccupancyGrid,
        start: Pose2D,
        history: &[Pose2D],
    ) -> Result<Pose2D> {
        self.reset_maps();
        self.inner_goal(grid, start, history)
    }

    /// Frontiers reachable from `start`, with the companion cell lists.
    ///
    /// Reached frontiers are not filtered here; the scan is also stored in
    /// [`PlanningArtifacts::frontiers`].
    pub fn find_frontiers(&mut self, grid: &OccupancyGrid, start: Pose2D) -> Result<FrontierScan> {
        self.reset_maps();
        validate_grid(grid)?;
        let start_cell = cell_for(grid, &start, "start")?;
        let config = self.config.clone();
        let scan = self.scan_frontiers(grid, start_cell, &config);
        self.artifacts.frontiers = Some(scan.clone());
        Ok(scan)
    }

    fn transition(&mut self, next: PlannerState) {
        debug!("Planner state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn finish(&mut self, result: Result<Plan>) -> Result<Plan> {
        match &result {
            Ok(plan) => {
                self.transition(PlannerState::Succeeded);
                self.stats.succeeded += 1;
                info!(
                    "Plan ready: {} poses, {:.2}m, source {:?}",
                    plan.poses.len(),
                    plan.length(),
                    plan.source
                );
            }
            Err(e) => {
                self.transition(PlannerState::Failed);
                self.stats.failed += 1;
                warn!("Planning failed [{}]: {}", e.code(), e);
            }
        }
        result
    }

    fn recover(&mut self, grid: &OccupancyGrid, start: Pose2D, goal: Pose2D) -> Result<Plan> {
        self.stats.recoveries += 1;

        let refined = self.refiner.as_ref().and_then(|r| r.refine(&start, &goal));
        if let Some(poses) = refined {
            match Plan::from_refined(grid, poses) {
                Some(plan) => {
                    info!("Recovery: using refined trajectory ({} poses)", plan.poses.len());
                    self.stats.refined_plans += 1;
                    return Ok(plan);
                }
                None => warn!("Recovery: refined trajectory unusable, replanning"),
            }
        }

        let relaxed = PlannerConfig {
            use_inflated_obs: false,
            ..self.config.clone()
        };
        self.plan_to_goal(grid, start, goal, &relaxed, false, PlanSource::Recovery)
    }

    fn plan_to_goal(
        &mut self,
        grid: &OccupancyGrid,
        start: Pose2D,
        goal: Pose2D,
        config: &PlannerConfig,
        use_danger: bool,
        source: PlanSource,
    ) -> Result<Plan> {
        validate_grid(grid)?;
        let start_cell = cell_for(grid, &start, "start")?;
        let goal_cell = cell_for(grid, &goal, "goal")?;

        self.transition(PlannerState::BuildingObstacleTransform);
        let obstacle = build_obstacle_transform(grid, config);

        self.transition(PlannerState::BuildingExplorationTransform);
        let seeds = [ExplorationSeed::at_zero(goal_cell)];
        let exploration =
            build_exploration_transform(grid, &obstacle, &seeds, start_cell, config, use_danger);
        self.artifacts.obstacle = Some(obstacle);

        let (cells, cost) = self.descend(grid, exploration?, start_cell)?;
        Ok(Plan {
            poses: cells_to_poses(grid, &cells, start, goal),
            cells,
            cost: Some(cost),
            source,
        })
    }

    fn explore(
        &mut self,
        grid: &OccupancyGrid,
        start: Pose2D,
        preferred: Option<WorldPoint>,
    ) -> Result<Plan> {
        validate_grid(grid)?;
        let start_cell = cell_for(grid, &start, "start")?;
        let config = self.config.clone();

        self.transition(PlannerState::BuildingObstacleTransform);
        let obstacle = build_obstacle_transform(grid, &config);

        let scan = self.scan_frontiers(grid, start_cell, &config);
        let robot = start.position();
        let goals: Vec<Frontier> = scan
            .frontiers
            .iter()
            .filter(|f| !is_frontier_reached(robot, f.position(), &config))
            .cloned()
            .collect();
        self.artifacts.frontiers = Some(scan);

        if goals.is_empty() {
            self.artifacts.obstacle = Some(obstacle);
            return Err(ExploreError::NoFrontiers);
        }

        self.transition(PlannerState::BuildingExplorationTransform);
        let goal_cells: Vec<usize> = goals.iter().map(|f| f.cell).collect();
        let anchor = preferred.or(self.previous_goal);
        let seeds = goal_seeds(grid, &start, &goal_cells, true, anchor, &config);
        let exploration =
            build_exploration_transform(grid, &obstacle, &seeds, start_cell, &config, true);
        self.artifacts.obstacle = Some(obstacle);

        let (cells, cost) = self.descend(grid, exploration?, start_cell)?;
        let end = cells.last().copied().unwrap_or(start_cell);
        let frontier = goals.iter().find(|f| f.cell == end).ok_or_else(|| {
            ExploreError::NoPath(format!("descent ended at cell {} off every frontier", end))
        })?;

        debug!(
            "Selected frontier at ({:.2}, {:.2}), size {}",
            frontier.pose.x,
            frontier.pose.y,
            frontier.size()
        );
        self.previous_goal = Some(frontier.position());

        Ok(Plan {
            poses: cells_to_poses(grid, &cells, start, frontier.pose),
            cells,
            cost: Some(cost),
            source: PlanSource::Transform,
        })
    }

    fn inner_goal(
        &mut self,
        grid: &OccupancyGrid,
        start: Pose2D,
        history: &[Pose2D],
    ) -> Result<Pose2D> {
        validate_grid(grid)?;
        let start_cell = cell_for(grid, &start, "start")?;
        let config = self.config.clone();

        self.transition(PlannerState::BuildingObstacleTransform);
        let obstacle = build_obstacle_transform(grid, &config);
        let reach = build_reachability(grid, start_cell, &config);
        let threshold = config.min_obstacle_cost();

        let best = history
            .iter()
            .filter_map(|pose| {
                let cell = grid.world_to_index(pose.position())?;
                if !reach.is_reached(cell) || !grid.is_passable(cell, &config) {
                    return None;
                }
                let center = grid.index_to_world(cell)?;
                let distance = center.distance(&start.position());
                if distance <= config.dist_for_goal_reached {
                    return None;
                }
                let clear = obstacle.cost(cell) > threshold;
                Some((clear, distance, Pose2D::from_point(center, pose.theta)))
            })
            .max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

        self.artifacts.obstacle = Some(obstacle);
        self.artifacts.reachability = Some(reach);

        match best {
            Some((_, distance, goal)) => {
                debug!(
                    "Inner frontier at ({:.2}, {:.2}), {:.2}m away",
                    goal.x, goal.y, distance
                );
                Ok(goal)
            }
            None => Err(ExploreError::NoFrontiers),
        }
    }

    fn scan_frontiers(
        &mut self,
        grid: &OccupancyGrid,
        start_cell: usize,
        config: &PlannerConfig,
    ) -> FrontierScan {
        let reach = build_reachability(grid, start_cell, config);
        let scan = self.detector.detect(grid, Some(&reach));
        self.artifacts.reachability = Some(reach);
        scan
    }

    fn descend(
        &mut self,
        grid: &OccupancyGrid,
        exploration: TransformField,
        start_cell: usize,
    ) -> Result<(Vec<usize>, u32)> {
        self.transition(PlannerState::ExtractingTrajectory);
        let cells = extract_trajectory(grid, &exploration, start_cell);
        let cost = exploration.cost(start_cell);
        self.artifacts.exploration = Some(exploration);
        Ok((cells?, cost))
    }
}

fn validate_grid(grid: &OccupancyGrid) -> Result<()> {
    if grid.cells().iter().all(|c| c.is_obstacle()) {
        return Err(ExploreError::DegenerateGrid(format!(
            "all {} cells are occupied",
            grid.cell_count()
        )));
    }
    Ok(())
}

fn cell_for(grid: &OccupancyGrid, pose: &Pose2D, what: &str) -> Result<usize> {
    if !(pose.x.is_finite() && pose.y.is_finite() && pose.theta.is_finite()) {
        return Err(ExploreError::InvalidInput(format!(
            "{} pose is not finite",
            what
        )));
    }
    grid.world_to_index(pose.position()).ok_or_else(|| {
        ExploreError::InvalidInput(format!(
            "{} ({:.2}, {:.2}) is outside the grid",
            what, pose.x, pose.y
        ))
    })
}
