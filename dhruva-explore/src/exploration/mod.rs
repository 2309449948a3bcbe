//! Autonomous exploration module.
//!
//! This module provides frontier-based exploration capabilities:
//! - Frontier detection and clustering
//! - The planner state machine that turns a grid snapshot into a plan

mod frontier;
mod planner;

pub use frontier::{
    Frontier, FrontierConfig, FrontierDetector, FrontierScan, is_frontier_reached,
    is_same_frontier, yaw_to_unknown,
};
pub use planner::{
    ExplorationPlanner, Plan, PlanSource, PlannerState, PlannerStats, PlanningArtifacts,
    TrajectoryRefiner,
};
