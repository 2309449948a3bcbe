//! # DhruvaExplore: Exploration-Transform Planner
//!
//! Plans paths for frontier-based exploration over a 2D occupancy grid
//! snapshot, using two cooperating wavefronts.
//!
//! ## Pipeline
//!
//! ```text
//!   OccupancyGrid ──► obstacle transform ──────────────┐ (danger term)
//!        │                                             ▼
//!        └──► reachability ──► frontier scan ──► exploration transform
//!                                (goal set)            │
//!                                                      ▼
//!                                          gradient descent ──► Plan
//! ```
//!
//! - **Obstacle transform**: cost from the nearest obstacle for every free cell
//! - **Exploration transform**: cost to the nearest goal, with a quadratic
//!   penalty near obstacles and an optional heading penalty on the goals
//! - **Frontiers**: free cells next to unknown space, clustered and size-filtered
//! - **Trajectory**: steepest descent from the robot cell to a goal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dhruva_explore::{ExplorationPlanner, OccupancyGrid, PlannerConfig, Pose2D, WorldPoint};
//!
//! let grid = OccupancyGrid::from_ascii(
//!     "#######
//!      #....??
//!      #....??
//!      #######",
//!     0.05,
//!     WorldPoint::ZERO,
//! )?;
//! let mut planner = ExplorationPlanner::new(PlannerConfig::default());
//! let plan = planner.do_exploration(&grid, Pose2D::new(0.075, 0.075, 0.0))?;
//! println!("{} poses", plan.poses.len());
//! # Ok::<(), dhruva_explore::ExploreError>(())
//! ```
//!
//! All planning is synchronous and single-threaded. A planner owns its
//! buffers, so concurrent callers need one planner each.

pub mod config;
pub mod core;
pub mod error;
pub mod exploration;
pub mod grid;
pub mod planning;
pub mod utils;

pub use config::{ExploreConfig, PlannerConfig};
pub use crate::core::{GridCoord, Pose2D, WorldPoint};
pub use error::{ExploreError, Result};
pub use exploration::{
    ExplorationPlanner, Frontier, FrontierScan, Plan, PlanSource, PlannerState, PlannerStats,
    PlanningArtifacts, TrajectoryRefiner,
};
pub use grid::{CellClass, OccupancyGrid};
pub use planning::{DIAGONAL_COST, STRAIGHT_COST, TransformField};
