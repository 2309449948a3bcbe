//! Configuration loading for DhruvaExplore

use crate::error::{ExploreError, Result};
use crate::planning::STRAIGHT_COST;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration file layout.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ExploreConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Planner parameters.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlannerConfig {
    /// Treat unknown cells as traversable when planning (default: false)
    #[serde(default = "default_plan_in_unknown")]
    pub plan_in_unknown: bool,

    /// Treat inflated-obstacle cells as blocking and as obstacle seeds (default: true)
    #[serde(default = "default_use_inflated_obs")]
    pub use_inflated_obs: bool,

    /// Scale of the heading-change cost added to frontier seeds (default: 50.0)
    #[serde(default = "default_goal_angle_penalty")]
    pub goal_angle_penalty: f32,

    /// Clearance in cells below which the danger term applies (default: 10)
    #[serde(default = "default_min_obstacle_dist")]
    pub min_obstacle_dist: u32,

    /// Minimum number of cells for a frontier cluster to be kept (default: 5)
    #[serde(default = "default_min_frontier_size")]
    pub min_frontier_size: usize,

    /// Danger weighting coefficient (default: 0.5)
    #[serde(default = "default_alpha")]
    pub alpha: f32,

    /// Distance in meters at which a frontier counts as reached (default: 0.25)
    #[serde(default = "default_dist_for_goal_reached")]
    pub dist_for_goal_reached: f32,

    /// Frontiers closer than this (meters) are the same frontier (default: 0.25)
    #[serde(default = "default_same_frontier_dist")]
    pub same_frontier_dist: f32,

    /// Obstacle transform stops expanding past this distance in meters, but
    /// never short of `min_obstacle_dist`. Zero or negative disables the
    /// cutoff (default: 0.0)
    #[serde(default = "default_obstacle_cutoff_dist")]
    pub obstacle_cutoff_dist: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            plan_in_unknown: default_plan_in_unknown(),
            use_inflated_obs: default_use_inflated_obs(),
            goal_angle_penalty: default_goal_angle_penalty(),
            min_obstacle_dist: default_min_obstacle_dist(),
            min_frontier_size: default_min_frontier_size(),
            alpha: default_alpha(),
            dist_for_goal_reached: default_dist_for_goal_reached(),
            same_frontier_dist: default_same_frontier_dist(),
            obstacle_cutoff_dist: default_obstacle_cutoff_dist(),
        }
    }
}

// Default value functions
fn default_plan_in_unknown() -> bool {
    false
}
fn default_use_inflated_obs() -> bool {
    true
}
fn default_goal_angle_penalty() -> f32 {
    50.0
}
fn default_min_obstacle_dist() -> u32 {
    10
}
fn default_min_frontier_size() -> usize {
    5
}
fn default_alpha() -> f32 {
    0.5
}
fn default_dist_for_goal_reached() -> f32 {
    0.25
}
fn default_same_frontier_dist() -> f32 {
    0.25
}
fn default_obstacle_cutoff_dist() -> f32 {
    0.0
}

impl PlannerConfig {
    /// Danger threshold expressed in transform cost units.
    pub fn min_obstacle_cost(&self) -> u32 {
        self.min_obstacle_dist.saturating_mul(STRAIGHT_COST)
    }

    /// Obstacle cutoff in transform cost units for a grid of `resolution`
    /// meters per cell, or `None` when the cutoff is disabled.
    ///
    /// Never below [`Self::min_obstacle_cost`], so every cell inside the
    /// danger zone still gets its exact distance.
    pub fn obstacle_cutoff_cost(&self, resolution: f32) -> Option<u32> {
        if self.obstacle_cutoff_dist <= 0.0 || resolution <= 0.0 {
            return None;
        }
        let cells = (self.obstacle_cutoff_dist / resolution).round().max(1.0) as u32;
        Some(
            cells
                .saturating_mul(STRAIGHT_COST)
                .max(self.min_obstacle_cost()),
        )
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ExploreError::Config(format!(
                "alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        if !self.goal_angle_penalty.is_finite() || self.goal_angle_penalty < 0.0 {
            return Err(ExploreError::Config(format!(
                "goal_angle_penalty must be a non-negative number, got {}",
                self.goal_angle_penalty
            )));
        }
        if self.dist_for_goal_reached < 0.0 || self.same_frontier_dist < 0.0 {
            return Err(ExploreError::Config(
                "distance thresholds must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl ExploreConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExploreError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ExploreConfig = toml::from_str(content)?;
        config.planner.validate()?;
        Ok(config)
    }
}
