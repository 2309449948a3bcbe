//! Core geometric types shared by the grid, transforms and planner.
//!
//! - [`GridCoord`] and [`WorldPoint`]: integer cell and metric coordinates
//! - [`Pose2D`]: position plus yaw, used for start, goal and every plan pose

mod point;
mod pose;

pub use point::{GridCoord, WorldPoint};
pub use pose::Pose2D;
