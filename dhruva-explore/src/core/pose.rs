//! 2D pose type.
//!
//! Counter-clockwise positive yaw from the +X axis, as in the rest of the
//! VacuumTiger stack.

use serde::{Deserialize, Serialize};

use super::point::WorldPoint;
use crate::utils::normalize_angle;

/// Position (meters) plus heading (radians, normalized to [-π, π]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose. The heading is normalized.
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    #[inline]
    pub fn from_point(point: WorldPoint, theta: f32) -> Self {
        Self::new(point.x, point.y, theta)
    }

    #[inline]
    pub fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    #[inline]
    pub fn distance(&self, other: &Pose2D) -> f32 {
        self.position().distance(&other.position())
    }
}
