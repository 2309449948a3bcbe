//! Grid and world coordinate types.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Integer cell coordinate. `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub fn chebyshev_distance(&self, other: &GridCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Euclidean distance in cells.
    #[inline]
    pub fn euclidean_distance(&self, other: &GridCoord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for GridCoord {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridCoord {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Point in world coordinates (meters).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub const ZERO: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bearing from this point toward `other`, in radians.
    #[inline]
    pub fn angle_to(&self, other: &WorldPoint) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_grid_distances() {
        let a = GridCoord::new(1, 1);
        let b = GridCoord::new(4, 5);
        assert_eq!(a.chebyshev_distance(&b), 4);
        assert_relative_eq!(a.euclidean_distance(&b), 5.0);
        assert_eq!(b - a, GridCoord::new(3, 4));
    }

    #[test]
    fn test_world_angle_to() {
        let a = WorldPoint::ZERO;
        let b = WorldPoint::new(1.0, 1.0);
        assert_relative_eq!(a.angle_to(&b), FRAC_PI_4, epsilon = 1e-6);
        assert_relative_eq!(a.distance(&b), 2.0f32.sqrt(), epsilon = 1e-6);
    }
}
