//! Shared utility functions

use std::f32::consts::PI;

/// Normalize angle to [-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Unsigned heading change in [0, π] needed to turn from `from` to `to`.
#[inline]
pub fn angle_between(from: f32, to: f32) -> f32 {
    normalize_angle(to - from).abs()
}
