//! Wrist pose type.

use serde::{Deserialize, Serialize};

/// Cartesian wrist position and orientation quaternion.
///
/// No normalization is applied; consumers that need a unit quaternion
/// (e.g. [`crate::convert`]) normalize on their side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WristPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    pub qw: f64,
}

impl WristPose {
    /// Create a pose from position and quaternion components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64, qx: f64, qy: f64, qz: f64, qw: f64) -> Self {
        Self {
            x,
            y,
            z,
            qx,
            qy,
            qz,
            qw,
        }
    }

    /// Pose at the origin with identity orientation.
    #[inline]
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0)
    }

    /// Build from wire order `(x, y, z, qx, qy, qz, qw)`.
    #[inline]
    pub fn from_values(v: [f64; 7]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5], v[6])
    }

    /// Position `[x, y, z]`.
    #[inline]
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Orientation `[qx, qy, qz, qw]`.
    #[inline]
    pub fn orientation(&self) -> [f64; 4] {
        [self.qx, self.qy, self.qz, self.qw]
    }
}

impl Default for WristPose {
    fn default() -> Self {
        Self::identity()
    }
}
