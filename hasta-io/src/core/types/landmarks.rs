//! Hand landmark set.

use super::joints::{FingerName, JointName};
use crate::protocol::LANDMARK_COUNT;
use serde::{Deserialize, Serialize};

/// A single landmark `[x, y, z]`.
pub type LandmarkPoint = [f64; 3];

/// Ordered set of 21 hand landmarks.
///
/// `points[i]` is always the joint `JointName::ALL[i]`. The fixed array
/// length makes the count a type-level invariant: a mapping whose `points`
/// list is not exactly 21 entries long fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub points: [LandmarkPoint; LANDMARK_COUNT],
}

impl HandLandmarks {
    #[inline]
    pub fn new(points: [LandmarkPoint; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from 63 values laid out as consecutive `(x, y, z)` triples.
    pub fn from_flat(values: &[f64; LANDMARK_COUNT * 3]) -> Self {
        let mut points = [[0.0; 3]; LANDMARK_COUNT];
        for (point, chunk) in points.iter_mut().zip(values.chunks_exact(3)) {
            *point = [chunk[0], chunk[1], chunk[2]];
        }
        Self { points }
    }

    /// Point for one named joint.
    #[inline]
    pub fn joint(&self, joint: JointName) -> LandmarkPoint {
        self.points[joint.index()]
    }

    /// Points for one joint group, base to tip.
    pub fn finger(&self, finger: FingerName) -> Vec<(JointName, LandmarkPoint)> {
        finger
            .joints()
            .iter()
            .map(|&j| (j, self.joint(j)))
            .collect()
    }

    /// Iterate `(joint, point)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (JointName, LandmarkPoint)> + '_ {
        JointName::ALL.iter().copied().zip(self.points.iter().copied())
    }

    /// Apply `f` to every point, preserving order.
    pub fn map_points<F: FnMut(LandmarkPoint) -> LandmarkPoint>(&self, mut f: F) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            *p = f(*p);
        }
        Self { points }
    }
}

impl Default for HandLandmarks {
    fn default() -> Self {
        Self {
            points: [[0.0; 3]; LANDMARK_COUNT],
        }
    }
}
