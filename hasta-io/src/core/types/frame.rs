//! Assembled per-hand frame.

use super::hand::HandSide;
use super::joints::{FingerName, JointName};
use super::landmarks::{HandLandmarks, LandmarkPoint};
use super::pose::WristPose;
use serde::{Deserialize, Serialize};

/// Coherent per-hand snapshot built from the latest wrist and landmark
/// packets of one side.
///
/// Only the frame assembler creates these. For every emitted frame
/// `recv_ts_ns == max(wrist_recv_ts_ns, landmarks_recv_ts_ns)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub side: HandSide,
    /// Stable per-side identifier for downstream middleware (e.g. `"hts_left_hand"`)
    pub frame_id: String,
    pub wrist: WristPose,
    pub landmarks: HandLandmarks,
    /// Per-side counter, starts at 0, no gaps
    pub sequence_id: u64,
    /// Monotonic receive time of the newer component
    pub recv_ts_ns: i64,
    /// Wall-clock receive time in Unix nanoseconds
    pub recv_time_unix_ns: Option<i64>,
    /// Sender-supplied timestamp
    pub source_ts_ns: Option<i64>,
    pub wrist_recv_ts_ns: i64,
    pub landmarks_recv_ts_ns: i64,
}

impl HandFrame {
    #[inline]
    pub fn joint(&self, joint: JointName) -> LandmarkPoint {
        self.landmarks.joint(joint)
    }

    #[inline]
    pub fn finger(&self, finger: FingerName) -> Vec<(JointName, LandmarkPoint)> {
        self.landmarks.finger(finger)
    }
}
