//! Coordinate conversion helpers.
//!
//! HTS streams poses in Unity's left-handed basis (x right, y up,
//! z forward). Consumers usually want a right-handed basis or ROS-style
//! FLU (x forward, y left, z up):
//!
//! ```text
//! Unity left-handed ──(flip Y)──► right-handed ("SDK") ──► FLU
//!     (x, y, z)                      (x, -y, z)           (z, -x, -y) of SDK
//! ```
//!
//! Quaternions are `[qx, qy, qz, qw]`. All functions are pure.

use crate::core::types::{HandFrame, HandLandmarks, LandmarkPoint, WristPose};

type Mat3 = [[f64; 3]; 3];

/// Y-axis reflection `diag(1, -1, 1)`.
const FLIP_Y: Mat3 = [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]];

const IDENTITY_QUAT: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

/// Flip a Unity left-handed position into the right-handed basis.
#[inline]
pub fn unity_left_to_right_position(x: f64, y: f64, z: f64) -> [f64; 3] {
    [x, -y, z]
}

/// Convert a Unity left-handed orientation with `R' = S·R·S`, `S = diag(1, -1, 1)`.
///
/// The result is normalised; a zero quaternion maps to identity.
pub fn unity_left_to_right_quaternion(qx: f64, qy: f64, qz: f64, qw: f64) -> [f64; 4] {
    let r = quaternion_to_matrix([qx, qy, qz, qw]);
    let transformed = matmul(&matmul(&FLIP_Y, &r), &FLIP_Y);
    matrix_to_quaternion(&transformed)
}

pub fn convert_wrist_pose_unity_left_to_right(pose: &WristPose) -> WristPose {
    let [x, y, z] = unity_left_to_right_position(pose.x, pose.y, pose.z);
    let [qx, qy, qz, qw] = unity_left_to_right_quaternion(pose.qx, pose.qy, pose.qz, pose.qw);
    WristPose::new(x, y, z, qx, qy, qz, qw)
}

/// Flip every landmark, preserving order.
pub fn convert_landmarks_unity_left_to_right(landmarks: &HandLandmarks) -> HandLandmarks {
    landmarks.map_points(|[x, y, z]| unity_left_to_right_position(x, y, z))
}

/// Convert frame geometry; every metadata field is kept as-is.
pub fn convert_hand_frame_unity_left_to_right(frame: &HandFrame) -> HandFrame {
    HandFrame {
        wrist: convert_wrist_pose_unity_left_to_right(&frame.wrist),
        landmarks: convert_landmarks_unity_left_to_right(&frame.landmarks),
        ..frame.clone()
    }
}

/// Right-handed SDK position to FLU.
#[inline]
pub fn sdk_to_flu_position(x: f64, y: f64, z: f64) -> [f64; 3] {
    [z, -x, -y]
}

/// Right-handed Unity position to FLU. Same basis as the SDK output.
#[inline]
pub fn unity_right_to_flu_position(x: f64, y: f64, z: f64) -> [f64; 3] {
    sdk_to_flu_position(x, y, z)
}

/// Raw Unity left-handed position straight to FLU.
#[inline]
pub fn unity_left_to_flu_position(x: f64, y: f64, z: f64) -> [f64; 3] {
    [z, -x, y]
}

/// Rotate `v` by `q` (`v' = q·v·q⁻¹`).
///
/// `q` is normalised first; a zero quaternion leaves `v` unchanged.
pub fn rotate_vector_by_quaternion(v: [f64; 3], q: [f64; 4]) -> [f64; 3] {
    let Some([qx, qy, qz, qw]) = normalized(q) else {
        return v;
    };
    let [x, y, z] = v;

    // t = 2 (q_xyz × v);  v' = v + w t + q_xyz × t
    let tx = 2.0 * (qy * z - qz * y);
    let ty = 2.0 * (qz * x - qx * z);
    let tz = 2.0 * (qx * y - qy * x);

    [
        x + qw * tx + (qy * tz - qz * ty),
        y + qw * ty + (qz * tx - qx * tz),
        z + qw * tz + (qx * ty - qy * tx),
    ]
}

/// Place wrist-relative landmarks in the wrist's parent frame.
///
/// Each point is rotated by the wrist orientation, then offset by the
/// wrist position.
pub fn landmarks_wrist_to_world(landmarks: &HandLandmarks, wrist: &WristPose) -> HandLandmarks {
    let q = wrist.orientation();
    let [wx, wy, wz] = wrist.position();
    landmarks.map_points(|p: LandmarkPoint| {
        let [rx, ry, rz] = rotate_vector_by_quaternion(p, q);
        [rx + wx, ry + wy, rz + wz]
    })
}

fn normalized(q: [f64; 4]) -> Option<[f64; 4]> {
    let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
    if norm == 0.0 {
        return None;
    }
    Some(q.map(|c| c / norm))
}

fn quaternion_to_matrix([qx, qy, qz, qw]: [f64; 4]) -> Mat3 {
    let (xx, yy, zz) = (qx * qx, qy * qy, qz * qz);
    let (xy, xz, yz) = (qx * qy, qx * qz, qy * qz);
    let (wx, wy, wz) = (qw * qx, qw * qy, qw * qz);
    [
        [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
        [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
        [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
    ]
}

/// Shepperd's method, branching on the largest diagonal term.
fn matrix_to_quaternion(m: &Mat3) -> [f64; 4] {
    let trace = m[0][0] + m[1][1] + m[2][2];
    let q = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        [
            (m[2][1] - m[1][2]) / s,
            (m[0][2] - m[2][0]) / s,
            (m[1][0] - m[0][1]) / s,
            0.25 * s,
        ]
    } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
        let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
        [
            0.25 * s,
            (m[0][1] + m[1][0]) / s,
            (m[0][2] + m[2][0]) / s,
            (m[2][1] - m[1][2]) / s,
        ]
    } else if m[1][1] > m[2][2] {
        let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
        [
            (m[0][1] + m[1][0]) / s,
            0.25 * s,
            (m[1][2] + m[2][1]) / s,
            (m[0][2] - m[2][0]) / s,
        ]
    } else {
        let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
        [
            (m[0][2] + m[2][0]) / s,
            (m[1][2] + m[2][1]) / s,
            0.25 * s,
            (m[1][0] - m[0][1]) / s,
        ]
    };
    normalized(q).unwrap_or(IDENTITY_QUAT)
}

fn matmul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::HandSide;
    use crate::protocol::LANDMARK_COUNT;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn assert_quat_eq(actual: [f64; 4], expected: [f64; 4]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    fn assert_vec_eq(actual: [f64; 3], expected: [f64; 3]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_position_flip() {
        assert_eq!(unity_left_to_right_position(1.0, 2.0, 3.0), [1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_identity_quaternion_unchanged() {
        assert_quat_eq(
            unity_left_to_right_quaternion(0.0, 0.0, 0.0, 1.0),
            [0.0, 0.0, 0.0, 1.0],
        );
    }

    #[test]
    fn test_zero_quaternion_becomes_identity() {
        assert_quat_eq(
            unity_left_to_right_quaternion(0.0, 0.0, 0.0, 0.0),
            [0.0, 0.0, 0.0, 1.0],
        );
    }

    #[test]
    fn test_quaternion_reflection_negates_x_and_z() {
        let n = (0.1f64 * 0.1 + 0.2 * 0.2 + 0.3 * 0.3 + 0.9 * 0.9).sqrt();
        let q = [0.1 / n, 0.2 / n, 0.3 / n, 0.9 / n];
        let converted = unity_left_to_right_quaternion(q[0], q[1], q[2], q[3]);
        assert_quat_eq(converted, [-q[0], q[1], -q[2], q[3]]);
    }

    #[test]
    fn test_half_turn_takes_non_trace_branch() {
        // 180° about X: trace = -1
        let converted = unity_left_to_right_quaternion(1.0, 0.0, 0.0, 0.0);
        let [qx, qy, qz, qw] = converted;
        assert_relative_eq!(qx.abs(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(qy, 0.0, epsilon = 1e-9);
        assert_relative_eq!(qz, 0.0, epsilon = 1e-9);
        assert_relative_eq!(qw, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frame_conversion_keeps_metadata() {
        let frame = HandFrame {
            side: HandSide::Left,
            frame_id: "left_hand_link".to_string(),
            wrist: WristPose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0),
            landmarks: HandLandmarks::new([[1.0, 2.0, 3.0]; LANDMARK_COUNT]),
            sequence_id: 4,
            recv_ts_ns: 10,
            recv_time_unix_ns: Some(20),
            source_ts_ns: None,
            wrist_recv_ts_ns: 9,
            landmarks_recv_ts_ns: 10,
        };
        let converted = convert_hand_frame_unity_left_to_right(&frame);
        assert_eq!(converted.frame_id, "left_hand_link");
        assert_eq!(converted.sequence_id, 4);
        assert_eq!(converted.recv_time_unix_ns, Some(20));
        assert_eq!(converted.wrist.position(), [1.0, -2.0, 3.0]);
        assert_eq!(converted.landmarks.points[7], [1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_flu_mappings() {
        assert_eq!(sdk_to_flu_position(1.0, 2.0, 3.0), [3.0, -1.0, -2.0]);
        assert_eq!(unity_right_to_flu_position(1.0, 2.0, 3.0), [3.0, -1.0, -2.0]);
        assert_eq!(unity_left_to_flu_position(1.0, 2.0, 3.0), [3.0, -1.0, 2.0]);

        let [x, y, z] = unity_left_to_right_position(4.0, 5.0, 6.0);
        assert_eq!(sdk_to_flu_position(x, y, z), unity_left_to_flu_position(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_rotate_vector() {
        // 90° about Z maps +X to +Y.
        let q = [0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2];
        assert_vec_eq(rotate_vector_by_quaternion([1.0, 0.0, 0.0], q), [0.0, 1.0, 0.0]);

        // Non-unit input is normalised.
        let q2 = [0.0, 0.0, 2.0, 2.0];
        assert_vec_eq(rotate_vector_by_quaternion([1.0, 0.0, 0.0], q2), [0.0, 1.0, 0.0]);

        assert_eq!(
            rotate_vector_by_quaternion([1.0, 2.0, 3.0], [0.0; 4]),
            [1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_landmarks_wrist_to_world() {
        let wrist = WristPose::new(10.0, 20.0, 30.0, 0.0, 0.0, 0.0, 1.0);
        let lm = HandLandmarks::new([[1.0, 2.0, 3.0]; LANDMARK_COUNT]);
        let world = landmarks_wrist_to_world(&lm, &wrist);
        assert_vec_eq(world.points[0], [11.0, 22.0, 33.0]);
        assert_eq!(
            unity_left_to_flu_position(11.0, 22.0, 33.0),
            [33.0, -11.0, 22.0]
        );

        let rotated = WristPose::new(0.0, 0.0, 0.0, 0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2);
        let lm = HandLandmarks::new([[1.0, 0.0, 0.0]; LANDMARK_COUNT]);
        assert_vec_eq(landmarks_wrist_to_world(&lm, &rotated).points[3], [0.0, 1.0, 0.0]);
    }
}
