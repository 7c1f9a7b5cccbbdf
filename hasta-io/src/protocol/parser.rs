//! Line parser: one raw text line in, one typed packet (or typed failure) out.

use super::{LANDMARK_VALUE_COUNT, WRIST_VALUE_COUNT};
use crate::core::types::{
    HandLandmarks, HandSide, LandmarksPacket, PacketKind, ParsedPacket, WristPacket, WristPose,
};

/// Reasons a wire line is rejected, checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Line is blank after trimming
    #[error("Empty line")]
    EmptyLine,

    /// No `:` between label and payload
    #[error("Missing ':' separator")]
    MissingSeparator,

    /// Label is not exactly `<side> <type>`
    #[error("Invalid label: {0:?}")]
    InvalidLabel(String),

    /// Side is neither `Left` nor `Right`
    #[error("Unsupported hand side: {0:?}")]
    UnsupportedSide(String),

    /// Type is neither `wrist` nor `landmarks`
    #[error("Unsupported packet type: {0:?}")]
    UnsupportedPacketType(String),

    /// A payload token does not parse as a float
    #[error("Payload contains non-float values")]
    NonFloatValue,

    /// Payload has the wrong number of values for its type
    #[error("{kind} packet must contain {expected} values, got {actual}")]
    WrongValueCount {
        kind: PacketKind,
        expected: usize,
        actual: usize,
    },
}

/// Parse one HTS line into a typed packet.
///
/// Leading/trailing whitespace on the line, the label and every payload
/// token is ignored. `NaN` and `inf` tokens are accepted as floats.
///
/// # Example
/// ```
/// use hasta_io::core::types::{HandSide, ParsedPacket};
/// use hasta_io::protocol::parse_line;
///
/// let packet = parse_line("Right wrist:, 0.1, 0.2, 0.3, 0, 0, 0, 1").unwrap();
/// match packet {
///     ParsedPacket::Wrist(w) => {
///         assert_eq!(w.side, HandSide::Right);
///         assert_eq!(w.data.z, 0.3);
///     }
///     ParsedPacket::Landmarks(_) => unreachable!(),
/// }
/// ```
pub fn parse_line(line: &str) -> Result<ParsedPacket, ParseError> {
    let stripped = line.trim();
    if stripped.is_empty() {
        return Err(ParseError::EmptyLine);
    }

    let (head, tail) = stripped
        .split_once(':')
        .ok_or(ParseError::MissingSeparator)?;

    let (side, kind) = parse_label(head.trim())?;
    let values = parse_floats(tail)?;

    match kind {
        PacketKind::Wrist => {
            let values: [f64; WRIST_VALUE_COUNT] =
                values.try_into().map_err(|v: Vec<f64>| wrong_count(kind, v.len()))?;
            Ok(ParsedPacket::Wrist(WristPacket {
                side,
                data: WristPose::from_values(values),
            }))
        }
        PacketKind::Landmarks => {
            let values: [f64; LANDMARK_VALUE_COUNT] =
                values.try_into().map_err(|v: Vec<f64>| wrong_count(kind, v.len()))?;
            Ok(ParsedPacket::Landmarks(LandmarksPacket {
                side,
                data: HandLandmarks::from_flat(&values),
            }))
        }
    }
}

/// Split `"Right wrist"` into side and kind.
fn parse_label(label: &str) -> Result<(HandSide, PacketKind), ParseError> {
    let parts: Vec<&str> = label.split_whitespace().collect();
    let [side_raw, kind_raw] = parts.as_slice() else {
        return Err(ParseError::InvalidLabel(label.to_string()));
    };

    let side = HandSide::from_label(side_raw)
        .ok_or_else(|| ParseError::UnsupportedSide(side_raw.to_string()))?;
    let kind = PacketKind::from_label(kind_raw)
        .ok_or_else(|| ParseError::UnsupportedPacketType(kind_raw.to_string()))?;

    Ok((side, kind))
}

fn parse_floats(payload: &str) -> Result<Vec<f64>, ParseError> {
    payload
        .split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| chunk.parse::<f64>().map_err(|_| ParseError::NonFloatValue))
        .collect()
}

fn wrong_count(kind: PacketKind, actual: usize) -> ParseError {
    let expected = match kind {
        PacketKind::Wrist => WRIST_VALUE_COUNT,
        PacketKind::Landmarks => LANDMARK_VALUE_COUNT,
    };
    ParseError::WrongValueCount {
        kind,
        expected,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::JointName;

    fn landmarks_payload() -> String {
        (0..63)
            .map(|i| format!("{:.2}", i as f64 / 100.0))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_parse_wrist() {
        let packet = parse_line("Right wrist:, 0.1, 0.2, 0.3, 0, 0, 0, 1").unwrap();
        assert_eq!(packet.side(), HandSide::Right);
        assert_eq!(packet.kind(), PacketKind::Wrist);
        let ParsedPacket::Wrist(wrist) = packet else {
            panic!("expected wrist packet");
        };
        assert_eq!(
            wrist.data,
            WristPose::new(0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn test_parse_landmarks_first_point() {
        let line = format!("Left landmarks:, {}", landmarks_payload());
        let packet = parse_line(&line).unwrap();
        assert_eq!(packet.side(), HandSide::Left);
        let ParsedPacket::Landmarks(lm) = packet else {
            panic!("expected landmarks packet");
        };
        assert_eq!(lm.data.points[0], [0.0, 0.01, 0.02]);
        assert_eq!(lm.data.joint(JointName::LittleTip), [0.60, 0.61, 0.62]);
    }

    #[test]
    fn test_whitespace_and_trailing_comma_tolerated() {
        let packet = parse_line("   Left   WRIST  :  1 ,2,  3,4,5 ,6,7,  \r\n").unwrap();
        assert_eq!(packet.side(), HandSide::Left);
        assert_eq!(packet.kind(), PacketKind::Wrist);
    }

    #[test]
    fn test_rejection_set() {
        assert_eq!(parse_line(""), Err(ParseError::EmptyLine));
        assert_eq!(parse_line("   \t "), Err(ParseError::EmptyLine));
        assert_eq!(
            parse_line("Left wrist 1,2,3"),
            Err(ParseError::MissingSeparator)
        );
        assert_eq!(
            parse_line("Middle wrist:, 1,2,3,4,5,6,7"),
            Err(ParseError::UnsupportedSide("Middle".to_string()))
        );
        assert_eq!(
            parse_line("Right unknown:, 1,2,3"),
            Err(ParseError::UnsupportedPacketType("unknown".to_string()))
        );
        assert_eq!(
            parse_line("Right wrist:, 1,2,3"),
            Err(ParseError::WrongValueCount {
                kind: PacketKind::Wrist,
                expected: 7,
                actual: 3,
            })
        );
        assert_eq!(
            parse_line("Right wrist:, 1,2,3,4,5,6,foo"),
            Err(ParseError::NonFloatValue)
        );
    }

    #[test]
    fn test_invalid_label_shapes() {
        assert_eq!(
            parse_line("Right:, 1,2,3,4,5,6,7"),
            Err(ParseError::InvalidLabel("Right".to_string()))
        );
        assert_eq!(
            parse_line("Right hand wrist:, 1,2,3,4,5,6,7"),
            Err(ParseError::InvalidLabel("Right hand wrist".to_string()))
        );
        assert_eq!(
            parse_line("right wrist:, 1,2,3,4,5,6,7"),
            Err(ParseError::UnsupportedSide("right".to_string()))
        );
    }

    #[test]
    fn test_label_checked_before_payload() {
        assert_eq!(
            parse_line("Middle wrist:, foo"),
            Err(ParseError::UnsupportedSide("Middle".to_string()))
        );
    }

    #[test]
    fn test_landmarks_wrong_count() {
        let err = parse_line("Left landmarks:, 1,2,3").unwrap_err();
        assert_eq!(
            err,
            ParseError::WrongValueCount {
                kind: PacketKind::Landmarks,
                expected: 63,
                actual: 3,
            }
        );
        assert_eq!(
            err.to_string(),
            "landmarks packet must contain 63 values, got 3"
        );
    }

    #[test]
    fn test_non_finite_tokens_accepted() {
        let packet = parse_line("Left wrist:, NaN, inf, -inf, 0, 0, 0, 1").unwrap();
        let ParsedPacket::Wrist(wrist) = packet else {
            panic!("expected wrist packet");
        };
        assert!(wrist.data.x.is_nan());
        assert!(wrist.data.y.is_infinite());
    }
}
