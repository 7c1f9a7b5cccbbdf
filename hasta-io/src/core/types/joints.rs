//! Canonical joint and finger naming for the 21-point landmark set.

use std::fmt;
use std::str::FromStr;

/// Lookup failure for [`JointName`] / [`FingerName`] parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownName {
    #[error("Unknown joint name: {0:?}")]
    Joint(String),
    #[error("Unknown finger name: {0:?}")]
    Finger(String),
}

/// One of the 21 streamed joints, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointName {
    Wrist,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    IndexTip,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    MiddleTip,
    RingProximal,
    RingIntermediate,
    RingDistal,
    RingTip,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
    LittleTip,
}

impl JointName {
    /// All joints; `ALL[i].index() == i`.
    pub const ALL: [JointName; 21] = [
        JointName::Wrist,
        JointName::ThumbMetacarpal,
        JointName::ThumbProximal,
        JointName::ThumbDistal,
        JointName::ThumbTip,
        JointName::IndexProximal,
        JointName::IndexIntermediate,
        JointName::IndexDistal,
        JointName::IndexTip,
        JointName::MiddleProximal,
        JointName::MiddleIntermediate,
        JointName::MiddleDistal,
        JointName::MiddleTip,
        JointName::RingProximal,
        JointName::RingIntermediate,
        JointName::RingDistal,
        JointName::RingTip,
        JointName::LittleProximal,
        JointName::LittleIntermediate,
        JointName::LittleDistal,
        JointName::LittleTip,
    ];

    /// Position of this joint in the landmark array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical name, e.g. `"IndexTip"`.
    pub fn as_str(self) -> &'static str {
        match self {
            JointName::Wrist => "Wrist",
            JointName::ThumbMetacarpal => "ThumbMetacarpal",
            JointName::ThumbProximal => "ThumbProximal",
            JointName::ThumbDistal => "ThumbDistal",
            JointName::ThumbTip => "ThumbTip",
            JointName::IndexProximal => "IndexProximal",
            JointName::IndexIntermediate => "IndexIntermediate",
            JointName::IndexDistal => "IndexDistal",
            JointName::IndexTip => "IndexTip",
            JointName::MiddleProximal => "MiddleProximal",
            JointName::MiddleIntermediate => "MiddleIntermediate",
            JointName::MiddleDistal => "MiddleDistal",
            JointName::MiddleTip => "MiddleTip",
            JointName::RingProximal => "RingProximal",
            JointName::RingIntermediate => "RingIntermediate",
            JointName::RingDistal => "RingDistal",
            JointName::RingTip => "RingTip",
            JointName::LittleProximal => "LittleProximal",
            JointName::LittleIntermediate => "LittleIntermediate",
            JointName::LittleDistal => "LittleDistal",
            JointName::LittleTip => "LittleTip",
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JointName {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JointName::ALL
            .iter()
            .copied()
            .find(|j| j.as_str() == s)
            .ok_or_else(|| UnknownName::Joint(s.to_string()))
    }
}

/// Joint group: the wrist or one of the five fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerName {
    Wrist,
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl FingerName {
    pub const ALL: [FingerName; 6] = [
        FingerName::Wrist,
        FingerName::Thumb,
        FingerName::Index,
        FingerName::Middle,
        FingerName::Ring,
        FingerName::Little,
    ];

    /// Joints belonging to this group, base to tip.
    pub fn joints(self) -> &'static [JointName] {
        let all: &'static [JointName; 21] = &JointName::ALL;
        match self {
            FingerName::Wrist => &all[0..1],
            FingerName::Thumb => &all[1..5],
            FingerName::Index => &all[5..9],
            FingerName::Middle => &all[9..13],
            FingerName::Ring => &all[13..17],
            FingerName::Little => &all[17..21],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FingerName::Wrist => "wrist",
            FingerName::Thumb => "thumb",
            FingerName::Index => "index",
            FingerName::Middle => "middle",
            FingerName::Ring => "ring",
            FingerName::Little => "little",
        }
    }
}

impl fmt::Display for FingerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerName {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        FingerName::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lowered)
            .ok_or_else(|| UnknownName::Finger(s.to_string()))
    }
}
