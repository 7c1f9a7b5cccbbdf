//! Hand side and packet kind discriminators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical side of a tracked hand.
///
/// Primary partitioning key for all per-side assembly state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Both sides, in slot order.
    pub const ALL: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    /// Wire label (`"Left"` / `"Right"`).
    pub fn as_str(self) -> &'static str {
        match self {
            HandSide::Left => "Left",
            HandSide::Right => "Right",
        }
    }

    /// Slot index used for fixed per-side storage.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            HandSide::Left => 0,
            HandSide::Right => 1,
        }
    }

    /// Case-sensitive match against the wire label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Left" => Some(HandSide::Left),
            "Right" => Some(HandSide::Right),
            _ => None,
        }
    }
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packet data category emitted by HTS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketKind {
    Wrist,
    Landmarks,
}

impl PacketKind {
    /// Wire label (`"wrist"` / `"landmarks"`).
    pub fn as_str(self) -> &'static str {
        match self {
            PacketKind::Wrist => "wrist",
            PacketKind::Landmarks => "landmarks",
        }
    }

    /// Case-insensitive match against the wire label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "wrist" => Some(PacketKind::Wrist),
            "landmarks" => Some(PacketKind::Landmarks),
            _ => None,
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
