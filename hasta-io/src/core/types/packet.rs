//! Parsed packet variants.

use super::hand::{HandSide, PacketKind};
use super::landmarks::HandLandmarks;
use super::pose::WristPose;
use serde::{Deserialize, Serialize};

/// Parsed wrist packet for one hand side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WristPacket {
    pub side: HandSide,
    pub data: WristPose,
}

/// Parsed landmark packet for one hand side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarksPacket {
    pub side: HandSide,
    pub data: HandLandmarks,
}

/// One parsed wire line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedPacket {
    Wrist(WristPacket),
    Landmarks(LandmarksPacket),
}

impl ParsedPacket {
    pub fn side(&self) -> HandSide {
        match self {
            ParsedPacket::Wrist(p) => p.side,
            ParsedPacket::Landmarks(p) => p.side,
        }
    }

    /// Discriminator derived from the variant.
    pub fn kind(&self) -> PacketKind {
        match self {
            ParsedPacket::Wrist(_) => PacketKind::Wrist,
            ParsedPacket::Landmarks(_) => PacketKind::Landmarks,
        }
    }
}

impl From<WristPacket> for ParsedPacket {
    fn from(p: WristPacket) -> Self {
        ParsedPacket::Wrist(p)
    }
}

impl From<LandmarksPacket> for ParsedPacket {
    fn from(p: LandmarksPacket) -> Self {
        ParsedPacket::Landmarks(p)
    }
}
