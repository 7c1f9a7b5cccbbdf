//! Stream behaviour switches.

use crate::core::types::HandSide;
use serde::{Deserialize, Serialize};

/// Which events the client yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamOutput {
    Packets,
    #[default]
    Frames,
    Both,
}

impl StreamOutput {
    pub fn includes_packets(self) -> bool {
        matches!(self, StreamOutput::Packets | StreamOutput::Both)
    }

    /// Whether packets are fed to the assembler at all.
    pub fn includes_frames(self) -> bool {
        matches!(self, StreamOutput::Frames | StreamOutput::Both)
    }
}

/// Hand sides let through to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandFilter {
    #[default]
    Both,
    Left,
    Right,
}

impl HandFilter {
    pub fn matches(self, side: HandSide) -> bool {
        match self {
            HandFilter::Both => true,
            HandFilter::Left => side == HandSide::Left,
            HandFilter::Right => side == HandSide::Right,
        }
    }
}

/// What to do with a line that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Yield the error and end the stream
    #[default]
    Strict,
    /// Count the line and move on
    Tolerant,
}
