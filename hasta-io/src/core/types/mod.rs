//! Wire model types.
//!
//! Everything here is plain data: created by the parser or the assembler,
//! consumed by value, never mutated afterwards.

mod frame;
mod hand;
mod joints;
mod landmarks;
mod packet;
mod pose;

pub use frame::HandFrame;
pub use hand::{HandSide, PacketKind};
pub use joints::{FingerName, JointName, UnknownName};
pub use landmarks::{HandLandmarks, LandmarkPoint};
pub use packet::{LandmarksPacket, ParsedPacket, WristPacket};
pub use pose::WristPose;
