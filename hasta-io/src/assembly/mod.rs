//! Frame assembly.
//!
//! Merges independently arriving wrist and landmark packets into coherent
//! per-side [`HandFrame`](crate::core::types::HandFrame)s.
//!
//! ```text
//!   WristPacket ──┐
//!                 ├─► per-side slot ─► staleness ─► gating ─► advancement ─► HandFrame
//! LandmarksPacket ┘   [Left, Right]     (ts < stored)  (both seen)  (ts != last emitted)
//! ```
//!
//! The assembler is a synchronous, single-owner reducer: no threads, no
//! I/O, no locking. Time comes from an injected [`Clock`].

mod assembler;
mod clock;

pub use assembler::{
    AssemblerConfig, DEFAULT_LEFT_FRAME_ID, DEFAULT_RIGHT_FRAME_ID, HandFrameAssembler, Stamps,
};
pub use clock::{Clock, ManualClock, SystemClock};
