//! HastaIO - Client library for the HTS hand-tracking telemetry stream
//!
//! HTS sends one text line per packet (wrist pose or 21 hand landmarks, per
//! side). This crate receives those lines, parses them into typed packets and
//! assembles per-hand frames once both halves of a side have arrived.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Executables
//! │             (hts-stream, hts-record)                │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │               streaming/  +  io/                    │  ← Client, JSONL log
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │            transport/   assembly/                   │  ← Line sources,
//! │     (udp, tcp server/client, replay)                │    frame assembly
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │               protocol/   convert                   │  ← Parsing, frames
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │      (HandSide, WristPose, HandLandmarks, ...)      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use hasta_io::config::ClientConfig;
//! use hasta_io::streaming::{HtsClient, StreamEvent};
//! use hasta_io::transport::TransportMode;
//!
//! let config = ClientConfig {
//!     transport: TransportMode::TcpServer,
//!     port: 8000,
//!     ..ClientConfig::default()
//! };
//! let mut client = HtsClient::new(config)?;
//! for event in client.events()?.take(100) {
//!     if let StreamEvent::Frame(frame) = event? {
//!         println!("{} #{}", frame.side, frame.sequence_id);
//!     }
//! }
//! # Ok::<(), hasta_io::Error>(())
//! ```

pub mod assembly;
pub mod config;
pub mod convert;
pub mod core;
pub mod error;
pub mod io;
pub mod protocol;
pub mod streaming;
pub mod transport;

// Re-export commonly used types
pub use assembly::{AssemblerConfig, HandFrameAssembler, Stamps};
pub use config::{AppConfig, ClientConfig};
pub use crate::core::types::{
    FingerName, HandFrame, HandLandmarks, HandSide, JointName, PacketKind, ParsedPacket,
    WristPose,
};
pub use error::{Error, Result};
pub use protocol::{ParseError, parse_line};
pub use streaming::{HtsClient, StreamEvent};
pub use transport::{LineSource, TransportMode};
