//! HTS line protocol.
//!
//! # Wire Format
//!
//! One packet per UTF-8 text line, newline-terminated on stream transports:
//!
//! ```text
//! Right wrist:, 0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 1.0
//! Left landmarks:, v0, v1, ..., v62
//! └─ side ─┘└kind┘ └──── comma-separated f64 payload ────┘
//! ```
//!
//! - **side**: `Left` | `Right` (case-sensitive)
//! - **kind**: `wrist` | `landmarks` (case-insensitive)
//! - **payload**: whitespace around tokens is ignored, empty tokens
//!   (e.g. from a trailing comma) are dropped before counting
//! - **wrist**: 7 values `(x, y, z, qx, qy, qz, qw)`
//! - **landmarks**: 63 values, 21 consecutive `(x, y, z)` triples

mod parser;

pub use parser::{ParseError, parse_line};

/// Values in a wrist payload.
pub const WRIST_VALUE_COUNT: usize = 7;

/// Landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Values in a landmarks payload.
pub const LANDMARK_VALUE_COUNT: usize = LANDMARK_COUNT * 3;
