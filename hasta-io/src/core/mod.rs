//! Core value types for HTS telemetry.
//!
//! - [`types`]: Hand side, wrist pose, landmarks, parsed packets, assembled frames

pub mod types;
