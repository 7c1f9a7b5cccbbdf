//! Persistence of stream events.

pub mod jsonl;

pub use jsonl::{JsonlRecorder, LoggedRecord, PacketData, read_records};
