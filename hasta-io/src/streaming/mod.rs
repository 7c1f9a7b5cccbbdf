//! High-level streaming client.
//!
//! Wires a [`LineSource`](crate::transport::LineSource) to the parser and
//! the frame assembler and yields one ordered sequence of events:
//!
//! ```text
//! LineSource ─► parse (strict | tolerant) ─► hand filter ─┬─► Packet event   (packets | both)
//!                                                         └─► assembler ─► Frame event (frames | both)
//! ```
//!
//! Counters are kept in [`ClientStats`]; a structured log hook receives a
//! [`StreamLogEvent`] for every step.

mod client;
mod events;
mod options;

pub use client::{CallbackError, EventStream, HtsClient};
pub use events::{ClientStats, LogEventKind, StreamEvent, StreamLogEvent};
pub use options::{ErrorPolicy, HandFilter, StreamOutput};
