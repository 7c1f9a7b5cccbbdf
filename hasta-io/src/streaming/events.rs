//! Stream events, counters and log hook payloads.

use crate::core::types::{HandFrame, HandSide, ParsedPacket};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One item of the client's output sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Packet(ParsedPacket),
    Frame(HandFrame),
}

impl StreamEvent {
    pub fn side(&self) -> HandSide {
        match self {
            StreamEvent::Packet(p) => p.side(),
            StreamEvent::Frame(f) => f.side,
        }
    }

    pub fn as_frame(&self) -> Option<&HandFrame> {
        match self {
            StreamEvent::Frame(f) => Some(f),
            StreamEvent::Packet(_) => None,
        }
    }

    pub fn as_packet(&self) -> Option<&ParsedPacket> {
        match self {
            StreamEvent::Packet(p) => Some(p),
            StreamEvent::Frame(_) => None,
        }
    }
}

/// Snapshot of client counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStats {
    pub lines_received: u64,
    pub parse_errors: u64,
    /// Parse failures plus filtered packets
    pub dropped_lines: u64,
    pub packets_filtered: u64,
    pub packets_emitted: u64,
    pub frames_emitted: u64,
    pub callbacks_invoked: u64,
    pub callback_errors: u64,
}

impl fmt::Display for ClientStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lines={} parse_errors={} dropped={} filtered={} packets={} frames={} callbacks={} callback_errors={}",
            self.lines_received,
            self.parse_errors,
            self.dropped_lines,
            self.packets_filtered,
            self.packets_emitted,
            self.frames_emitted,
            self.callbacks_invoked,
            self.callback_errors
        )
    }
}

/// Kind of a [`StreamLogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEventKind {
    ReceivedLine,
    ParseError,
    FilteredPacket,
    EmittedPacket,
    EmittedFrame,
    CallbackError,
}

impl LogEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogEventKind::ReceivedLine => "received_line",
            LogEventKind::ParseError => "parse_error",
            LogEventKind::FilteredPacket => "filtered_packet",
            LogEventKind::EmittedPacket => "emitted_packet",
            LogEventKind::EmittedFrame => "emitted_frame",
            LogEventKind::CallbackError => "callback_error",
        }
    }
}

impl fmt::Display for LogEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured event handed to the client's log hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLogEvent {
    pub kind: LogEventKind,
    pub message: &'static str,
    pub side: Option<HandSide>,
    /// Raw input line, for line-level events
    pub line: Option<String>,
    /// Rendered error, for failure events
    pub error: Option<String>,
}

impl StreamLogEvent {
    pub fn new(kind: LogEventKind, message: &'static str) -> Self {
        Self {
            kind,
            message,
            side: None,
            line: None,
            error: None,
        }
    }

    pub fn with_side(mut self, side: HandSide) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_line(mut self, line: &str) -> Self {
        self.line = Some(line.to_string());
        self
    }

    pub fn with_error(mut self, error: impl fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_kind_names() {
        assert_eq!(LogEventKind::ReceivedLine.to_string(), "received_line");
        assert_eq!(
            serde_json::to_string(&LogEventKind::CallbackError).unwrap(),
            "\"callback_error\""
        );
    }

    #[test]
    fn test_stats_display() {
        let stats = ClientStats {
            lines_received: 3,
            frames_emitted: 1,
            ..ClientStats::default()
        };
        let text = stats.to_string();
        assert!(text.starts_with("lines=3 "));
        assert!(text.contains("frames=1"));
    }
}
