//! Newline framing for stream transports.

use super::TransportError;

const INITIAL_CAPACITY: usize = 4096;

/// Accumulates raw bytes and yields complete `\n`-terminated lines.
///
/// Lines are decoded strictly as UTF-8 and trimmed. Blank lines are kept;
/// rejecting them is the parser's job.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
    max_line_bytes: usize,
}

impl LineBuffer {
    pub(crate) fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(INITIAL_CAPACITY.min(max_line_bytes)),
            max_line_bytes,
        }
    }

    pub(crate) fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete line, if any.
    pub(crate) fn next_line(&mut self) -> Option<Result<String, TransportError>> {
        let newline = self.buf.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.buf.drain(..=newline).collect();
        let line = match std::str::from_utf8(&raw[..newline]) {
            Ok(text) => Ok(text.trim().to_string()),
            Err(_) => Err(TransportError::InvalidUtf8),
        };
        Some(line)
    }

    /// True once the unterminated remainder reaches the line limit.
    pub(crate) fn overflowed(&self) -> bool {
        self.buf.len() >= self.max_line_bytes
    }

    pub(crate) fn limit(&self) -> usize {
        self.max_line_bytes
    }

    pub(crate) fn clear(&mut self) {
        self.buf.clear();
    }
}
