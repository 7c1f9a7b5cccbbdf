//! Finite line sources: capture replay and in-memory lists.
//!
//! Drop-in replacements for the socket receivers when driving the client
//! from a recorded session or from tests.

use super::{LineSource, TransportError};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Replays HTS lines from a reader, one per text line, until EOF.
///
/// Lines are trimmed and blank lines skipped.
pub struct ReplayLineSource<R: BufRead + Send = BufReader<File>> {
    reader: R,
    opened: bool,
    finished: bool,
    lines_read: u64,
    running: Arc<AtomicBool>,
}

impl ReplayLineSource<BufReader<File>> {
    /// Replay a capture file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::info!("Replaying HTS capture from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead + Send> ReplayLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            opened: false,
            finished: false,
            lines_read: 0,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Non-blank lines delivered so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }
}

impl<R: BufRead + Send> LineSource for ReplayLineSource<R> {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.opened {
            return Err(TransportError::AlreadyOpen);
        }
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        if self.opened {
            log::debug!("Replay closed after {} lines", self.lines_read);
        }
        self.opened = false;
    }

    fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut raw = String::new();
        while self.opened && !self.finished && self.running.load(Ordering::Relaxed) {
            raw.clear();
            let n = self.reader.read_line(&mut raw).map_err(|e| match e.kind() {
                ErrorKind::InvalidData => TransportError::InvalidUtf8,
                _ => TransportError::Io(e),
            })?;
            if n == 0 {
                self.finished = true;
                break;
            }
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            self.lines_read += 1;
            return Ok(Some(line.to_string()));
        }
        Ok(None)
    }
}

/// A fixed list of lines, yielded verbatim.
#[derive(Debug, Clone, Default)]
pub struct MemoryLineSource {
    lines: VecDeque<String>,
    opened: bool,
}

impl MemoryLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            opened: false,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Lines not yet delivered.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for MemoryLineSource {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.opened {
            return Err(TransportError::AlreadyOpen);
        }
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        if !self.opened {
            return Ok(None);
        }
        Ok(self.lines.pop_front())
    }
}
