//! Line sources.
//!
//! Every transport delivers the same thing to the rest of the crate: a
//! blocking, pull-based sequence of text lines. Socket details stay here.
//!
//! ```text
//! ┌─────────────────────┐
//! │ UdpLineReceiver     │  datagram → 1..n lines
//! │ TcpServerLineRecv.  │  n inbound clients → reader threads → channel
//! │ TcpClientLineRecv.  │  outbound connection, reconnects
//! │ ReplayLineSource    │  BufRead (capture file)
//! │ MemoryLineSource    │  Vec<String>
//! └─────────┬───────────┘
//!           ▼ LineSource::next_line()
//!      HtsClient / user loop
//! ```
//!
//! `recv_line()` on the socket sources surfaces every timeout and
//! disconnect. `next_line()` applies the source's iteration policy on top
//! (skip timeouts, reconnect, ...) and returns `Ok(None)` once the source
//! is closed, exhausted, or the shared running flag is cleared.

mod line_buffer;
mod replay;
mod tcp_client;
mod tcp_server;
mod udp;

pub use replay::{MemoryLineSource, ReplayLineSource};
pub use tcp_client::{TcpClientConfig, TcpClientLineReceiver};
pub use tcp_server::{TcpServerConfig, TcpServerLineReceiver};
pub use udp::{UdpLineReceiver, UdpReceiverConfig};

use crate::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Minimum wait for the first inbound connection in `tcp_server` mode.
pub const MIN_TCP_SERVER_ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Read attempted before `open`
    #[error("Line source is not open")]
    NotOpen,

    /// `open` called twice
    #[error("Line source is already open")]
    AlreadyOpen,

    /// Nothing arrived within the receive timeout
    #[error("Timed out waiting for data")]
    Timeout,

    /// Peer closed the connection or the source ended
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// Unterminated line grew past `max_line_bytes`
    #[error("Buffered line exceeded {limit} bytes")]
    LineTooLong { limit: usize },

    /// Payload bytes are not UTF-8
    #[error("Received data is not valid UTF-8")]
    InvalidUtf8,

    /// Underlying socket or file error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True for errors that just mean "nothing arrived in time".
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Timeout => true,
            TransportError::Io(e) => is_timeout_kind(e.kind()),
            _ => false,
        }
    }
}

pub(crate) fn is_timeout_kind(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

/// A blocking producer of text lines.
pub trait LineSource: Send {
    /// Acquire the underlying resource (bind, connect, open file).
    fn open(&mut self) -> Result<(), TransportError>;

    /// Release the resource. Idempotent.
    fn close(&mut self);

    /// Next line under this source's iteration policy.
    ///
    /// `Ok(None)` ends the stream.
    fn next_line(&mut self) -> Result<Option<String>, TransportError>;

    /// Borrow the source as an iterator of lines.
    fn lines(&mut self) -> Lines<'_, Self>
    where
        Self: Sized,
    {
        Lines { source: self }
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn open(&mut self) -> Result<(), TransportError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        (**self).next_line()
    }
}

/// Iterator over a borrowed [`LineSource`]. Errors are yielded as they occur.
pub struct Lines<'a, S: LineSource> {
    source: &'a mut S,
}

impl<S: LineSource> Iterator for Lines<'_, S> {
    type Item = Result<String, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_line().transpose()
    }
}

/// Network (or file) transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Udp,
    TcpServer,
    TcpClient,
    Replay,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Udp => "udp",
            TransportMode::TcpServer => "tcp_server",
            TransportMode::TcpClient => "tcp_client",
            TransportMode::Replay => "replay",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "udp" => Ok(TransportMode::Udp),
            "tcp_server" => Ok(TransportMode::TcpServer),
            "tcp_client" => Ok(TransportMode::TcpClient),
            "replay" => Ok(TransportMode::Replay),
            other => Err(format!(
                "unknown transport '{}' (expected udp, tcp_server, tcp_client or replay)",
                other
            )),
        }
    }
}

/// Build the line source described by `config`.
///
/// Socket sources stop iterating once `running` is cleared.
pub fn build_source(
    config: &ClientConfig,
    running: Arc<AtomicBool>,
) -> crate::error::Result<Box<dyn LineSource>> {
    let source: Box<dyn LineSource> = match config.transport {
        TransportMode::Udp => Box::new(
            UdpLineReceiver::new(UdpReceiverConfig {
                host: config.host.clone(),
                port: config.port,
                timeout: config.timeout(),
                max_datagram_size: config.max_datagram_size,
            })
            .with_running(running),
        ),
        TransportMode::TcpServer => Box::new(
            TcpServerLineReceiver::new(TcpServerConfig {
                host: config.host.clone(),
                port: config.port,
                accept_timeout: config.timeout().max(MIN_TCP_SERVER_ACCEPT_TIMEOUT),
                read_timeout: config.timeout(),
                max_line_bytes: config.max_line_bytes,
            })
            .with_running(running),
        ),
        TransportMode::TcpClient => Box::new(
            TcpClientLineReceiver::new(TcpClientConfig {
                host: config.host.clone(),
                port: config.port,
                connect_timeout: config.timeout(),
                read_timeout: config.timeout(),
                reconnect_delay: config.reconnect_delay(),
                max_line_bytes: config.max_line_bytes,
            })
            .with_running(running),
        ),
        TransportMode::Replay => {
            let path = config.replay_path.as_ref().ok_or_else(|| {
                crate::error::Error::Config("replay transport requires replay_path".to_string())
            })?;
            Box::new(ReplayLineSource::from_path(path)?.with_running(running))
        }
    };
    Ok(source)
}
