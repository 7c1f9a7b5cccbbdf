//! UDP line receiver.
//!
//! Each datagram carries one or more newline-separated lines. Lines are
//! trimmed, blank lines dropped, and any extra lines queued for the
//! following calls.

use super::{LineSource, TransportError, is_timeout_kind};
use std::collections::VecDeque;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Largest payload a single UDP datagram can carry.
const MAX_UDP_PAYLOAD: usize = 65_535;

/// UDP receiver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct UdpReceiverConfig {
    /// Local bind address
    pub host: String,
    /// Local bind port (0 = OS-assigned)
    pub port: u16,
    /// Receive timeout
    pub timeout: Duration,
    /// Receive buffer size in bytes
    pub max_datagram_size: usize,
}

impl Default for UdpReceiverConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            timeout: Duration::from_secs(1),
            max_datagram_size: MAX_UDP_PAYLOAD,
        }
    }
}

/// Receives HTS lines over UDP.
pub struct UdpLineReceiver {
    config: UdpReceiverConfig,
    socket: Option<UdpSocket>,
    pending: VecDeque<String>,
    buffer: Vec<u8>,
    running: Arc<AtomicBool>,
}

impl UdpLineReceiver {
    pub fn new(config: UdpReceiverConfig) -> Self {
        Self {
            config,
            socket: None,
            pending: VecDeque::new(),
            buffer: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Share a running flag; iteration ends at the next timeout once it is cleared.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn config(&self) -> &UdpReceiverConfig {
        &self.config
    }

    /// Bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotOpen)?;
        Ok(socket.local_addr()?)
    }

    /// Receive the next non-blank line.
    ///
    /// Returns `Timeout` when nothing arrives in time and the queue is empty.
    pub fn recv_line(&mut self) -> Result<String, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotOpen)?;

        if let Some(line) = self.pending.pop_front() {
            return Ok(line);
        }

        loop {
            let (len, src) = match socket.recv_from(&mut self.buffer) {
                Ok(received) => received,
                Err(e) if is_timeout_kind(e.kind()) => return Err(TransportError::Timeout),
                Err(e) => return Err(e.into()),
            };

            let text =
                std::str::from_utf8(&self.buffer[..len]).map_err(|_| TransportError::InvalidUtf8)?;
            let mut lines = text
                .split(['\n', '\r'])
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string);

            let Some(first) = lines.next() else {
                continue;
            };
            self.pending.extend(lines);
            log::trace!("UDP datagram from {}: {} bytes", src, len);
            return Ok(first);
        }
    }
}

impl LineSource for UdpLineReceiver {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.socket.is_some() {
            return Err(TransportError::AlreadyOpen);
        }

        let socket = UdpSocket::bind((self.config.host.as_str(), self.config.port))?;
        socket.set_read_timeout(Some(self.config.timeout))?;
        self.buffer = vec![0u8; self.config.max_datagram_size];

        log::info!("UDP receiver bound to {}", socket.local_addr()?);
        self.socket = Some(socket);
        Ok(())
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            log::info!("UDP receiver closed");
        }
        self.pending.clear();
    }

    fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        while self.running.load(Ordering::Relaxed) && self.socket.is_some() {
            match self.recv_line() {
                Ok(line) => return Ok(Some(line)),
                Err(TransportError::Timeout) => continue,
                Err(TransportError::InvalidUtf8) => {
                    log::warn!("Skipping UDP datagram that is not valid UTF-8");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

impl Drop for UdpLineReceiver {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_receiver() -> UdpLineReceiver {
        let mut rx = UdpLineReceiver::new(UdpReceiverConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            timeout: Duration::from_millis(200),
            ..UdpReceiverConfig::default()
        });
        rx.open().unwrap();
        rx
    }

    #[test]
    fn test_not_open() {
        let mut rx = UdpLineReceiver::new(UdpReceiverConfig::default());
        assert!(matches!(rx.recv_line(), Err(TransportError::NotOpen)));
        assert!(matches!(rx.local_addr(), Err(TransportError::NotOpen)));
        assert_eq!(rx.next_line().unwrap(), None);
    }

    #[test]
    fn test_double_open_rejected() {
        let mut rx = loopback_receiver();
        assert!(matches!(rx.open(), Err(TransportError::AlreadyOpen)));
    }

    #[test]
    fn test_multi_line_datagram_is_queued() {
        let mut rx = loopback_receiver();
        let addr = rx.local_addr().unwrap();
        let tx = UdpSocket::bind("127.0.0.1:0").unwrap();
        tx.send_to(b"  first \n\n second\r\nthird\n", addr).unwrap();

        assert_eq!(rx.recv_line().unwrap(), "first");
        assert_eq!(rx.recv_line().unwrap(), "second");
        assert_eq!(rx.recv_line().unwrap(), "third");
        assert!(matches!(rx.recv_line(), Err(TransportError::Timeout)));
    }

    #[test]
    fn test_bare_carriage_return_splits_lines() {
        let mut rx = loopback_receiver();
        let addr = rx.local_addr().unwrap();
        assert_eq!(rx.config().port, 0);
        let tx = UdpSocket::bind("127.0.0.1:0").unwrap();
        tx.send_to(b"Left wrist:, 1\rRight wrist:, 2\r\r", addr).unwrap();

        assert_eq!(rx.recv_line().unwrap(), "Left wrist:, 1");
        assert_eq!(rx.recv_line().unwrap(), "Right wrist:, 2");
        assert!(matches!(rx.recv_line(), Err(TransportError::Timeout)));
    }

    #[test]
    fn test_iteration_skips_invalid_utf8() {
        let mut rx = loopback_receiver();
        let addr = rx.local_addr().unwrap();
        let tx = UdpSocket::bind("127.0.0.1:0").unwrap();
        tx.send_to(&[0xff, 0xfe, 0xfd], addr).unwrap();
        tx.send_to(b"ok", addr).unwrap();

        assert_eq!(rx.next_line().unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_running_flag_ends_iteration() {
        let running = Arc::new(AtomicBool::new(false));
        let mut rx = loopback_receiver().with_running(running);
        assert_eq!(rx.next_line().unwrap(), None);
    }

    #[test]
    fn test_close_clears_queue() {
        let mut rx = loopback_receiver();
        let addr = rx.local_addr().unwrap();
        let tx = UdpSocket::bind("127.0.0.1:0").unwrap();
        tx.send_to(b"a\nb", addr).unwrap();
        assert_eq!(rx.recv_line().unwrap(), "a");

        rx.close();
        assert_eq!(rx.next_line().unwrap(), None);
        assert!(matches!(rx.recv_line(), Err(TransportError::NotOpen)));
    }
}
