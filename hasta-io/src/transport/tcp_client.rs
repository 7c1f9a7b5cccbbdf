//! TCP client line receiver with reconnect.

use super::line_buffer::LineBuffer;
use super::{LineSource, TransportError, is_timeout_kind};
use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const READ_CHUNK_SIZE: usize = 4096;

/// TCP client receiver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TcpClientConfig {
    /// Remote host
    pub host: String,
    /// Remote port
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Pause between reconnect attempts during iteration
    pub reconnect_delay: Duration,
    /// Connection is dropped once an unterminated line reaches this size
    pub max_line_bytes: usize,
}

impl Default for TcpClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(1),
            reconnect_delay: Duration::from_millis(250),
            max_line_bytes: 262_144,
        }
    }
}

/// Receives HTS lines over an outbound TCP connection.
pub struct TcpClientLineReceiver {
    config: TcpClientConfig,
    stream: Option<TcpStream>,
    buffer: LineBuffer,
    /// Set between `open()` and `close()`; a dropped connection keeps it set
    opened: bool,
    running: Arc<AtomicBool>,
}

impl TcpClientLineReceiver {
    pub fn new(config: TcpClientConfig) -> Self {
        let buffer = LineBuffer::new(config.max_line_bytes);
        Self {
            config,
            stream: None,
            buffer,
            opened: false,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Share a running flag; iteration and reconnects stop once it is cleared.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn config(&self) -> &TcpClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn peer_addr(&self) -> Result<SocketAddr, TransportError> {
        let stream = self.stream.as_ref().ok_or(TransportError::NotOpen)?;
        Ok(stream.peer_addr()?)
    }

    fn connect(&self) -> Result<TcpStream, TransportError> {
        let addrs = (self.config.host.as_str(), self.config.port).to_socket_addrs()?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.config.read_timeout))?;
                    stream.set_nodelay(true)?;
                    log::info!("Connected to HTS server at {}", addr);
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => e.into(),
            None => TransportError::Disconnected(format!(
                "no address resolved for {}:{}",
                self.config.host, self.config.port
            )),
        })
    }

    fn drop_connection(&mut self) {
        self.stream = None;
        self.buffer.clear();
    }

    /// Receive one newline-terminated line.
    ///
    /// A closed or reset connection, or a line over the size limit, drops
    /// the connection and returns `Disconnected` / `LineTooLong`.
    pub fn recv_line(&mut self) -> Result<String, TransportError> {
        if self.stream.is_none() {
            return Err(TransportError::NotOpen);
        }

        loop {
            if let Some(line) = self.buffer.next_line() {
                return line;
            }

            if self.buffer.overflowed() {
                let limit = self.buffer.limit();
                self.drop_connection();
                return Err(TransportError::LineTooLong { limit });
            }

            let Some(stream) = self.stream.as_mut() else {
                return Err(TransportError::NotOpen);
            };

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match stream.read(&mut chunk) {
                Ok(0) => {
                    self.drop_connection();
                    return Err(TransportError::Disconnected(
                        "server closed the connection".to_string(),
                    ));
                }
                Ok(n) => self.buffer.extend(&chunk[..n]),
                Err(e) if is_timeout_kind(e.kind()) => return Err(TransportError::Timeout),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionReset
                            | ErrorKind::ConnectionAborted
                            | ErrorKind::BrokenPipe
                            | ErrorKind::UnexpectedEof
                    ) =>
                {
                    self.drop_connection();
                    return Err(TransportError::Disconnected(e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn wait_before_reconnect(&self) {
        std::thread::sleep(self.config.reconnect_delay);
    }
}

impl LineSource for TcpClientLineReceiver {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.opened {
            return Err(TransportError::AlreadyOpen);
        }
        let stream = self.connect()?;
        self.stream = Some(stream);
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        if self.opened {
            log::info!("TCP client receiver closed");
        }
        self.opened = false;
        self.drop_connection();
    }

    fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        while self.opened && self.running.load(Ordering::Relaxed) {
            if self.stream.is_none() {
                match self.connect() {
                    Ok(stream) => self.stream = Some(stream),
                    Err(e) => {
                        log::debug!("Reconnect failed: {}", e);
                        self.wait_before_reconnect();
                        continue;
                    }
                }
            }

            match self.recv_line() {
                Ok(line) => return Ok(Some(line)),
                Err(TransportError::Timeout) => continue,
                Err(e @ (TransportError::Disconnected(_) | TransportError::LineTooLong { .. })) => {
                    log::warn!("HTS connection lost ({}), reconnecting", e);
                    self.wait_before_reconnect();
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

impl Drop for TcpClientLineReceiver {
    fn drop(&mut self) {
        self.close();
    }
}
