//! TCP server line receiver.
//!
//! Accepts any number of inbound HTS connections and merges their lines
//! into one ordered-per-connection stream.
//!
//! # Threads
//!
//! ```text
//!                 ┌──────────────┐ spawn  ┌──────────────┐
//! TcpListener ───►│ acceptor     │───────►│ reader (1/c) │──┐
//!                 └──────────────┘        └──────────────┘  │ ConnEvent
//!                                         ┌──────────────┐  ├──────────► recv_line()
//!                                         │ reader (1/c) │──┘ bounded channel
//!                                         └──────────────┘
//! ```
//!
//! Every thread polls the `open` flag at a short interval, so `close()`
//! stops them without touching the sockets from outside.

use super::line_buffer::LineBuffer;
use super::{LineSource, TransportError, is_timeout_kind};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::io::Read;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Poll interval for acceptor and reader threads.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lines buffered between reader threads and the consumer.
const LINE_CHANNEL_CAPACITY: usize = 1024;

const READ_CHUNK_SIZE: usize = 4096;

/// TCP server receiver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TcpServerConfig {
    /// Local bind address
    pub host: String,
    /// Local bind port (0 = OS-assigned)
    pub port: u16,
    /// Wait limit while no client is connected
    pub accept_timeout: Duration,
    /// Wait limit while at least one client is connected
    pub read_timeout: Duration,
    /// A client whose unterminated line reaches this size is dropped
    pub max_line_bytes: usize,
}

impl Default for TcpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            accept_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(1),
            max_line_bytes: 262_144,
        }
    }
}

/// Messages from connection threads to the consumer.
enum ConnEvent {
    Line(String),
    Invalid(TransportError),
    Closed(SocketAddr),
}

/// Live state of an open server.
struct ServerHandle {
    local_addr: SocketAddr,
    open: Arc<AtomicBool>,
    active_clients: Arc<AtomicUsize>,
    events: Receiver<ConnEvent>,
    acceptor: JoinHandle<()>,
}

/// Receives HTS lines from inbound TCP clients.
pub struct TcpServerLineReceiver {
    config: TcpServerConfig,
    server: Option<ServerHandle>,
    running: Arc<AtomicBool>,
}

impl TcpServerLineReceiver {
    pub fn new(config: TcpServerConfig) -> Self {
        Self {
            config,
            server: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Share a running flag; iteration ends at the next timeout once it is cleared.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn config(&self) -> &TcpServerConfig {
        &self.config
    }

    /// Bound listening address.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.server
            .as_ref()
            .map(|s| s.local_addr)
            .ok_or(TransportError::NotOpen)
    }

    /// Number of currently connected clients.
    pub fn active_clients(&self) -> usize {
        self.server
            .as_ref()
            .map_or(0, |s| s.active_clients.load(Ordering::SeqCst))
    }

    /// Receive one line from any connected client.
    ///
    /// Waits `accept_timeout` while nobody is connected and `read_timeout`
    /// otherwise. Returns `Disconnected` when the last client leaves.
    pub fn recv_line(&mut self) -> Result<String, TransportError> {
        let server = self.server.as_ref().ok_or(TransportError::NotOpen)?;

        loop {
            let timeout = if server.active_clients.load(Ordering::SeqCst) == 0 {
                self.config.accept_timeout
            } else {
                self.config.read_timeout
            };

            match server.events.recv_timeout(timeout) {
                Ok(ConnEvent::Line(line)) => return Ok(line),
                Ok(ConnEvent::Invalid(e)) => return Err(e),
                Ok(ConnEvent::Closed(peer)) => {
                    log::debug!("TCP client {} disconnected", peer);
                    if server.active_clients.load(Ordering::SeqCst) == 0 {
                        return Err(TransportError::Disconnected(format!(
                            "client {} disconnected",
                            peer
                        )));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Err(TransportError::Timeout),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(TransportError::Disconnected(
                        "acceptor stopped".to_string(),
                    ));
                }
            }
        }
    }
}

impl LineSource for TcpServerLineReceiver {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.server.is_some() {
            return Err(TransportError::AlreadyOpen);
        }

        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let open = Arc::new(AtomicBool::new(true));
        let active_clients = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = bounded(LINE_CHANNEL_CAPACITY);

        let acceptor = {
            let open = Arc::clone(&open);
            let running = Arc::clone(&self.running);
            let active = Arc::clone(&active_clients);
            let max_line_bytes = self.config.max_line_bytes;
            thread::Builder::new()
                .name("hts-tcp-accept".to_string())
                .spawn(move || accept_loop(listener, tx, open, running, active, max_line_bytes))?
        };

        log::info!("TCP server listening on {}", local_addr);
        self.server = Some(ServerHandle {
            local_addr,
            open,
            active_clients,
            events: rx,
            acceptor,
        });
        Ok(())
    }

    fn close(&mut self) {
        let Some(server) = self.server.take() else {
            return;
        };
        server.open.store(false, Ordering::SeqCst);
        // Unblock readers waiting on a full channel.
        drop(server.events);
        if server.acceptor.join().is_err() {
            log::warn!("TCP acceptor thread panicked");
        }
        log::info!("TCP server on {} closed", server.local_addr);
    }

    fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        while self.running.load(Ordering::Relaxed) && self.server.is_some() {
            match self.recv_line() {
                Ok(line) => return Ok(Some(line)),
                Err(TransportError::Timeout) | Err(TransportError::Disconnected(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

impl Drop for TcpServerLineReceiver {
    fn drop(&mut self) {
        self.close();
    }
}

fn accept_loop(
    listener: TcpListener,
    tx: Sender<ConnEvent>,
    open: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    max_line_bytes: usize,
) {
    let mut readers: Vec<JoinHandle<()>> = Vec::new();

    while open.load(Ordering::SeqCst) && running.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = prepare_stream(&stream) {
                    log::warn!("Rejecting TCP client {}: {}", peer, e);
                    continue;
                }
                log::debug!("TCP client connected: {}", peer);
                active.fetch_add(1, Ordering::SeqCst);

                let tx = tx.clone();
                let open = Arc::clone(&open);
                let active = Arc::clone(&active);
                let spawned = thread::Builder::new()
                    .name(format!("hts-tcp-{}", peer))
                    .spawn(move || {
                        read_loop(stream, peer, &tx, &open, max_line_bytes);
                        active.fetch_sub(1, Ordering::SeqCst);
                        let _ = tx.send(ConnEvent::Closed(peer));
                    });
                match spawned {
                    Ok(handle) => readers.push(handle),
                    Err(e) => {
                        log::warn!("Failed to spawn reader for {}: {}", peer, e);
                    }
                }
            }
            Err(e) if is_timeout_kind(e.kind()) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                log::warn!("TCP accept failed: {}", e);
                thread::sleep(POLL_INTERVAL);
            }
        }
        readers.retain(|h| !h.is_finished());
    }

    open.store(false, Ordering::SeqCst);
    drop(tx);
    for handle in readers {
        let _ = handle.join();
    }
    log::debug!("TCP acceptor stopped");
}

fn prepare_stream(stream: &TcpStream) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;
    stream.set_nodelay(true)
}

/// Pump one connection into the channel until EOF, error, or shutdown.
fn read_loop(
    mut stream: TcpStream,
    peer: SocketAddr,
    tx: &Sender<ConnEvent>,
    open: &AtomicBool,
    max_line_bytes: usize,
) {
    let mut buffer = LineBuffer::new(max_line_bytes);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    while open.load(Ordering::SeqCst) {
        let n = match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) if is_timeout_kind(e.kind()) => continue,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("TCP client {} read error: {}", peer, e);
                return;
            }
        };

        buffer.extend(&chunk[..n]);
        while let Some(line) = buffer.next_line() {
            let event = match line {
                Ok(line) => ConnEvent::Line(line),
                Err(e) => ConnEvent::Invalid(e),
            };
            if tx.send(event).is_err() {
                return;
            }
        }

        if buffer.overflowed() {
            log::warn!(
                "Dropping TCP client {}: line exceeded {} bytes",
                peer,
                buffer.limit()
            );
            return;
        }
    }
}
