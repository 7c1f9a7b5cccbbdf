//! End-to-end streaming over real loopback sockets.

use hasta_io::config::ClientConfig;
use hasta_io::streaming::{HtsClient, StreamEvent};
use hasta_io::transport::{
    LineSource, TcpServerConfig, TcpServerLineReceiver, TransportError, UdpLineReceiver,
    UdpReceiverConfig,
};
use hasta_io::{HandSide, Result};
use std::io::Write;
use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const WATCHDOG: Duration = Duration::from_secs(10);

/// Wraps a source that was opened up front so the test can learn its port.
struct PreOpened<S: LineSource>(S);

impl<S: LineSource> LineSource for PreOpened<S> {
    fn open(&mut self) -> std::result::Result<(), TransportError> {
        Ok(())
    }

    fn close(&mut self) {
        self.0.close();
    }

    fn next_line(&mut self) -> std::result::Result<Option<String>, TransportError> {
        self.0.next_line()
    }
}

fn wrist_line(side: &str) -> String {
    format!("{} wrist:, 0.1, 0.2, 0.3, 0, 0, 0, 1", side)
}

fn landmarks_line(side: &str) -> String {
    let values: Vec<String> = (0..63).map(|i| format!("{}", i as f64 * 0.01)).collect();
    format!("{} landmarks:, {}", side, values.join(", "))
}

/// Client whose single stream is `source`.
fn client_with(source: impl LineSource + 'static) -> HtsClient {
    let mut slot: Option<Box<dyn LineSource>> = Some(Box::new(PreOpened(source)));
    HtsClient::with_source_factory(ClientConfig::default(), move |_, _| {
        slot.take().ok_or_else(|| {
            hasta_io::Error::Transport(TransportError::Disconnected(
                "source already used".to_string(),
            ))
        })
    })
    .unwrap()
}

/// Clears `running` if the test has not finished in time.
fn watchdog(running: Arc<AtomicBool>) -> mpsc::Sender<()> {
    let (done_tx, done_rx) = mpsc::channel::<()>();
    thread::spawn(move || {
        if done_rx.recv_timeout(WATCHDOG).is_err() {
            running.store(false, Ordering::SeqCst);
        }
    });
    done_tx
}

fn collect_frames(client: &mut HtsClient, count: usize) -> Result<Vec<StreamEvent>> {
    let mut events = Vec::new();
    client.run(
        |event| {
            events.push(event);
            Ok(())
        },
        Some(count),
    )?;
    Ok(events)
}

#[test]
fn test_udp_datagram_with_two_lines_yields_frame() {
    let running = Arc::new(AtomicBool::new(true));
    let mut receiver = UdpLineReceiver::new(UdpReceiverConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        timeout: Duration::from_millis(100),
        ..UdpReceiverConfig::default()
    })
    .with_running(Arc::clone(&running));
    receiver.open().unwrap();
    let addr = receiver.local_addr().unwrap();
    let done = watchdog(Arc::clone(&running));

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    let datagram = format!("{}\n{}\n", wrist_line("Left"), landmarks_line("Left"));
    sender.send_to(datagram.as_bytes(), addr).unwrap();

    let mut client = client_with(receiver);
    let events = collect_frames(&mut client, 1).unwrap();
    let _ = done.send(());

    assert_eq!(events.len(), 1);
    let frame = events[0].as_frame().unwrap();
    assert_eq!(frame.side, HandSide::Left);
    assert_eq!(frame.frame_id, "hts_left_hand");
    assert_eq!(frame.sequence_id, 0);
    assert_eq!(client.stats().lines_received, 2);
}

fn send_tcp(addr: SocketAddr, lines: Vec<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        for line in lines {
            stream.write_all(line.as_bytes()).unwrap();
            stream.write_all(b"\n").unwrap();
        }
        stream.flush().unwrap();
    })
}

#[test]
fn test_tcp_server_merges_two_clients() {
    let running = Arc::new(AtomicBool::new(true));
    let mut receiver = TcpServerLineReceiver::new(TcpServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        accept_timeout: Duration::from_millis(200),
        read_timeout: Duration::from_millis(200),
        ..TcpServerConfig::default()
    })
    .with_running(Arc::clone(&running));
    receiver.open().unwrap();
    let addr = receiver.local_addr().unwrap();
    let done = watchdog(Arc::clone(&running));

    let left = send_tcp(addr, vec![wrist_line("Left"), landmarks_line("Left")]);
    let right = send_tcp(addr, vec![landmarks_line("Right"), wrist_line("Right")]);

    let mut client = client_with(receiver);
    let events = collect_frames(&mut client, 2).unwrap();
    let _ = done.send(());
    left.join().unwrap();
    right.join().unwrap();

    let mut sides: Vec<HandSide> = events
        .iter()
        .filter_map(StreamEvent::as_frame)
        .map(|f| f.side)
        .collect();
    sides.sort_by_key(|s| s.index());
    assert_eq!(sides, [HandSide::Left, HandSide::Right]);
    assert!(
        events
            .iter()
            .filter_map(StreamEvent::as_frame)
            .all(|f| f.sequence_id == 0)
    );
}

#[test]
fn test_tcp_server_stops_when_running_cleared() {
    let running = Arc::new(AtomicBool::new(true));
    let mut receiver = TcpServerLineReceiver::new(TcpServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        accept_timeout: Duration::from_millis(50),
        read_timeout: Duration::from_millis(50),
        ..TcpServerConfig::default()
    })
    .with_running(Arc::clone(&running));
    receiver.open().unwrap();

    running.store(false, Ordering::SeqCst);
    let mut client = client_with(receiver);
    let count = client.run(|_| Ok(()), None).unwrap();
    assert_eq!(count, 0);
}
