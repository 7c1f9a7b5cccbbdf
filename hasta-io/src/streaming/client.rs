//! Streaming client and its event iterator.

use super::events::{ClientStats, LogEventKind, StreamEvent, StreamLogEvent};
use super::options::ErrorPolicy;
use crate::assembly::{Clock, HandFrameAssembler, Stamps, SystemClock};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::protocol::parse_line;
use crate::transport::{self, LineSource};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Error type returned by `run` callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

type SourceFactory =
    Box<dyn FnMut(&ClientConfig, Arc<AtomicBool>) -> Result<Box<dyn LineSource>> + Send>;

type LogHook = Box<dyn FnMut(&StreamLogEvent) + Send>;

/// Streams HTS packets and assembled frames from a line source.
///
/// One assembler instance is shared across every stream opened by the
/// client, so sequence ids continue across `events()` calls.
///
/// # Example
/// ```no_run
/// use hasta_io::config::ClientConfig;
/// use hasta_io::streaming::{HtsClient, StreamEvent};
///
/// let mut client = HtsClient::new(ClientConfig::default())?;
/// for event in client.events()? {
///     if let StreamEvent::Frame(frame) = event? {
///         println!("{} seq={}", frame.side, frame.sequence_id);
///     }
/// }
/// # Ok::<(), hasta_io::Error>(())
/// ```
pub struct HtsClient<C: Clock = SystemClock> {
    config: ClientConfig,
    factory: SourceFactory,
    assembler: HandFrameAssembler<C>,
    stats: ClientStats,
    log_hook: Option<LogHook>,
    running: Arc<AtomicBool>,
}

impl HtsClient<SystemClock> {
    /// Client reading from the transport named in `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_source_factory(config, transport::build_source)
    }

    /// Client reading from sources built by `factory`.
    pub fn with_source_factory<F>(config: ClientConfig, factory: F) -> Result<Self>
    where
        F: FnMut(&ClientConfig, Arc<AtomicBool>) -> Result<Box<dyn LineSource>> + Send + 'static,
    {
        config.validate()?;
        let assembler = HandFrameAssembler::new(config.assembler_config());
        Ok(Self {
            config,
            factory: Box::new(factory),
            assembler,
            stats: ClientStats::default(),
            log_hook: None,
            running: Arc::new(AtomicBool::new(true)),
        })
    }
}

impl<C: Clock> HtsClient<C> {
    /// Replace the assembler clock. Assembly state starts fresh.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> HtsClient<C2> {
        HtsClient {
            assembler: HandFrameAssembler::with_clock(self.config.assembler_config(), clock),
            config: self.config,
            factory: self.factory,
            stats: self.stats,
            log_hook: self.log_hook,
            running: self.running,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn assembler(&self) -> &HandFrameAssembler<C> {
        &self.assembler
    }

    /// Current counters.
    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ClientStats::default();
    }

    /// Install a structured log hook, replacing any previous one.
    pub fn set_log_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&StreamLogEvent) + Send + 'static,
    {
        self.log_hook = Some(Box::new(hook));
    }

    /// Flag shared with socket sources; clearing it ends iteration at the
    /// next receive timeout.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Open a line source and stream events from it.
    pub fn events(&mut self) -> Result<EventStream<'_, C>> {
        let mut source = (self.factory)(&self.config, Arc::clone(&self.running))?;
        source.open()?;
        log::debug!(
            "Streaming from {} source ({:?} output)",
            self.config.transport,
            self.config.output
        );
        Ok(EventStream {
            client: self,
            source,
            pending: VecDeque::new(),
            done: false,
        })
    }

    /// Stream events into `callback` until the source ends or `max_events`
    /// callbacks have run. Returns the number of callback invocations.
    ///
    /// A failing callback stops the stream with `Error::Callback`.
    pub fn run<F>(&mut self, mut callback: F, max_events: Option<usize>) -> Result<usize>
    where
        F: FnMut(StreamEvent) -> std::result::Result<(), CallbackError>,
    {
        if max_events == Some(0) {
            return Ok(0);
        }

        let mut processed = 0;
        let mut events = self.events()?;
        while let Some(event) = events.next() {
            if let Err(e) = callback(event?) {
                let client = &mut *events.client;
                client.stats.callback_errors += 1;
                client.emit(|| {
                    StreamLogEvent::new(LogEventKind::CallbackError, "Callback failed.")
                        .with_error(&e)
                });
                log::debug!("Stream callback failed: {}", e);
                return Err(Error::Callback(e.to_string()));
            }

            processed += 1;
            events.client.stats.callbacks_invoked += 1;
            if max_events.is_some_and(|max| processed >= max) {
                break;
            }
        }
        Ok(processed)
    }

    fn emit<F: FnOnce() -> StreamLogEvent>(&mut self, build: F) {
        if let Some(hook) = self.log_hook.as_mut() {
            hook(&build());
        }
    }

    /// Run one line through parse, filter and assembly.
    fn process_line(&mut self, line: &str, out: &mut VecDeque<StreamEvent>) -> Result<()> {
        self.stats.lines_received += 1;
        self.emit(|| {
            StreamLogEvent::new(LogEventKind::ReceivedLine, "Received input line.").with_line(line)
        });

        let packet = match parse_line(line) {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.parse_errors += 1;
                self.stats.dropped_lines += 1;
                self.emit(|| {
                    StreamLogEvent::new(LogEventKind::ParseError, "Failed to parse input line.")
                        .with_line(line)
                        .with_error(&e)
                });
                log::debug!("Dropping unparseable line {:?}: {}", line, e);
                return match self.config.error_policy {
                    ErrorPolicy::Strict => Err(e.into()),
                    ErrorPolicy::Tolerant => Ok(()),
                };
            }
        };

        let side = packet.side();
        if !self.config.hand_filter.matches(side) {
            self.stats.packets_filtered += 1;
            self.stats.dropped_lines += 1;
            self.emit(|| {
                StreamLogEvent::new(
                    LogEventKind::FilteredPacket,
                    "Packet dropped due to hand filter.",
                )
                .with_side(side)
            });
            return Ok(());
        }

        if self.config.output.includes_packets() {
            self.stats.packets_emitted += 1;
            self.emit(|| {
                StreamLogEvent::new(LogEventKind::EmittedPacket, "Emitted packet event.")
                    .with_side(side)
            });
            out.push_back(StreamEvent::Packet(packet));
        }

        if self.config.output.includes_frames()
            && let Some(frame) = self.assembler.push_packet(packet, Stamps::default())
        {
            self.stats.frames_emitted += 1;
            self.emit(|| {
                StreamLogEvent::new(LogEventKind::EmittedFrame, "Emitted frame event.")
                    .with_side(side)
            });
            log::trace!("Frame {} seq={}", frame.frame_id, frame.sequence_id);
            out.push_back(StreamEvent::Frame(frame));
        }

        Ok(())
    }
}

/// Iterator over a client's events. Dropping it closes the line source.
///
/// After the first error (strict parse failure or transport error) the
/// iterator is exhausted.
pub struct EventStream<'a, C: Clock = SystemClock> {
    client: &'a mut HtsClient<C>,
    source: Box<dyn LineSource>,
    pending: VecDeque<StreamEvent>,
    done: bool,
}

impl<C: Clock> EventStream<'_, C> {
    /// Counters of the owning client.
    pub fn stats(&self) -> ClientStats {
        self.client.stats
    }

    /// Stop after the events already buffered and close the source.
    pub fn close(&mut self) {
        if !self.done {
            self.done = true;
            self.source.close();
        }
    }

    fn fail(&mut self, error: Error) -> Option<Result<StreamEvent>> {
        self.pending.clear();
        self.close();
        Some(Err(error))
    }
}

impl<C: Clock> Iterator for EventStream<'_, C> {
    type Item = Result<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }

            let line = match self.source.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.close();
                    return None;
                }
                Err(e) => return self.fail(e.into()),
            };

            if let Err(e) = self.client.process_line(&line, &mut self.pending) {
                return self.fail(e);
            }
        }
    }
}

impl<C: Clock> Drop for EventStream<'_, C> {
    fn drop(&mut self) {
        self.close();
    }
}
