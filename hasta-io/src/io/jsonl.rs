//! JSON Lines event log.
//!
//! One compact JSON object per line:
//!
//! ```text
//! {"event_type":"frame","logged_at_unix_ns":…,"data":{<frame mapping>}}
//! {"event_type":"packet","packet_type":"wrist","side":"Left","logged_at_unix_ns":…,"data":{"x":…,…,"qw":…}}
//! {"event_type":"packet","packet_type":"landmarks","side":"Right","logged_at_unix_ns":…,"data":{"points":[…]}}
//! ```

use crate::assembly::{Clock, SystemClock};
use crate::core::types::{
    HandFrame, HandLandmarks, HandSide, LandmarksPacket, PacketKind, ParsedPacket, WristPacket,
    WristPose,
};
use crate::error::{Error, Result};
use crate::streaming::StreamEvent;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Packet payload as stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PacketData {
    Wrist(WristPose),
    Landmarks(HandLandmarks),
}

/// One line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "lowercase")]
pub enum LoggedRecord {
    Frame {
        logged_at_unix_ns: i64,
        data: HandFrame,
    },
    Packet {
        packet_type: PacketKind,
        side: HandSide,
        logged_at_unix_ns: i64,
        data: PacketData,
    },
}

impl LoggedRecord {
    pub fn from_event(event: &StreamEvent, logged_at_unix_ns: i64) -> Self {
        match event {
            StreamEvent::Frame(frame) => LoggedRecord::Frame {
                logged_at_unix_ns,
                data: frame.clone(),
            },
            StreamEvent::Packet(ParsedPacket::Wrist(p)) => LoggedRecord::Packet {
                packet_type: PacketKind::Wrist,
                side: p.side,
                logged_at_unix_ns,
                data: PacketData::Wrist(p.data),
            },
            StreamEvent::Packet(ParsedPacket::Landmarks(p)) => LoggedRecord::Packet {
                packet_type: PacketKind::Landmarks,
                side: p.side,
                logged_at_unix_ns,
                data: PacketData::Landmarks(p.data),
            },
        }
    }

    pub fn logged_at_unix_ns(&self) -> i64 {
        match self {
            LoggedRecord::Frame {
                logged_at_unix_ns, ..
            }
            | LoggedRecord::Packet {
                logged_at_unix_ns, ..
            } => *logged_at_unix_ns,
        }
    }

    /// Rebuild the stream event. Fails if `packet_type` disagrees with the payload.
    pub fn to_event(&self) -> Result<StreamEvent> {
        match self {
            LoggedRecord::Frame { data, .. } => Ok(StreamEvent::Frame(data.clone())),
            LoggedRecord::Packet {
                packet_type,
                side,
                data,
                ..
            } => match (packet_type, data) {
                (PacketKind::Wrist, PacketData::Wrist(pose)) => {
                    Ok(StreamEvent::Packet(ParsedPacket::Wrist(WristPacket {
                        side: *side,
                        data: *pose,
                    })))
                }
                (PacketKind::Landmarks, PacketData::Landmarks(landmarks)) => {
                    Ok(StreamEvent::Packet(ParsedPacket::Landmarks(LandmarksPacket {
                        side: *side,
                        data: *landmarks,
                    })))
                }
                (kind, _) => Err(Error::Serialization(format!(
                    "{} record carries a mismatched payload",
                    kind
                ))),
            },
        }
    }
}

/// Appends stream events to a JSON Lines file.
///
/// # Example
///
/// ```no_run
/// use hasta_io::io::JsonlRecorder;
///
/// let mut recorder = JsonlRecorder::create("runs/hts.jsonl")?;
/// // recorder.record(&event)?;
/// let written = recorder.finish()?;
/// println!("wrote {} events", written);
/// # Ok::<(), hasta_io::Error>(())
/// ```
pub struct JsonlRecorder<C: Clock = SystemClock> {
    writer: BufWriter<File>,
    path: PathBuf,
    count: u64,
    clock: C,
}

impl JsonlRecorder<SystemClock> {
    /// Create (or truncate) `path`, making parent directories as needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_clock(path, SystemClock)
    }
}

impl<C: Clock> JsonlRecorder<C> {
    pub fn create_with_clock(path: impl AsRef<Path>, clock: C) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        log::info!("Recording events to {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            count: 0,
            clock,
        })
    }

    /// Append one event stamped with the current wall-clock time.
    pub fn record(&mut self, event: &StreamEvent) -> Result<()> {
        let record = LoggedRecord::from_event(event, self.clock.unix_time_ns());
        self.write_record(&record)
    }

    pub fn write_record(&mut self, record: &LoggedRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.count += 1;
        Ok(())
    }

    /// Records written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close; returns the number of records written.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        log::info!("Wrote {} events to {}", self.count, self.path.display());
        Ok(self.count)
    }
}

/// Read every record from a JSON Lines file. Blank lines are skipped.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<LoggedRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
