//! CLI tool that prints assembled hand frames from an HTS stream.
//!
//! # Usage
//!
//! ```bash
//! # Listen for HTS on TCP port 8000
//! hts-stream --transport tcp_server --port 8000
//!
//! # Replay a capture, stop after 100 frames
//! hts-stream --replay capture.txt --max-frames 100
//! ```

mod common;

use clap::Parser;
use common::{SourceArgs, count_limit};
use hasta_io::streaming::{HtsClient, StreamEvent, StreamOutput};
use hasta_io::{HandFrame, JointName};
use std::sync::atomic::Ordering;

/// Print a summary line for every assembled hand frame
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    source: SourceArgs,

    /// Stop after this many frames (0 = until the source ends or Ctrl-C)
    #[arg(short, long, default_value_t = 0)]
    max_frames: usize,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = args.source.load()?;
    app.logging.init_logger();
    app.client.output = StreamOutput::Frames;

    log::info!(
        "Streaming HTS frames via {} on {}:{}",
        app.client.transport,
        app.client.host,
        app.client.port
    );
    let mut client = HtsClient::new(app.client)?;

    let running = client.shutdown_handle();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        running.store(false, Ordering::Relaxed);
    })?;

    let max_frames = count_limit(args.max_frames);
    let mut frames = 0;
    for event in client.events()? {
        if let StreamEvent::Frame(frame) = event? {
            println!("{}", summarize(&frame));
            frames += 1;
            if max_frames.is_some_and(|max| frames >= max) {
                break;
            }
        }
    }

    println!("{} frame(s) {}", frames, client.stats());
    Ok(())
}

fn summarize(frame: &HandFrame) -> String {
    let wrist = frame.wrist.position();
    let tip = frame.joint(JointName::IndexTip);
    format!(
        "seq={} side={} frame_id={} recv_ts_ns={} wrist=({:.3}, {:.3}, {:.3}) index_tip=({:.3}, {:.3}, {:.3}) landmarks={}",
        frame.sequence_id,
        frame.side,
        frame.frame_id,
        frame.recv_ts_ns,
        wrist[0],
        wrist[1],
        wrist[2],
        tip[0],
        tip[1],
        tip[2],
        frame.landmarks.points.len()
    )
}
