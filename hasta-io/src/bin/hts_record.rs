//! CLI tool for recording an HTS stream to a JSON Lines file.
//!
//! # Usage
//!
//! ```bash
//! # Record packets and frames until Ctrl-C
//! hts-record --transport tcp_server --port 8000 --path runs/hand_tracking.jsonl
//!
//! # Record the first 500 frames only
//! hts-record --output frames --max-events 500
//! ```

mod common;

use clap::{Parser, ValueEnum};
use common::{SourceArgs, count_limit};
use hasta_io::io::JsonlRecorder;
use hasta_io::streaming::{HtsClient, StreamOutput};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputArg {
    Packets,
    Frames,
    Both,
}

impl From<OutputArg> for StreamOutput {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Packets => StreamOutput::Packets,
            OutputArg::Frames => StreamOutput::Frames,
            OutputArg::Both => StreamOutput::Both,
        }
    }
}

/// Record HTS packets and frames to JSON Lines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    source: SourceArgs,

    /// Events to record
    #[arg(short, long, value_enum, default_value_t = OutputArg::Both)]
    output: OutputArg,

    /// Output file; parent directories are created
    #[arg(long, default_value = "runs/hand_tracking.jsonl")]
    path: PathBuf,

    /// Stop after this many events (0 = until the source ends or Ctrl-C)
    #[arg(short, long, default_value_t = 0)]
    max_events: usize,
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
    app.client.output = args.output.into();

    let mut client = HtsClient::new(app.client)?;
    let running = client.shutdown_handle();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        running.store(false, Ordering::Relaxed);
    })?;

    let mut recorder = JsonlRecorder::create(&args.path)?;
    let max_events = count_limit(args.max_events);

    println!("Recording to {}... (Ctrl-C to stop)", args.path.display());
    let result = client.run(
        |event| recorder.record(&event).map_err(Into::into),
        max_events,
    );
    // Keep what was written even if the stream failed.
    let written = recorder.finish()?;
    let stats = client.stats();
    println!(
        "wrote {} event(s) to {} frames_emitted={} packets_emitted={} parse_errors={} dropped_lines={}",
        written,
        args.path.display(),
        stats.frames_emitted,
        stats.packets_emitted,
        stats.parse_errors,
        stats.dropped_lines
    );
    result?;
    Ok(())
}
