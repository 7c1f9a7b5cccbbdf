//! Options shared by the HTS command-line tools.

use clap::Args;
use hasta_io::config::AppConfig;
use hasta_io::transport::TransportMode;
use std::path::PathBuf;

/// Where to read HTS lines from. Unset options keep the config file value.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Transport: udp, tcp_server, tcp_client or replay
    #[arg(short, long)]
    pub transport: Option<TransportMode>,

    /// Bind address, or remote host for tcp_client
    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Receive timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Replay a capture file (implies --transport replay)
    #[arg(short, long)]
    pub replay: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn load(&self) -> hasta_io::Result<AppConfig> {
        let mut app = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        let client = &mut app.client;
        if let Some(path) = &self.replay {
            client.replay_path = Some(path.clone());
            client.transport = TransportMode::Replay;
        }
        if let Some(transport) = self.transport {
            client.transport = transport;
        }
        if let Some(host) = &self.host {
            client.host = host.clone();
        }
        if let Some(port) = self.port {
            client.port = port;
        }
        if let Some(timeout) = self.timeout {
            client.timeout_secs = timeout;
        }
        Ok(app)
    }
}

/// Count limit from the command line; 0 means no limit.
pub fn count_limit(max: usize) -> Option<usize> {
    (max > 0).then_some(max)
}
