//! Configuration for the HTS client and tools
//!
//! Loads configuration from a TOML file. Every field has a default, so a
//! file only needs the values it changes:
//!
//! ```toml
//! [client]
//! transport = "tcp_server"
//! port = 8000
//! output = "both"
//! hand_filter = "right"
//!
//! [logging]
//! level = "debug"
//! ```

use crate::assembly::{AssemblerConfig, DEFAULT_LEFT_FRAME_ID, DEFAULT_RIGHT_FRAME_ID};
use crate::error::{Error, Result};
use crate::streaming::{ErrorPolicy, HandFilter, StreamOutput};
use crate::transport::TransportMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

/// Streaming client configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Line source to read from
    pub transport: TransportMode,
    /// Bind address (udp, tcp_server) or remote host (tcp_client)
    pub host: String,
    pub port: u16,
    /// Receive timeout in seconds; also the connect timeout for tcp_client
    pub timeout_secs: f64,
    /// Pause between tcp_client reconnect attempts
    pub reconnect_delay_secs: f64,
    pub output: StreamOutput,
    pub hand_filter: HandFilter,
    pub error_policy: ErrorPolicy,
    /// Stamp frames with wall-clock receive time
    pub include_wall_time: bool,
    pub left_frame_id: String,
    pub right_frame_id: String,
    /// TCP: a connection is dropped once an unterminated line reaches this size
    pub max_line_bytes: usize,
    /// UDP receive buffer size
    pub max_datagram_size: usize,
    /// Capture file for the replay transport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportMode::Udp,
            host: "0.0.0.0".to_string(),
            port: 9000,
            timeout_secs: 1.0,
            reconnect_delay_secs: 0.25,
            output: StreamOutput::Frames,
            hand_filter: HandFilter::Both,
            error_policy: ErrorPolicy::Strict,
            include_wall_time: true,
            left_frame_id: DEFAULT_LEFT_FRAME_ID.to_string(),
            right_frame_id: DEFAULT_RIGHT_FRAME_ID.to_string(),
            max_line_bytes: 262_144,
            max_datagram_size: 65_535,
            replay_path: None,
        }
    }
}

impl ClientConfig {
    /// Check value ranges. Called eagerly when a client is built.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(Error::Config(format!(
                "timeout_secs must be greater than 0, got {}",
                self.timeout_secs
            )));
        }
        if !self.reconnect_delay_secs.is_finite() || self.reconnect_delay_secs < 0.0 {
            return Err(Error::Config(format!(
                "reconnect_delay_secs must be non-negative, got {}",
                self.reconnect_delay_secs
            )));
        }
        if self.max_line_bytes == 0 {
            return Err(Error::Config("max_line_bytes must be positive".to_string()));
        }
        if self.max_datagram_size == 0 {
            return Err(Error::Config(
                "max_datagram_size must be positive".to_string(),
            ));
        }
        if self.transport == TransportMode::Replay && self.replay_path.is_none() {
            return Err(Error::Config(
                "replay transport requires replay_path".to_string(),
            ));
        }
        Ok(())
    }

    /// Receive timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs).unwrap_or(Duration::from_secs(1))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.reconnect_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Assembler settings derived from this config.
    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            include_wall_time: self.include_wall_time,
            left_frame_id: self.left_frame_id.clone(),
            right_frame_id: self.right_frame_id.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout or stderr)
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: "stderr".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Install `env_logger` at the configured level. `RUST_LOG` still wins.
    pub fn init_logger(&self) {
        let mut builder = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.level.as_str()),
        );
        if self.output.eq_ignore_ascii_case("stdout") {
            builder.target(env_logger::Target::Stdout);
        } else {
            builder.target(env_logger::Target::Stderr);
        }
        if builder.try_init().is_err() {
            log::debug!("Logger already initialised");
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use hasta_io::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("hts.toml")?;
    /// # Ok::<(), hasta_io::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.client.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
