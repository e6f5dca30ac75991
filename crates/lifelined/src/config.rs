//! Daemon configuration: command-line flags with environment fallbacks.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use lifeline_common::LifelinePaths;
use lifeline_common::LifelineResult;
use lifeline_monitor::{DockerRuntime, MonitorConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, multi-line.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// lifelined - container lifecycle alerts.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// HTTP port for the configuration API
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind the configuration API to
    #[arg(long = "bind", env = "BIND_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_addr: IpAddr,

    /// Directory holding entities, channels and the audit log
    #[arg(long, env = "DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Docker Engine socket; `DOCKER_HOST` or the platform default when unset
    #[arg(long, env = "DOCKER_SOCKET")]
    pub docker_socket: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Wait after a start event before checking that the container still runs (ms)
    #[arg(long, env = "SETTLE_DELAY_MS", default_value_t = 2000)]
    pub settle_delay_ms: u64,

    /// Docker API request timeout (seconds)
    #[arg(long, env = "RUNTIME_TIMEOUT", default_value_t = 120)]
    pub runtime_timeout: u64,
}

impl Args {
    /// Address the API listens on.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Store layout under the data directory.
    #[must_use]
    pub fn paths(&self) -> LifelinePaths {
        LifelinePaths::with_root(&self.data_dir)
    }

    /// Docker client for the configured socket, or the local defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is unusable or no default exists.
    pub fn docker_runtime(&self) -> LifelineResult<DockerRuntime> {
        match &self.docker_socket {
            Some(socket) => DockerRuntime::connect(socket, self.runtime_timeout),
            None => DockerRuntime::connect_with_defaults(self.runtime_timeout),
        }
    }

    /// Monitor settings derived from the flags.
    #[must_use]
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::default().with_settle_delay(Duration::from_millis(self.settle_delay_ms))
    }
}
