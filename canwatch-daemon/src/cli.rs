//! CLI argument definitions for canwatch-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use canwatch_core::config::CanwatchConfig;

/// canwatch CAN intrusion detection control daemon.
///
/// Starts and stops the external detector script and serves the
/// alerts it writes over a small HTTP API.
#[derive(Parser, Debug)]
#[command(name = "canwatch-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to canwatch.toml configuration file.
    ///
    /// When omitted, built-in defaults plus `CANWATCH_*` environment
    /// variables are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the control API port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Validate configuration and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut CanwatchConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(port) = self.port {
            config.api.port = port;
        }
    }
}
