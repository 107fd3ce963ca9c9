//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use observability::LogFormat;
use std::path::PathBuf;

/// Haptic Bridge - routes OSC avatar parameters to haptic output modules
#[derive(Parser, Debug)]
#[command(
    name = "haptic-bridge",
    author,
    version,
    about = "OSC to haptics routing engine",
    long_about = "Listens for OSC messages over UDP, matches them against configured contacts,\n\
                  applies cooldown / edge gating and range mapping, and dispatches the\n\
                  resulting intensity to output modules."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HAPTIC_BRIDGE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (json | pretty | compact)
    #[arg(long, default_value = "pretty", global = true, env = "HAPTIC_BRIDGE_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bridge
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Print OSC addresses seen on the sniff port
    Sniff(SniffArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (JSON or TOML)
    #[arg(short, long, default_value = "user_config.json", env = "HAPTIC_BRIDGE_CONFIG")]
    pub config: PathBuf,

    /// Override the OSC listen port from configuration
    #[arg(long, env = "HAPTIC_BRIDGE_PORT")]
    pub port: Option<u16>,

    /// Override the dispatcher worker count from configuration
    #[arg(long, env = "HAPTIC_BRIDGE_WORKERS")]
    pub workers: Option<usize>,

    /// Stop after this many seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0", env = "HAPTIC_BRIDGE_TIMEOUT")]
    pub timeout: u64,

    /// Log routing statistics every N seconds (0 = only at exit)
    #[arg(long, default_value = "0", env = "HAPTIC_BRIDGE_STATS_INTERVAL")]
    pub stats_interval: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (overrides configuration)
    #[arg(long, env = "HAPTIC_BRIDGE_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "user_config.json", env = "HAPTIC_BRIDGE_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "user_config.json", env = "HAPTIC_BRIDGE_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show every binding
    #[arg(long)]
    pub bindings: bool,

    /// Show module configuration
    #[arg(long)]
    pub modules: bool,

    /// Write contacts and bindings to this file (.json / .toml)
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Arguments for the `sniff` command
#[derive(Parser, Debug)]
pub struct SniffArgs {
    /// Configuration file providing `app_settings.sniff_port`
    #[arg(short, long, env = "HAPTIC_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides configuration, default 9002)
    #[arg(long, env = "HAPTIC_BRIDGE_SNIFF_PORT")]
    pub port: Option<u16>,

    /// Only show addresses containing this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Refresh interval in milliseconds
    #[arg(long, default_value = "500")]
    pub interval_ms: u64,

    /// Stop after this many seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0")]
    pub duration: u64,
}
