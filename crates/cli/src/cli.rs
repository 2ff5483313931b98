//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ToF Replay - replay VL53L8CH serial logs into a CSV record store
#[derive(Parser, Debug)]
#[command(
    name = "tof-replay",
    author,
    version,
    about = "ToF sensor log replay and acquisition pipeline",
    long_about = "Replays captured ToF serial logs (or a mock sensor) through the acquisition\n\
                  loop: every frame pair is echoed as a hex trace on stdout and its valid\n\
                  zones are appended to a CSV record store. Logs go to stderr."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TOF_REPLAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all logging except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TOF_REPLAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the acquisition loop
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Scan a log once and print per-zone statistics
    Inspect(InspectArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults are used without one
    #[arg(short, long, env = "TOF_REPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Replay log to read (overrides source.path)
    #[arg(long, env = "TOF_REPLAY_LOG")]
    pub log: Option<PathBuf>,

    /// CSV record store to append to (overrides sink.path)
    #[arg(short, long, env = "TOF_REPLAY_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Polling period in milliseconds (overrides acquisition.polling_interval_ms)
    #[arg(long, env = "TOF_REPLAY_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Stop after this many ticks (default: run until interrupted)
    #[arg(long, env = "TOF_REPLAY_MAX_TICKS")]
    pub max_ticks: Option<u64>,

    /// Frame source (overrides source.kind)
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Warn about every malformed frame instead of skipping silently
    #[arg(long)]
    pub strict: bool,

    /// Do not echo frames as hex on stdout
    #[arg(long)]
    pub no_trace: bool,

    /// Validate configuration and exit without running the loop
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "TOF_REPLAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, env = "TOF_REPLAY_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `inspect` command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Log file to scan
    #[arg(default_value = contracts::DEFAULT_REPLAY_PATH, env = "TOF_REPLAY_LOG")]
    pub log: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Warn about every malformed frame
    #[arg(long)]
    pub strict: bool,
}

/// Frame source selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceArg {
    /// Replay a captured serial log
    Replay,
    /// Deterministic mock sensor
    Mock,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
