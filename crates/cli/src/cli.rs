//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Trajectory Recorder - replay a recorded trajectory and capture simulated sensor data
#[derive(Parser, Debug)]
#[command(
    name = "trajectory-recorder",
    author,
    version,
    about = "Replay a recorded trajectory through a simulator and record sensor readings",
    long_about = "Drives a simulated vehicle along a recorded trajectory, captures camera, \n\
                  range, RF-ranging and object readings at a fixed rate, and merges them \n\
                  with the input log into a single time-ordered output log."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TRAJECTORY_RECORDER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TRAJECTORY_RECORDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// 由 -v / -q 推出默认日志级别 (RUST_LOG 优先)
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay the trajectory and write the merged output log
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "replay.toml",
        env = "TRAJECTORY_RECORDER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the input trajectory log
    #[arg(short, long, env = "TRAJECTORY_RECORDER_INPUT")]
    pub input: Option<PathBuf>,

    /// Override the merged output log
    #[arg(short, long, env = "TRAJECTORY_RECORDER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Override the replay rate in Hz
    #[arg(long, env = "TRAJECTORY_RECORDER_RATE")]
    pub rate: Option<f64>,

    /// Maximum number of committed ticks (0 = unlimited)
    #[arg(long, default_value = "0", env = "TRAJECTORY_RECORDER_MAX_TICKS")]
    pub max_ticks: u64,

    /// Validate configuration and scan the input log, then exit without replaying
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TRAJECTORY_RECORDER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "replay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "replay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed sensor information
    #[arg(long)]
    pub sensors: bool,
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
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
