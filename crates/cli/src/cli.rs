//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// FieldNav - GNSS field navigation pipeline
#[derive(Parser, Debug)]
#[command(
    name = "fieldnav",
    author,
    version,
    about = "GNSS field navigation pipeline",
    long_about = "A field navigation pipeline for GNSS-equipped devices.\n\n\
                  Ingests position sentences from a serial/replay/mock transport, \n\
                  fuses inertial samples into a heading, projects the heading ray \n\
                  onto the viewport boundary, and publishes the direction segment \n\
                  to configured overlays."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FIELDNAV_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FIELDNAV_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the navigation pipeline
    Run(RunArgs),

    /// Validate a mission blueprint without running
    Validate(ValidateArgs),

    /// Display mission blueprint information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to mission blueprint (TOML or JSON)
    #[arg(short, long, default_value = "mission.toml", env = "FIELDNAV_CONFIG")]
    pub config: PathBuf,

    /// Override transport with file replay from this path
    #[arg(long, env = "FIELDNAV_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = recorded pace)
    #[arg(long, env = "FIELDNAV_REPLAY_SPEED")]
    pub speed: Option<f64>,

    /// Override the device channel carrying position sentences
    #[arg(long, env = "FIELDNAV_CHANNEL")]
    pub channel: Option<u8>,

    /// Maximum number of overlay updates to produce (0 = unlimited)
    #[arg(long, default_value = "0", env = "FIELDNAV_MAX_UPDATES")]
    pub max_updates: u64,

    /// Run duration in seconds (0 = until ctrl-c)
    #[arg(long, default_value = "0", env = "FIELDNAV_DURATION")]
    pub duration: u64,

    /// Maximum fix age in seconds before the overlay clears (0 = unbounded)
    #[arg(long, env = "FIELDNAV_MAX_FIX_AGE")]
    pub max_fix_age: Option<f64>,

    /// Validate blueprint and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "64", env = "FIELDNAV_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "FIELDNAV_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to mission blueprint to validate
    #[arg(short, long, default_value = "mission.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to mission blueprint
    #[arg(short, long, default_value = "mission.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show overlay configuration
    #[arg(long)]
    pub overlays: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
