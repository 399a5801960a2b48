use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use recomp_core::WatchCell;
use tracing::Level;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MovieFormat {
    /// Detect the dialect line by line.
    #[default]
    Auto,
    /// Strict FM2 (`version 3` header required).
    Fm2,
    /// Bare `RLDUTSBA` log.
    Bare,
}

/// Replays an input movie through the frame supervisor.
#[derive(Parser, Debug)]
#[command(name = "recomp", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the movie file
    #[arg(required = true)]
    pub movie: PathBuf,

    /// Movie dialect
    #[arg(long, value_enum, default_value_t = MovieFormat::Auto)]
    pub format: MovieFormat,

    /// Number of frames to run (defaults to the movie length)
    #[arg(short, long)]
    pub frames: Option<usize>,

    /// NMI handler timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Memory cell to include in the timeout snapshot, as `label=addr`. Repeatable.
    #[arg(short, long = "watch", value_name = "LABEL=ADDR")]
    pub watch: Vec<WatchCell>,

    /// Extra NMIs to suppress before the first delivery
    #[arg(long, default_value_t = 0)]
    pub skip: u32,

    /// Print one line per frame
    #[arg(long)]
    pub per_frame: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: Level,
}
