use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::DEFAULT_DIR;

/// Decompress every gzip file in a directory with a fixed-width worker pool.
#[derive(Clone, Debug, Parser)]
#[command(name = "bigd")]
#[command(about = "Concurrently decompress the .gz files in DIR and print each result.")]
pub struct Cli {
    /// Directory holding the files. Default: ./testdata
    #[arg(value_name = "DIR", default_value = DEFAULT_DIR)]
    pub dir: PathBuf,

    /// Number of concurrent workers (fixed for the run). Default: 16.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub width: Option<usize>,

    /// File extension to select, without the dot. Default: gz.
    #[arg(long = "ext")]
    pub extension: Option<String>,

    /// Exclude patterns (glob syntax) matched against file names. Can specify multiple: -e a* b?.gz
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Slow processing (sleep after each item) to make the concurrency visible.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub slow: Option<bool>,

    /// Write a JSON memory report to this file after the run.
    #[arg(long, value_name = "FILE")]
    pub profmem: Option<PathBuf>,

    /// Show a progress bar on stderr.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Exit non-zero when any item failed (every item is still processed).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
