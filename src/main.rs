//! bigd CLI: decompress the .gz files in a directory with a fixed-width worker pool.

use anyhow::Result;
use bigd::engine::arg_parser::Cli;
use bigd::engine::handle_run;
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
