//! bigd: bounded-width concurrent funnel with cooperative cancellation

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::{PipelineError, TransformError};
pub use types::*;

pub use engine::transform::ItemTransformer;
pub use pipeline::{CancellationSignal, ErrorReport, Funnel, PipelineState, PipelineTuning};

use log::debug;
use std::path::Path;
use std::time::Duration;

use engine::gzip::GzipTransformer;
use engine::transform::Slowed;

/// Result alias used by public bigd API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Start a funnel over `items` with `width` workers running `transformer`.
///
/// Returns immediately. Iterate the returned [`Funnel`] for results (arrival order), then call
/// [`Funnel::finish`] to learn whether the run was canceled.
pub fn funnel<T: ItemTransformer>(
    items: Vec<WorkItem>,
    transformer: T,
    width: usize,
) -> Result<Funnel<T::Payload>> {
    pipeline::run_pipeline(items, transformer, &PipelineTuning::new(width))
}

/// Single entry point for the gzip use case: enumerate `dir` with `opts`, decompress every
/// selected file, and return `(results, summary)` once the funnel has closed.
///
/// Per-item failures are inside the results; `Err` means enumeration failed or the run
/// was canceled.
pub fn digest_dir(dir: &Path, opts: &Opts) -> Result<pipeline::CollectResults<Vec<u8>>> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    let items = engine::items_in(dir, &engine::EnumerateOpts::from(opts))?;
    let transformer = Slowed::new(GzipTransformer, opts.slow.unwrap_or(Duration::ZERO));
    pipeline::collect_results(items, transformer, &PipelineTuning::from(opts))
}
