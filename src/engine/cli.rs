//! CLI command handler: enumerate, funnel through the gzip workers, print each result.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::time::{Duration, Instant};

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::diagnostics::{RunCounts, memory_report, write_memory_report};
use crate::engine::enumerate::{EnumerateOpts, items_in};
use crate::engine::gzip::GzipTransformer;
use crate::engine::progress::{maybe_progress_bar, update_progress_bar};
use crate::engine::transform::Slowed;
use crate::pipeline::{PipelineTuning, run_pipeline};
use crate::utils::config::SLOW_DELAY;
use crate::utils::{apply_file_to_opts, load_bigd_toml, setup_logging};

/// Defaults, then `.bigd.toml` in DIR, then CLI flags.
pub fn resolve_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_bigd_toml(&cli.dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(w) = cli.width {
        opts.width = w;
    }
    if let Some(ref ext) = cli.extension {
        opts.extension = ext.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(slow) = cli.slow {
        opts.slow = slow.then_some(opts.slow.unwrap_or(SLOW_DELAY));
    }
    if cli.profmem.is_some() {
        opts.profmem = cli.profmem.clone();
    }
    if let Some(v) = cli.progress {
        opts.progress = v;
    }
    if let Some(v) = cli.strict {
        opts.strict = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts
}

/// Run the funnel over DIR. Per-item failures are printed with their item; a
/// pipeline-level failure (canceled) is returned as the error after the stream drains.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = resolve_opts(cli);
    setup_logging(opts.verbose);
    debug!("{} CONFIG: {:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let start = Instant::now();
    let items = items_in(&cli.dir, &EnumerateOpts::from(&opts))?;
    if items.is_empty() {
        info!(
            "No .{} files in {}",
            opts.extension.trim_start_matches('.'),
            cli.dir.display()
        );
    }

    let transformer = Slowed::new(GzipTransformer, opts.slow.unwrap_or(Duration::ZERO));
    let mut funnel = run_pipeline(items, transformer, &PipelineTuning::from(&opts))?;

    let cancel = funnel.canceller();
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .context("set Ctrl+C handler")?;

    let mut counts = RunCounts {
        width: funnel.width(),
        items: funnel.total_items(),
        ..Default::default()
    };
    let mut bar = maybe_progress_bar(opts.progress, funnel.total_items());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for r in funnel.by_ref() {
        counts.results += 1;
        let written = match &r.failure {
            None => writeln!(out, "{} {} -", r.item, r.text()),
            Some(err) => {
                counts.failures += 1;
                writeln!(out, "{} {} {}", r.item, r.text(), err)
            }
        };
        written.context("write result")?;
        if let Some(b) = bar.as_mut() {
            update_progress_bar(b, 1);
        }
    }
    out.flush().context("flush stdout")?;
    drop(out);

    let outcome = funnel.finish();
    debug!("funnel finished in {:?}: {:?}", start.elapsed(), outcome);

    if let Some(ref path) = opts.profmem {
        let report = memory_report(counts, start.elapsed())?;
        write_memory_report(path, &report)?;
    }

    outcome?;
    if counts.failures > 0 {
        warn!("{} of {} items failed", counts.failures, counts.results);
        if opts.strict {
            anyhow::bail!("strict mode: {} items failed", counts.failures);
        }
    }
    Ok(())
}
