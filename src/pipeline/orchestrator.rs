use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, SendError, bounded};
use log::{debug, warn};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::engine::transform::ItemTransformer;
use crate::error::PipelineError;
use crate::pipeline;
use crate::types::{ItemResult, PipelineSummary, WorkItem};

use super::cancel::CancellationSignal;
use super::error_handler::{ErrorReport, check_error_report};
use super::tracker::{Lifecycle, PipelineHandles, PipelineState, cancel_and_join};

/// Handle to a running pipeline: the output stream plus cancel, error report and lifecycle.
///
/// Iterating yields results in arrival order and ends once every worker has exited. The
/// sequence is not restartable. Call [`finish`](Self::finish) to join and read the error
/// report; dropping an unfinished `Funnel` cancels the run and joins its threads.
pub struct Funnel<P = Vec<u8>> {
    results: Receiver<ItemResult<P>>,
    error_report: ErrorReport,
    cancel: CancellationSignal,
    lifecycle: Lifecycle,
    tracker: Option<JoinHandle<PipelineSummary>>,
    total: usize,
    width: usize,
}

impl<P> Iterator for Funnel<P> {
    type Item = ItemResult<P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.recv().ok()
    }
}

impl<P> Funnel<P> {
    /// A clone of the run's cancellation signal (e.g. for a Ctrl+C handler).
    pub fn canceller(&self) -> CancellationSignal {
        self.cancel.clone()
    }

    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }

    pub fn error_report(&self) -> &ErrorReport {
        &self.error_report
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn state(&self) -> PipelineState {
        self.lifecycle.state()
    }

    /// Number of enumerated items handed to the feeder.
    pub fn total_items(&self) -> usize {
        self.total
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Drain whatever is left in the stream, join the tracker, then check the error report.
    /// The report is read only after the stream has closed, so a late `Canceled` is never missed.
    pub fn finish(mut self) -> Result<PipelineSummary, PipelineError> {
        let discarded = self.results.iter().count();
        if discarded > 0 {
            debug!("finish: discarded {} unread results", discarded);
        }
        let mut summary = match self.tracker.take() {
            Some(h) => h.join().map_err(|_| PipelineError::TrackerPanicked)?,
            None => PipelineSummary::default(),
        };
        summary.discarded = discarded;
        check_error_report(&self.error_report)?;
        Ok(summary)
    }
}

impl<P> Drop for Funnel<P> {
    fn drop(&mut self) {
        if let Some(h) = self.tracker.take() {
            if self.lifecycle.state() != PipelineState::Closed {
                debug!("funnel dropped while {:?}; canceling", self.lifecycle.state());
                self.cancel.cancel();
            }
            if h.join().is_err() {
                warn!("completion tracker panicked");
            }
        }
    }
}

/// Start the feeder, `tuning.width` workers and the completion tracker.
/// Returns immediately; the caller consumes the returned [`Funnel`].
pub fn run_pipeline<T: ItemTransformer>(
    items: Vec<WorkItem>,
    transformer: T,
    tuning: &pipeline::PipelineTuning,
) -> Result<Funnel<T::Payload>> {
    tuning.validate()?;
    let pipeline::PipelineChannels {
        intake_tx,
        intake_rx,
        output_tx,
        output_rx,
        cancel,
        error_report,
        lifecycle,
    } = pipeline::create_pipeline_channels::<T::Payload>(tuning);
    let total = items.len();
    debug!("starting pipeline: {} items, width {}", total, tuning.width);
    lifecycle.advance(PipelineState::Running);

    let workers = match pipeline::spawn_workers(
        Arc::new(transformer),
        &intake_rx,
        &output_tx,
        &cancel,
        &lifecycle,
        tuning.width,
    ) {
        Ok(w) => w,
        Err(e) => {
            // spawn_workers already joined the workers it started.
            lifecycle.advance(PipelineState::Closed);
            return Err(e).context("spawn worker threads");
        }
    };
    // Workers hold the only intake receivers now; if they all die the feeder's send fails.
    drop(intake_rx);

    let feeder = match pipeline::spawn_feeder_thread(
        items,
        intake_tx,
        cancel.clone(),
        error_report.clone(),
        lifecycle.clone(),
    ) {
        Ok(h) => h,
        Err(e) => {
            cancel_and_join(None, workers, &cancel, &lifecycle, &error_report);
            return Err(e).context("spawn feeder thread");
        }
    };

    let (handles_tx, handles_rx) = bounded::<PipelineHandles>(1);
    let tracker = match pipeline::spawn_completion_tracker(
        handles_rx,
        output_tx,
        lifecycle.clone(),
        error_report.clone(),
    ) {
        Ok(h) => h,
        Err(e) => {
            cancel_and_join(Some(feeder), workers, &cancel, &lifecycle, &error_report);
            return Err(e).context("spawn completion tracker");
        }
    };
    if let Err(SendError((feeder, workers))) = handles_tx.send((feeder, workers)) {
        cancel_and_join(Some(feeder), workers, &cancel, &lifecycle, &error_report);
        if tracker.join().is_err() {
            warn!("completion tracker panicked");
        }
        anyhow::bail!("completion tracker exited before taking the pipeline threads");
    }

    Ok(Funnel {
        results: output_rx,
        error_report,
        cancel,
        lifecycle,
        tracker: Some(tracker),
        total,
        width: tuning.width,
    })
}

/// Run to completion and collect every result. Returns (results, summary).
/// A pipeline-level failure (e.g. canceled) is returned as the error.
pub fn collect_results<T: ItemTransformer>(
    items: Vec<WorkItem>,
    transformer: T,
    tuning: &pipeline::PipelineTuning,
) -> Result<pipeline::CollectResults<T::Payload>> {
    let mut funnel = run_pipeline(items, transformer, tuning)?;
    let results: Vec<_> = funnel.by_ref().collect();
    debug!(
        "main: output closed, total {} results (funnel drained)",
        results.len()
    );
    let summary = funnel.finish()?;
    Ok((results, summary))
}
