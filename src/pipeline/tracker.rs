//! Completion tracker and the explicit pipeline lifecycle.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crate::error::PipelineError;
use crate::types::{ItemResult, PipelineSummary};

use super::cancel::CancellationSignal;
use super::error_handler::ErrorReport;

/// Externally observed pipeline state. Only ever moves forward.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Idle = 0,
    Running = 1,
    /// Intake closed (exhausted or canceled); workers finishing in-flight items.
    Draining = 2,
    /// Every pipeline thread exited and the output stream is closed.
    Closed = 3,
}

impl PipelineState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Closed,
        }
    }
}

/// Shared lifecycle: current state plus the number of live worker threads.
#[derive(Clone, Debug)]
pub struct Lifecycle {
    state: Arc<AtomicU8>,
    live_workers: Arc<AtomicUsize>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PipelineState::Idle as u8)),
            live_workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn state(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `to` unless already there or past it. Returns true if the state changed.
    pub fn advance(&self, to: PipelineState) -> bool {
        let prev = self.state.fetch_max(to as u8, Ordering::AcqRel);
        let moved = prev < to as u8;
        if moved {
            debug!(
                "pipeline {:?} -> {:?}",
                PipelineState::from_u8(prev),
                to
            );
        }
        moved
    }

    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::Acquire)
    }

    /// Count a worker as live. The returned guard must move into the worker thread;
    /// dropping it (normal exit or unwind) marks the worker gone.
    pub(crate) fn register_worker(&self) -> WorkerGuard {
        self.live_workers.fetch_add(1, Ordering::AcqRel);
        WorkerGuard {
            live_workers: Arc::clone(&self.live_workers),
        }
    }
}

pub(crate) struct WorkerGuard {
    live_workers: Arc<AtomicUsize>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.live_workers.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Feeder and worker handles, handed to the tracker once it is running.
pub type PipelineHandles = (JoinHandle<usize>, Vec<JoinHandle<usize>>);

/// Spawn the tracker. It waits on `handles_rx` for the feeder and worker handles, joins
/// them all, then closes the output stream by dropping the last sender. The stream
/// therefore ends exactly once, after all publishers are gone, and the error report is
/// final by the time the consumer sees the end.
///
/// The handles travel over a channel so that a failed spawn leaves them with the caller.
pub fn spawn_completion_tracker<P: Send + 'static>(
    handles_rx: Receiver<PipelineHandles>,
    output_tx: Sender<ItemResult<P>>,
    lifecycle: Lifecycle,
    error_report: ErrorReport,
) -> io::Result<JoinHandle<PipelineSummary>> {
    thread::Builder::new()
        .name(format!("{}-tracker", env!("CARGO_PKG_NAME")))
        .spawn(move || {
            let summary = match handles_rx.recv() {
                Ok((feeder, workers)) => join_all(Some(feeder), workers, &error_report),
                Err(_) => PipelineSummary::default(),
            };
            close(output_tx, &lifecycle, &summary);
            summary
        })
}

/// Cancel the run and join threads that no tracker owns, then mark the pipeline Closed.
/// Used when the pipeline cannot be fully started.
pub fn cancel_and_join(
    feeder: Option<JoinHandle<usize>>,
    workers: Vec<JoinHandle<usize>>,
    cancel: &CancellationSignal,
    lifecycle: &Lifecycle,
    error_report: &ErrorReport,
) -> PipelineSummary {
    cancel.cancel();
    let summary = join_all(feeder, workers, error_report);
    lifecycle.advance(PipelineState::Closed);
    debug!(
        "aborted start: {} workers joined, {} dispatched",
        summary.workers, summary.dispatched
    );
    summary
}

fn join_all(
    feeder: Option<JoinHandle<usize>>,
    workers: Vec<JoinHandle<usize>>,
    error_report: &ErrorReport,
) -> PipelineSummary {
    let mut summary = PipelineSummary::default();
    match feeder.map(JoinHandle::join) {
        Some(Ok(n)) => summary.dispatched = n,
        Some(Err(_)) => {
            warn!("feeder thread panicked");
            error_report.report(PipelineError::FeederPanicked);
        }
        None => {}
    }
    for handle in workers {
        summary.workers += 1;
        match handle.join() {
            Ok(n) => summary.published += n,
            Err(_) => summary.panicked += 1,
        }
    }
    if summary.panicked > 0 {
        warn!("{} of {} workers panicked", summary.panicked, summary.workers);
        error_report.report(PipelineError::WorkerPanicked {
            count: summary.panicked,
        });
    }
    summary
}

fn close<P>(output_tx: Sender<ItemResult<P>>, lifecycle: &Lifecycle, summary: &PipelineSummary) {
    lifecycle.advance(PipelineState::Closed);
    drop(output_tx);
    debug!(
        "tracker: all {} workers joined, {} dispatched, {} published; output closed",
        summary.workers, summary.dispatched, summary.published
    );
}
