//! Source feeder: offers pre-enumerated items onto intake, racing each offer against cancel.

use crossbeam_channel::{Sender, select};
use log::debug;
use std::io;
use std::thread::{self, JoinHandle};

use crate::error::PipelineError;
use crate::types::WorkItem;

use super::cancel::CancellationSignal;
use super::error_handler::ErrorReport;
use super::tracker::{Lifecycle, PipelineState};

pub fn spawn_feeder_thread(
    items: Vec<WorkItem>,
    intake_tx: Sender<WorkItem>,
    cancel: CancellationSignal,
    error_report: ErrorReport,
    lifecycle: Lifecycle,
) -> io::Result<JoinHandle<usize>> {
    thread::Builder::new()
        .name(format!("{}-feeder", env!("CARGO_PKG_NAME")))
        .spawn(move || run_feed_loop(intake_tx, &cancel, &error_report, &lifecycle, items))
}

/// Offer every item in order; close intake (drop `intake_tx`) and move the pipeline to
/// Draining when done. Cancellation stops the loop and reports `Canceled` once.
/// Returns the number of items accepted onto intake.
pub fn run_feed_loop<I>(
    intake_tx: Sender<WorkItem>,
    cancel: &CancellationSignal,
    error_report: &ErrorReport,
    lifecycle: &Lifecycle,
    items: I,
) -> usize
where
    I: IntoIterator<Item = WorkItem>,
{
    let mut count = 0_usize;
    for item in items {
        if cancel.is_cancelled() {
            error_report.report(PipelineError::Canceled);
            break;
        }
        let accepted = select! {
            send(intake_tx, item) -> res => res.is_ok(),
            recv(cancel.done()) -> _ => false,
        };
        if !accepted {
            if cancel.is_cancelled() {
                error_report.report(PipelineError::Canceled);
            } else {
                debug!("feeder: no workers left on intake, stopping after {} items", count);
            }
            break;
        }
        count += 1;
    }
    drop(intake_tx);
    lifecycle.advance(PipelineState::Draining);
    debug!("feeder: intake closed after {} items", count);
    count
}
