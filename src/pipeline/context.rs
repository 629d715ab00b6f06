//! Pipeline tuning and the channels/shared state created fresh for each run.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, bounded};
use log::warn;

use crate::Opts;
use crate::types::{ItemResult, WorkItem};
use crate::utils::config::ChannelCaps;
use crate::utils::fd_limit::max_workers_by_fd_limit;

use super::cancel::CancellationSignal;
use super::error_handler::ErrorReport;
use super::tracker::Lifecycle;

/// Worker width and channel capacities. Width is fixed for the life of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub width: usize,
    /// Intake capacity; 0 makes every offer a hand-off to a waiting worker.
    pub intake_cap: usize,
    /// Output capacity; 0 makes every publish a hand-off to the consumer.
    pub output_cap: usize,
}

impl PipelineTuning {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            intake_cap: ChannelCaps::INTAKE,
            output_cap: ChannelCaps::OUTPUT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            anyhow::bail!("Cannot run a pipeline with 0 workers; width must be at least 1");
        }
        if let Some(fd_cap) = max_workers_by_fd_limit()
            && self.width > fd_cap
        {
            warn!(
                "Width {} exceeds ~80% of the open-file limit (room for {}); items may fail to open",
                self.width, fd_cap
            );
        }
        Ok(())
    }
}

impl From<&Opts> for PipelineTuning {
    fn from(o: &Opts) -> Self {
        Self {
            width: o.width,
            intake_cap: o.intake_capacity,
            output_cap: o.output_capacity,
        }
    }
}

/// Channels and shared state for one run. Feeder gets intake_tx; workers get intake_rx and
/// output_tx clones; the tracker keeps output_tx; the consumer keeps output_rx.
pub struct PipelineChannels<P> {
    pub intake_tx: Sender<WorkItem>,
    pub intake_rx: Receiver<WorkItem>,
    pub output_tx: Sender<ItemResult<P>>,
    pub output_rx: Receiver<ItemResult<P>>,
    pub cancel: CancellationSignal,
    pub error_report: ErrorReport,
    pub lifecycle: Lifecycle,
}

pub fn create_pipeline_channels<P>(tuning: &PipelineTuning) -> PipelineChannels<P> {
    let (intake_tx, intake_rx) = bounded::<WorkItem>(tuning.intake_cap);
    let (output_tx, output_rx) = bounded::<ItemResult<P>>(tuning.output_cap);
    PipelineChannels {
        intake_tx,
        intake_rx,
        output_tx,
        output_rx,
        cancel: CancellationSignal::new(),
        error_report: ErrorReport::new(),
        lifecycle: Lifecycle::new(),
    }
}
