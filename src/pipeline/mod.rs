//! Pipeline components: feeder, worker pool, completion tracker, cancellation, error report.
//!
//! Items flow feeder -> intake channel -> W workers -> output channel -> consumer.
//! The tracker joins every thread before closing the output channel.

pub mod cancel;
pub mod context;
pub mod error_handler;
pub mod feeder;
pub mod orchestrator;
pub mod tracker;
pub mod worker;

pub use cancel::CancellationSignal;
pub use context::{PipelineChannels, PipelineTuning, create_pipeline_channels};
pub use error_handler::{ErrorReport, check_error_report};
pub use feeder::{run_feed_loop, spawn_feeder_thread};
pub use orchestrator::{Funnel, collect_results, run_pipeline};
pub use tracker::{
    Lifecycle, PipelineHandles, PipelineState, cancel_and_join, spawn_completion_tracker,
};
pub use worker::{spawn_workers, transform_item};

use crate::types::{ItemResult, PipelineSummary};

/// Result of [`collect_results`]: (results in arrival order, summary).
pub type CollectResults<P> = (Vec<ItemResult<P>>, PipelineSummary);
