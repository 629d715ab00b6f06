//! Public and internal types for the bigd API and pipeline.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::TransformError;

/// One unit of work: an opaque identifier (a file path for the gzip use case).
///
/// Created by enumeration, handed to exactly one worker, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkItem(PathBuf);

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for WorkItem {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for WorkItem {
    fn from(p: PathBuf) -> Self {
        Self(p)
    }
}

impl From<&str> for WorkItem {
    fn from(s: &str) -> Self {
        Self(PathBuf::from(s))
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Outcome of one item: the payload (empty on failure) and the failure, if any.
///
/// Exactly one is produced per item a worker takes. Items skipped because of
/// cancellation never produce one.
#[derive(Debug)]
pub struct ItemResult<P = Vec<u8>> {
    pub item: WorkItem,
    pub payload: P,
    pub failure: Option<TransformError>,
}

impl<P> ItemResult<P> {
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

impl ItemResult<Vec<u8>> {
    /// Payload as text (lossy for non-UTF-8 bytes).
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Counts gathered by the completion tracker once every pipeline thread has exited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Items accepted by a worker.
    pub dispatched: usize,
    /// Results handed to the consumer.
    pub published: usize,
    /// Workers joined by the tracker.
    pub workers: usize,
    /// Workers whose thread panicked.
    pub panicked: usize,
    /// Results left unread in the stream and discarded by [`Funnel::finish`](crate::pipeline::Funnel::finish).
    pub discarded: usize,
}

/// Full options (CLI, `.bigd.toml`). Library callers usually build a
/// [`PipelineTuning`](crate::pipeline::PipelineTuning) directly.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Number of concurrent workers.
    pub width: usize,
    /// File extension (without the dot) selected by enumeration.
    pub extension: String,
    /// Exclude patterns (glob syntax) applied to file names.
    pub exclude: Vec<String>,
    /// Delay added after each transformation. None = no delay.
    pub slow: Option<Duration>,
    /// Intake channel capacity (0 = rendezvous).
    pub intake_capacity: usize,
    /// Output channel capacity (0 = rendezvous).
    pub output_capacity: usize,
    /// Debug logging.
    pub verbose: bool,
    /// Show a progress bar on stderr.
    pub progress: bool,
    /// Exit non-zero when any item failed.
    pub strict: bool,
    /// Write a JSON memory report here after the run.
    pub profmem: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        use crate::utils::config::{ChannelCaps, DEFAULT_EXTENSION, WorkerWidth};
        Self {
            width: WorkerWidth::DEFAULT,
            extension: DEFAULT_EXTENSION.to_string(),
            exclude: Vec::new(),
            slow: None,
            intake_capacity: ChannelCaps::INTAKE,
            output_capacity: ChannelCaps::OUTPUT,
            verbose: false,
            progress: false,
            strict: false,
            profmem: None,
        }
    }
}
