//! The two error classes that cross thread boundaries in the pipeline.
//!
//! [`TransformError`] is per item and travels inside an [`ItemResult`](crate::ItemResult).
//! [`PipelineError`] is pipeline-wide and travels only through the
//! [`ErrorReport`](crate::pipeline::ErrorReport). Neither is ever converted into the other.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("open {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decode {}: {}", .path.display(), .source)]
    Decode {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("truncated {}: {}", .path.display(), .source)]
    Truncated {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failure reported by a non-file transformer.
    #[error("{}: {}", .path.display(), .reason)]
    Failed { path: PathBuf, reason: String },
}

impl TransformError {
    /// Classify a read error from a decoder stream.
    pub fn from_read(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                Self::Decode { path, source }
            }
            io::ErrorKind::UnexpectedEof => Self::Truncated { path, source },
            _ => Self::Read { path, source },
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The feeder was still offering items when cancellation fired.
    #[error("canceled")]
    Canceled,
    #[error("{count} worker thread(s) panicked")]
    WorkerPanicked { count: usize },
    #[error("feeder thread panicked")]
    FeederPanicked,
    #[error("completion tracker panicked")]
    TrackerPanicked,
}
