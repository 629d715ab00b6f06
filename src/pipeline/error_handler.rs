use log::debug;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::PipelineError;

/// Single-slot, first-error-wins holder for pipeline-level failures.
///
/// Writers never wait on a reader; a report into a full slot is dropped.
#[derive(Clone, Debug, Default)]
pub struct ErrorReport {
    slot: Arc<Mutex<Option<PipelineError>>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `err` if the slot is empty. Returns false when an earlier report already won.
    pub fn report(&self, err: PipelineError) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(first) = slot.as_ref() {
            debug!("error report already holds '{}'; dropping '{}'", first, err);
            return false;
        }
        *slot = Some(err);
        true
    }

    /// Current report without clearing it.
    pub fn peek(&self) -> Option<PipelineError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Option<PipelineError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Check the error report after the output stream has closed. The tracker joins the
/// feeder before closing the stream, so nothing can be written after this point.
pub fn check_error_report(report: &ErrorReport) -> Result<(), PipelineError> {
    match report.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
