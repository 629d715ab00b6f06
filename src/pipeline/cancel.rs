//! Broadcast-once cancellation: an atomic flag plus a channel that disconnects when fired.
//!
//! The receiver from [`CancellationSignal::done`] can sit in any `select!` next to a
//! channel operation, so every blocking send/recv in the pipeline also wakes on cancel.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

struct Inner {
    fired: AtomicBool,
    /// Never sends; dropping it disconnects `done`, waking every select on it.
    trigger: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

/// Shared, idempotent, monotonic cancellation token. Clones observe the same signal.
#[derive(Clone)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (trigger, done) = bounded::<()>(0);
        Self {
            inner: Arc::new(Inner {
                fired: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                done,
            }),
        }
    }

    /// Fire the signal. Returns true only for the call that actually fired it;
    /// every later (or concurrent losing) call is a no-op.
    pub fn cancel(&self) -> bool {
        if self.inner.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        let trigger = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(trigger);
        debug!("cancellation signaled");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready (disconnected) once the signal fires. Use in `select!`.
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }
}
