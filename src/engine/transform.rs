//! Item transformer seam and the slow-mode wrapper.

use std::thread;
use std::time::Duration;

use crate::error::TransformError;
use crate::types::WorkItem;

/// Turns one work item into a payload. Called concurrently from every worker, so
/// implementations must not keep per-call state in `self`. Failures are returned, never
/// panicked, and any resource opened for an item is released before returning.
pub trait ItemTransformer: Send + Sync + 'static {
    /// Payload type; `Default` is what a failed result carries.
    type Payload: Default + Send + 'static;

    fn transform(&self, item: &WorkItem) -> Result<Self::Payload, TransformError>;
}

impl<F, P> ItemTransformer for F
where
    F: Fn(&WorkItem) -> Result<P, TransformError> + Send + Sync + 'static,
    P: Default + Send + 'static,
{
    type Payload = P;

    fn transform(&self, item: &WorkItem) -> Result<P, TransformError> {
        self(item)
    }
}

/// Sleeps `delay` after each transformation so the interleaving of workers is visible.
pub struct Slowed<T> {
    inner: T,
    delay: Duration,
}

impl<T> Slowed<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<T: ItemTransformer> ItemTransformer for Slowed<T> {
    type Payload = T::Payload;

    fn transform(&self, item: &WorkItem) -> Result<Self::Payload, TransformError> {
        let out = self.inner.transform(item);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        out
    }
}
