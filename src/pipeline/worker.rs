use crossbeam_channel::{Receiver, Sender, select};
use log::debug;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::transform::ItemTransformer;
use crate::types::{ItemResult, WorkItem};

use super::cancel::CancellationSignal;
use super::tracker::{Lifecycle, WorkerGuard};

/// Single worker: take an item, transform it, publish the result. Exits when intake closes,
/// when cancel fires, or when the consumer is gone. Returns the number of results published.
fn worker_loop<T: ItemTransformer>(
    id: usize,
    transformer: Arc<T>,
    intake_rx: Receiver<WorkItem>,
    output_tx: Sender<ItemResult<T::Payload>>,
    cancel: CancellationSignal,
    _guard: WorkerGuard,
) -> usize {
    let mut published = 0_usize;
    loop {
        let taken = select! {
            recv(intake_rx) -> msg => msg.ok(),
            recv(cancel.done()) -> _ => None,
        };
        let Some(item) = taken else { break };
        // Both arms can be ready at once; never start new work after cancel.
        if cancel.is_cancelled() {
            debug!("worker {}: canceled before starting {}", id, item);
            break;
        }
        let result = transform_item(transformer.as_ref(), item);
        let delivered = select! {
            send(output_tx, result) -> res => res.is_ok(),
            recv(cancel.done()) -> _ => false,
        };
        if !delivered {
            if cancel.is_cancelled() {
                debug!("worker {}: canceled while publishing, result abandoned", id);
            } else {
                debug!("worker {}: consumer dropped the stream", id);
            }
            break;
        }
        published += 1;
    }
    debug!("worker {}: exiting after {} results", id, published);
    published
}

/// Run the transformer and fold its outcome into a result. Failures stay per item.
pub fn transform_item<T: ItemTransformer>(transformer: &T, item: WorkItem) -> ItemResult<T::Payload> {
    match transformer.transform(&item) {
        Ok(payload) => ItemResult {
            item,
            payload,
            failure: None,
        },
        Err(err) => ItemResult {
            item,
            payload: T::Payload::default(),
            failure: Some(err),
        },
    }
}

/// Spawn `width` workers sharing `intake_rx`. Caller must drop its own intake receiver and
/// output sender afterwards so channel closure tracks the workers only.
/// If a spawn fails, already-started workers are canceled and joined before returning.
pub fn spawn_workers<T: ItemTransformer>(
    transformer: Arc<T>,
    intake_rx: &Receiver<WorkItem>,
    output_tx: &Sender<ItemResult<T::Payload>>,
    cancel: &CancellationSignal,
    lifecycle: &Lifecycle,
    width: usize,
) -> io::Result<Vec<JoinHandle<usize>>> {
    let mut handles = Vec::with_capacity(width);
    for id in 0..width {
        let transformer = Arc::clone(&transformer);
        let intake_rx = intake_rx.clone();
        let output_tx = output_tx.clone();
        let cancel_w = cancel.clone();
        let guard = lifecycle.register_worker();
        let spawned = thread::Builder::new()
            .name(format!("{}-worker-{}", env!("CARGO_PKG_NAME"), id))
            .spawn(move || worker_loop(id, transformer, intake_rx, output_tx, cancel_w, guard));
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                cancel.cancel();
                for h in handles {
                    let _ = h.join();
                }
                return Err(err);
            }
        }
    }
    Ok(handles)
}
