//! Pipeline tests: completeness, bounded width, closure, cancellation, failure isolation.

use bigd::pipeline::{
    CancellationSignal, ErrorReport, Lifecycle, PipelineChannels, PipelineState, PipelineTuning,
    cancel_and_join, collect_results, create_pipeline_channels, run_feed_loop, run_pipeline,
    spawn_completion_tracker, spawn_feeder_thread, spawn_workers,
};
use bigd::{ItemResult, PipelineError, TransformError, WorkItem, funnel};
use crossbeam_channel::bounded;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

fn items(n: usize) -> Vec<WorkItem> {
    (0..n).map(|i| WorkItem::from(format!("item-{i}").as_str())).collect()
}

fn echo(item: &WorkItem) -> Result<String, TransformError> {
    Ok(item.to_string())
}

/// Transformer that records how many calls are running at once.
struct Gauge {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    delay: Duration,
}

impl bigd::ItemTransformer for Gauge {
    type Payload = ();

    fn transform(&self, _item: &WorkItem) -> Result<(), TransformError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

fn sleepy(delay: Duration) -> impl Fn(&WorkItem) -> Result<String, TransformError> + Send + Sync {
    move |item: &WorkItem| {
        thread::sleep(delay);
        Ok(item.to_string())
    }
}

// --- completeness ---

#[test]
fn test_every_item_yields_exactly_one_result() {
    let input = items(50);
    let expected: HashSet<WorkItem> = input.iter().cloned().collect();
    let (results, summary) = collect_results(input, echo, &PipelineTuning::new(4)).unwrap();

    assert_eq!(results.len(), 50);
    let seen: HashSet<WorkItem> = results.iter().map(|r| r.item.clone()).collect();
    assert_eq!(seen, expected);
    for r in &results {
        assert!(r.is_ok());
        assert_eq!(r.payload, r.item.to_string());
    }
    assert_eq!(summary.dispatched, 50);
    assert_eq!(summary.published, 50);
    assert_eq!(summary.workers, 4);
    assert_eq!(summary.panicked, 0);
}

#[test]
fn test_single_worker_processes_in_enumeration_order() {
    let input = items(20);
    let (results, _) = collect_results(input.clone(), echo, &PipelineTuning::new(1)).unwrap();
    let got: Vec<WorkItem> = results.into_iter().map(|r| r.item).collect();
    assert_eq!(got, input);
}

#[test]
fn test_buffered_channels_still_complete() {
    let tuning = PipelineTuning {
        width: 3,
        intake_cap: 8,
        output_cap: 8,
    };
    let (results, summary) = collect_results(items(40), echo, &tuning).unwrap();
    assert_eq!(results.len(), 40);
    assert_eq!(summary.published, 40);
}

// --- bounded concurrency ---

#[test]
fn test_in_flight_never_exceeds_width() {
    for width in [1, 3, 8] {
        let peak = Arc::new(AtomicUsize::new(0));
        let gauge = Gauge {
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::clone(&peak),
            delay: Duration::from_millis(2),
        };
        let (results, _) = collect_results(items(40), gauge, &PipelineTuning::new(width)).unwrap();
        assert_eq!(results.len(), 40);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= width, "peak {peak} for width {width}");
    }
}

#[test]
fn test_zero_width_is_rejected() {
    assert!(run_pipeline(items(3), echo, &PipelineTuning::new(0)).is_err());
}

// --- closure ---

#[test]
fn test_stream_ends_only_after_all_workers_exit() {
    let mut f = funnel(items(30), sleepy(Duration::from_millis(1)), 5).unwrap();
    let lifecycle = f.lifecycle().clone();
    let mut count = 0;
    for _ in f.by_ref() {
        count += 1;
    }
    assert_eq!(count, 30);
    assert_eq!(lifecycle.state(), PipelineState::Closed);
    assert_eq!(lifecycle.live_workers(), 0);
    // Not restartable: stays ended.
    assert!(f.next().is_none());
    assert!(f.next().is_none());
    let summary = f.finish().unwrap();
    assert_eq!(summary.workers, 5);
    assert_eq!(summary.discarded, 0);
}

#[test]
fn test_finish_drains_unread_results() {
    let f = funnel(items(10), echo, 2).unwrap();
    let summary = f.finish().unwrap();
    assert_eq!(summary.discarded, 10);
    assert_eq!(summary.published, 10);
}

// --- cancellation ---

#[test]
fn test_cancel_immediately_bounds_shutdown() {
    let mut f = funnel(items(100), sleepy(Duration::from_millis(5)), 4).unwrap();
    f.cancel();
    let start = Instant::now();
    let received = f.by_ref().count();
    let lifecycle = f.lifecycle().clone();
    let outcome = f.finish();
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(received <= 100);
    assert_eq!(lifecycle.state(), PipelineState::Closed);
    assert_eq!(lifecycle.live_workers(), 0);
    match outcome {
        Ok(summary) => assert!(summary.published <= 100),
        Err(e) => assert_eq!(e, PipelineError::Canceled),
    }
}

#[test]
fn test_cancel_with_idle_consumer_does_not_deadlock() {
    // Nobody reads; workers block on publish until cancel releases them.
    let f = funnel(items(50), echo, 4).unwrap();
    thread::sleep(Duration::from_millis(20));
    let lifecycle = f.lifecycle().clone();
    assert_ne!(lifecycle.state(), PipelineState::Closed);
    f.cancel();

    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let _ = tx.send(f.finish());
    });
    let outcome = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("pipeline did not close after cancel");
    assert_eq!(outcome.unwrap_err(), PipelineError::Canceled);
    assert_eq!(lifecycle.state(), PipelineState::Closed);
}

#[test]
fn test_cancel_mid_stream_reports_canceled_once() {
    let mut f = funnel(items(200), sleepy(Duration::from_millis(1)), 2).unwrap();
    let report = f.error_report().clone();
    let signal = f.canceller();
    let mut received = 0;
    for _ in f.by_ref() {
        received += 1;
        if received == 5 {
            signal.cancel();
        }
    }
    assert!(received >= 5 && received < 200);
    assert_eq!(report.peek(), Some(PipelineError::Canceled));
    assert_eq!(f.finish().unwrap_err(), PipelineError::Canceled);
}

#[test]
fn test_cancel_is_idempotent_across_threads() {
    let f = funnel(items(100), sleepy(Duration::from_millis(1)), 4).unwrap();
    let signal = f.canceller();
    let fired: usize = (0..8)
        .map(|_| {
            let s = signal.clone();
            thread::spawn(move || s.cancel() as usize)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .sum();
    assert_eq!(fired, 1);
    assert!(!f.cancel());
    assert!(signal.is_cancelled());
    let _ = f.finish();
}

#[test]
fn test_cancellation_signal_wakes_select() {
    let signal = CancellationSignal::new();
    assert!(!signal.is_cancelled());
    assert!(signal.done().try_recv().is_err());
    let s = signal.clone();
    let waiter = thread::spawn(move || s.done().recv().is_err());
    thread::sleep(Duration::from_millis(10));
    assert!(signal.cancel());
    assert!(waiter.join().unwrap());
    assert!(!signal.cancel());
}

#[test]
fn test_dropping_unfinished_funnel_joins_threads() {
    let f = funnel(items(100), sleepy(Duration::from_millis(2)), 4).unwrap();
    let lifecycle = f.lifecycle().clone();
    let start = Instant::now();
    drop(f);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(lifecycle.state(), PipelineState::Closed);
    assert_eq!(lifecycle.live_workers(), 0);
}

#[test]
fn test_cancel_and_join_reclaims_threads_without_tracker() {
    let tuning = PipelineTuning::new(3);
    let PipelineChannels {
        intake_tx,
        intake_rx,
        output_tx,
        output_rx,
        cancel,
        error_report,
        lifecycle,
    } = create_pipeline_channels::<String>(&tuning);
    lifecycle.advance(PipelineState::Running);
    let workers = spawn_workers(
        Arc::new(sleepy(Duration::from_millis(20))),
        &intake_rx,
        &output_tx,
        &cancel,
        &lifecycle,
        tuning.width,
    )
    .unwrap();
    drop(intake_rx);
    drop(output_tx);
    let feeder = spawn_feeder_thread(
        items(100),
        intake_tx,
        cancel.clone(),
        error_report.clone(),
        lifecycle.clone(),
    )
    .unwrap();
    // Nobody reads the output, so workers park on publish and the feeder on its next offer.
    thread::sleep(Duration::from_millis(50));

    let summary = cancel_and_join(Some(feeder), workers, &cancel, &lifecycle, &error_report);
    assert_eq!(summary.workers, 3);
    assert_eq!(summary.panicked, 0);
    assert_eq!(lifecycle.state(), PipelineState::Closed);
    assert_eq!(lifecycle.live_workers(), 0);
    assert_eq!(error_report.peek(), Some(PipelineError::Canceled));
    assert!(output_rx.try_recv().is_err());
}

#[test]
fn test_tracker_without_handles_still_closes_stream() {
    let (handles_tx, handles_rx) = bounded(1);
    let (output_tx, output_rx) = bounded::<ItemResult<String>>(0);
    let lifecycle = Lifecycle::new();
    let tracker =
        spawn_completion_tracker(handles_rx, output_tx, lifecycle.clone(), ErrorReport::new())
            .unwrap();
    drop(handles_tx);
    let summary = tracker.join().unwrap();
    assert_eq!(summary.workers, 0);
    assert!(output_rx.recv().is_err());
    assert_eq!(lifecycle.state(), PipelineState::Closed);
}

// --- failure isolation ---

#[test]
fn test_item_failure_is_isolated() {
    let failing = |item: &WorkItem| -> Result<String, TransformError> {
        if item.to_string() == "item-7" {
            return Err(TransformError::Failed {
                path: item.path().to_path_buf(),
                reason: "boom".to_string(),
            });
        }
        Ok(item.to_string())
    };
    let (results, _) = collect_results(items(15), failing, &PipelineTuning::new(3)).unwrap();
    assert_eq!(results.len(), 15);
    let failed: Vec<&ItemResult<String>> = results.iter().filter(|r| !r.is_ok()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].item, WorkItem::from("item-7"));
    assert!(failed[0].payload.is_empty());
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 14);
}

#[test]
fn test_worker_panic_is_reported_and_pipeline_closes() {
    let panicky = |item: &WorkItem| -> Result<String, TransformError> {
        if item.to_string() == "item-0" {
            panic!("transformer bug");
        }
        Ok(item.to_string())
    };
    let mut f = funnel(items(10), panicky, 2).unwrap();
    let received = f.by_ref().count();
    assert_eq!(received, 9);
    assert_eq!(
        f.finish().unwrap_err(),
        PipelineError::WorkerPanicked { count: 1 }
    );
}

// --- scenarios ---

#[test]
fn test_zero_items_closes_immediately() {
    let mut f = funnel(Vec::new(), echo, 4).unwrap();
    assert_eq!(f.by_ref().count(), 0);
    assert_eq!(f.state(), PipelineState::Closed);
    assert!(f.error_report().peek().is_none());
    let summary = f.finish().unwrap();
    assert_eq!(summary.dispatched, 0);
    assert_eq!(summary.workers, 4);
}

#[test]
fn test_more_workers_than_items() {
    let (results, summary) =
        collect_results(vec![WorkItem::from("only")], echo, &PipelineTuning::new(16)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].payload, "only");
    assert_eq!(summary.workers, 16);
    assert_eq!(summary.panicked, 0);
}

// --- feeder ---

#[test]
fn test_feed_loop_stops_and_reports_on_cancel() {
    let (tx, rx) = bounded::<WorkItem>(0);
    let cancel = CancellationSignal::new();
    let report = ErrorReport::new();
    let lifecycle = Lifecycle::new();
    cancel.cancel();
    let sent = run_feed_loop(tx, &cancel, &report, &lifecycle, items(5));
    assert_eq!(sent, 0);
    assert_eq!(report.take(), Some(PipelineError::Canceled));
    assert_eq!(lifecycle.state(), PipelineState::Draining);
    // Intake closed.
    assert!(rx.recv().is_err());
}

#[test]
fn test_feed_loop_closes_intake_when_exhausted() {
    let (tx, rx) = bounded::<WorkItem>(10);
    let cancel = CancellationSignal::new();
    let report = ErrorReport::new();
    let lifecycle = Lifecycle::new();
    let sent = run_feed_loop(tx, &cancel, &report, &lifecycle, items(3));
    assert_eq!(sent, 3);
    let got: Vec<PathBuf> = rx.iter().map(WorkItem::into_path).collect();
    assert_eq!(got.len(), 3);
    assert!(report.peek().is_none());
}

#[test]
fn test_error_report_first_writer_wins() {
    let report = ErrorReport::new();
    assert!(report.report(PipelineError::Canceled));
    assert!(!report.report(PipelineError::FeederPanicked));
    assert_eq!(report.peek(), Some(PipelineError::Canceled));
    assert_eq!(report.take(), Some(PipelineError::Canceled));
    assert!(report.take().is_none());
}

#[test]
fn test_lifecycle_only_moves_forward() {
    let lc = Lifecycle::new();
    assert_eq!(lc.state(), PipelineState::Idle);
    assert!(lc.advance(PipelineState::Draining));
    assert!(!lc.advance(PipelineState::Running));
    assert_eq!(lc.state(), PipelineState::Draining);
    assert!(lc.advance(PipelineState::Closed));
    assert!(!lc.advance(PipelineState::Closed));
}
