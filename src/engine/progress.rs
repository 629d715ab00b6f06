//! Progress bar for the consumer side of the funnel

use kdam::{Animation, Bar, BarExt};

/// Bar counting received results against the number of enumerated items.
pub fn create_progress_bar(total: usize, desc: &'static str) -> Bar {
    kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        unit = " files"
    )
}

/// Advance the bar by `n`. Display errors are ignored; progress is cosmetic.
pub fn update_progress_bar(pb: &mut Bar, n: usize) {
    let _ = pb.update(n);
}

/// Create the bar only when enabled.
pub fn maybe_progress_bar(enabled: bool, total: usize) -> Option<Bar> {
    enabled.then(|| create_progress_bar(total, env!("CARGO_PKG_NAME")))
}
