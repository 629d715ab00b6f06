//! Memory report written after a run (`--profmem`).

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Process memory and run counts at the end of a run.
#[derive(Debug, Serialize)]
pub struct MemoryReport {
    pub pid: u32,
    /// Resident set size in bytes (0 if unavailable).
    pub resident_bytes: u64,
    /// Virtual memory in bytes (0 if unavailable).
    pub virtual_bytes: u64,
    pub width: usize,
    pub items: usize,
    pub results: usize,
    pub failures: usize,
    pub elapsed_ms: u64,
}

/// Counts collected by the consumer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunCounts {
    pub width: usize,
    pub items: usize,
    pub results: usize,
    pub failures: usize,
}

pub fn memory_report(counts: RunCounts, elapsed: Duration) -> Result<MemoryReport> {
    let pid = sysinfo::get_current_pid()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("current pid")?;
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );
    let (resident_bytes, virtual_bytes) = sys
        .process(pid)
        .map(|p| (p.memory(), p.virtual_memory()))
        .unwrap_or((0, 0));
    Ok(MemoryReport {
        pid: pid.as_u32(),
        resident_bytes,
        virtual_bytes,
        width: counts.width,
        items: counts.items,
        results: counts.results,
        failures: counts.failures,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    })
}

/// Write the report as pretty JSON. An empty path is a no-op.
pub fn write_memory_report(path: &Path, report: &MemoryReport) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    let json = serde_json::to_string_pretty(report).context("serialize memory report")?;
    std::fs::write(path, json)
        .with_context(|| format!("write memory report to {}", path.display()))?;
    log::debug!("memory report written to {}", path.display());
    Ok(())
}
