//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Per-directory config file, e.g. `.bigd.toml`.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

/// Directory processed when none is given on the command line.
pub const DEFAULT_DIR: &str = "./testdata";

/// Extension (without the dot) selected by enumeration.
pub const DEFAULT_EXTENSION: &str = "gz";

// ---- Worker width ----

/// Worker pool width. Chosen to bound memory held by open and decoded files,
/// not derived from the CPU count.
pub struct WorkerWidth;

impl WorkerWidth {
    pub const DEFAULT: usize = 16;
}

// ---- Channels ----

/// Channel capacities. Zero means rendezvous: an offer completes only when a worker takes it.
pub struct ChannelCaps;

impl ChannelCaps {
    pub const INTAKE: usize = 0;
    pub const OUTPUT: usize = 0;
}

// ---- Slow mode ----

/// Delay added after each item with `--slow`.
pub const SLOW_DELAY: Duration = Duration::from_millis(1000);

// ---- Gzip ----

pub struct GzipConsts;

impl GzipConsts {
    /// Buffered reader capacity between file and decoder (bytes). 64 KB.
    pub const READ_BUFFER_SIZE: usize = 64 * 1024;
}
