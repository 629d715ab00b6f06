//! Load `.bigd.toml` from the target directory (CLI only). Lib callers pass Opts / PipelineTuning directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct BigdToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    width: Option<usize>,
    extension: Option<String>,
    exclude: Option<Vec<String>>,
    /// Slow-mode delay in milliseconds; 0 disables.
    slow_ms: Option<u64>,
    intake_capacity: Option<usize>,
    output_capacity: Option<usize>,
    verbose: Option<bool>,
    progress: Option<bool>,
    strict: Option<bool>,
    profmem: Option<String>,
}

/// Load `.bigd.toml` from `dir` if present. Returns None if the file is missing or invalid
/// (invalid files are logged).
pub fn load_bigd_toml(dir: &Path) -> Option<BigdToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_bigd_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_bigd_toml(s: &str) -> Result<BigdToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &BigdToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, width);
    apply_file_opt!(s, opts, extension);
    apply_file_opt!(s, opts, exclude);
    apply_file_opt!(s, opts, intake_capacity);
    apply_file_opt!(s, opts, output_capacity);
    apply_file_opt!(s, opts, verbose);
    apply_file_opt!(s, opts, progress);
    apply_file_opt!(s, opts, strict);
    if let Some(ms) = s.slow_ms {
        opts.slow = (ms > 0).then(|| Duration::from_millis(ms));
    }
    if let Some(ref p) = s.profmem {
        opts.profmem = Some(PathBuf::from(p));
    }
}
