//! Enumerate work items: files directly inside a directory with the wanted extension.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::Path;
use walkdir::WalkDir;

use crate::Opts;
use crate::engine::tools::should_include_item;
use crate::types::WorkItem;

/// Selection rules for [`items_in`].
#[derive(Clone, Debug)]
pub struct EnumerateOpts {
    pub extension: String,
    pub exclude: Vec<String>,
}

impl From<&Opts> for EnumerateOpts {
    fn from(o: &Opts) -> Self {
        Self {
            extension: o.extension.clone(),
            exclude: o.exclude.clone(),
        }
    }
}

/// List non-directory entries at depth 1 of `dir` that pass the extension and exclude filters,
/// sorted by file name. Entries that cannot be read are logged and skipped; a
/// directory that cannot be opened at all is an error.
pub fn items_in(dir: &Path, opts: &EnumerateOpts) -> Result<Vec<WorkItem>> {
    let meta = std::fs::metadata(dir).with_context(|| format!("read {}", dir.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let mut items = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => {
                return Err(err).with_context(|| format!("list {}", dir.display()));
            }
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if should_include_item(entry.path(), &opts.extension, &opts.exclude) {
            items.push(WorkItem::new(entry.into_path()));
        }
    }
    debug!(
        "enumerated {} .{} items in {}",
        items.len(),
        opts.extension.trim_start_matches('.'),
        dir.display()
    );
    Ok(items)
}
