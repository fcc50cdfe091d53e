//! Copy engine: puts planned sources in place under the docs tree.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

use docshift_shared::{CopyPlan, CopyPlanEntry, DocshiftError, Result};

use crate::pipeline::ProgressReporter;

/// Execute one plan entry. Returns the number of files written.
///
/// A directory source is merged into the destination directory. A file
/// source is copied into the destination directory under its own name.
/// Existing files are overwritten, nothing is deleted.
pub fn copy_entry(entry: &CopyPlanEntry) -> Result<usize> {
    let source = entry.source.as_path();
    let destination = entry.destination.as_path();

    if source.is_dir() {
        return merge_dir(source, destination);
    }
    if !source.exists() {
        return Err(DocshiftError::copy(source));
    }

    create_dir(destination)?;
    let name = source.file_name().ok_or_else(|| {
        DocshiftError::validation(format!("copy source {} has no file name", source.display()))
    })?;
    copy_file(source, &destination.join(name))?;
    Ok(1)
}

/// Execute every entry of `plan`, stopping at the first failure.
#[instrument(skip_all, fields(entries = plan.len()))]
pub fn copy_plan(plan: &CopyPlan, progress: &dyn ProgressReporter) -> Result<usize> {
    let total = plan.len();
    let mut written = 0;

    for (i, entry) in plan.iter().enumerate() {
        trace!(%entry, "copying");
        written += copy_entry(entry)?;
        progress.entry_copied(&entry.destination, i + 1, total);
    }

    debug!(files = written, "copy plan executed");
    Ok(written)
}

/// Copy `source` to the exact path `target`.
///
/// Directories are merged into `target`. A file lands at `target`, or inside
/// it when `target` is an existing directory.
pub fn copy_path(source: &Path, target: &Path) -> Result<usize> {
    if source.is_dir() {
        return merge_dir(source, target);
    }
    if !source.exists() {
        return Err(DocshiftError::copy(source));
    }

    let target: PathBuf = match (target.is_dir(), source.file_name()) {
        (true, Some(name)) => target.join(name),
        _ => target.to_path_buf(),
    };
    if let Some(parent) = target.parent() {
        create_dir(parent)?;
    }
    copy_file(source, &target)?;
    Ok(1)
}

fn merge_dir(source: &Path, destination: &Path) -> Result<usize> {
    let mut written = 0;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            DocshiftError::io(path, e.into())
        })?;

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            written += 1;
        }
    }

    Ok(written)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| DocshiftError::io(path, e))
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(|e| DocshiftError::io(to, e))?;
    Ok(())
}
