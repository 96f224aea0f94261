//! Build directory preparation

use anyhow::{bail, Context};
use std::path::Path;
use walkdir::WalkDir;

/// Replace `build` with a fresh copy of `scenario`
///
/// Returns the number of files copied.
///
/// # Errors
/// If `scenario` is not a directory or the copy fails
pub fn prepare_build_dir(scenario: &Path, build: &Path) -> anyhow::Result<usize> {
    if !scenario.is_dir() {
        bail!("scenario directory {} not found", scenario.display());
    }
    if build.exists() {
        std::fs::remove_dir_all(build)
            .with_context(|| format!("removing {}", build.display()))?;
    }

    let copied = copy_tree(scenario, build)?;
    tracing::info!(
        from = %scenario.display(),
        to = %build.display(),
        files = copied,
        "scenario copied"
    );
    Ok(copied)
}

/// Copy the tree under `src` to `dst`, following symlinks
///
/// # Errors
/// If a directory cannot be walked or a file cannot be copied
pub fn copy_tree(src: &Path, dst: &Path) -> anyhow::Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", src.display()))?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("creating {}", target.display()))?;
        } else {
            std::fs::copy(entry.path(), &target)
                .with_context(|| format!("copying {}", entry.path().display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}
