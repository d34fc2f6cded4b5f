//! Hard-linking of activation hooks between environments.

use std::fs;
use std::path::Path;

use anyhow::Context;

/// Result of linking one hooks directory into another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Hook files linked into the destination.
    pub linked: usize,
    /// Pre-existing destination entries that were replaced.
    pub replaced: usize,
}

/// Hard-link every hook file in `src_dir` into `dst_dir`, replacing
/// destination entries of the same name.
///
/// Activation hooks are flat files; directory entries of any other type are
/// ignored. The destination directory is created if absent.
pub fn link_hooks(src_dir: &Path, dst_dir: &Path) -> anyhow::Result<LinkReport> {
    fs::create_dir_all(dst_dir)
        .with_context(|| format!("Failed to create hooks directory: {}", dst_dir.display()))?;

    let mut report = LinkReport::default();
    let entries = fs::read_dir(src_dir)
        .with_context(|| format!("Failed to read hooks directory: {}", src_dir.display()))?;
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read dir entry: {}", src_dir.display()))?;
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to stat dir entry: {}", entry.path().display()))?;
        if !ty.is_file() {
            continue;
        }

        let from = entry.path();
        let to = dst_dir.join(entry.file_name());
        if to.exists() {
            fs::remove_file(&to)
                .with_context(|| format!("Failed to replace hook: {}", to.display()))?;
            report.replaced += 1;
        }
        fs::hard_link(&from, &to).with_context(|| {
            format!(
                "Failed to hard-link hook from {} to {}",
                from.display(),
                to.display()
            )
        })?;
        report.linked += 1;
    }
    Ok(report)
}
