//! Output-directory provisioning with group ownership.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Context;

/// Whether provisioning found or created a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOutcome {
    Created,
    AlreadyPresent,
}

/// Create `path` if absent and hand the tree to `group` recursively.
/// Idempotent.
pub fn provision_dir(path: &Path, group: &str) -> anyhow::Result<DirOutcome> {
    let outcome = ensure_dir(path)?;
    chgrp_recursive(path, group)?;
    Ok(outcome)
}

/// Create a directory tree if it does not exist yet.
pub fn ensure_dir(path: &Path) -> anyhow::Result<DirOutcome> {
    if path.is_dir() {
        return Ok(DirOutcome::AlreadyPresent);
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    Ok(DirOutcome::Created)
}

fn chgrp_recursive(path: &Path, group: &str) -> anyhow::Result<()> {
    let output = Command::new("chgrp")
        .arg("-R")
        .arg(group)
        .arg(path)
        .output()
        .context("Failed to invoke chgrp")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "chgrp -R {} {} failed: {}",
            group,
            path.display(),
            stderr.trim()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_missing_trees() {
        let temp = tempfile::tempdir().expect("tempdir should succeed");
        let path = temp.path().join("processed").join("pax_v6.10.1");

        assert_eq!(ensure_dir(&path).unwrap(), DirOutcome::Created);
        assert!(path.is_dir());
    }

    #[test]
    fn ensure_dir_reports_existing_trees() {
        let temp = tempfile::tempdir().expect("tempdir should succeed");
        let path = temp.path().join("minitrees");
        fs::create_dir_all(&path).unwrap();

        assert_eq!(ensure_dir(&path).unwrap(), DirOutcome::AlreadyPresent);
    }

    #[test]
    fn provision_dir_rejects_unknown_groups() {
        let temp = tempfile::tempdir().expect("tempdir should succeed");
        let path = temp.path().join("processed");

        let result = provision_dir(&path, "strata-no-such-group");
        assert!(result.is_err());
        // The directory half still ran.
        assert!(path.is_dir());
    }
}
