//! Version-control seam for package working copies.
//!
//! Mutating operations go through the `git` CLI; read-only repository
//! inspection goes through `git2`.

use std::path::Path;
use std::process::Command;

use anyhow::Context;

/// Operations the provisioner needs from version control.
pub trait VersionControl {
    /// Bring the working copy up to date with its upstream.
    fn pull(&self, repo: &Path) -> anyhow::Result<()>;

    /// All tag names in the repository, unordered.
    fn list_tags(&self, repo: &Path) -> anyhow::Result<Vec<String>>;

    /// Check out a tag or branch.
    fn checkout(&self, repo: &Path, reference: &str) -> anyhow::Result<()>;
}

/// `git` implementation of [`VersionControl`].
#[derive(Debug, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }
}

impl VersionControl for GitCli {
    fn pull(&self, repo: &Path) -> anyhow::Result<()> {
        run_git(repo, &["pull"])
    }

    fn list_tags(&self, repo: &Path) -> anyhow::Result<Vec<String>> {
        let repository = git2::Repository::open(repo)
            .with_context(|| format!("Failed to open repository: {}", repo.display()))?;
        let names = repository
            .tag_names(None)
            .with_context(|| format!("Failed to list tags: {}", repo.display()))?;
        Ok(names.iter().flatten().map(str::to_string).collect())
    }

    fn checkout(&self, repo: &Path, reference: &str) -> anyhow::Result<()> {
        run_git(repo, &["checkout", reference])
    }
}

fn run_git(cwd: &Path, args: &[&str]) -> anyhow::Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("Failed to run git {:?}", args))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Git command failed {:?}: {}", args, stderr.trim());
    }
    Ok(())
}
