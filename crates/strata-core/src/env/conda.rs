//! Conda-compatible environment manager invoked through its CLI.
//!
//! Installs run as `<binary> run -n <env> pip ...` so that no activation
//! state leaks into the calling process.

use std::path::Path;
use std::process::{Command, Output};

use anyhow::Context;
use serde::Deserialize;

use super::{EnvManager, UninstallOutcome};

/// Runs a conda-compatible binary (`conda`, `mamba`, `micromamba`).
#[derive(Debug, Clone)]
pub struct CondaCli {
    binary: String,
}

impl CondaCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[String]) -> anyhow::Result<Output> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {} {:?}", self.binary, args))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} command failed {:?}: {}",
                self.binary,
                args,
                stderr.trim()
            );
        }
        Ok(output)
    }
}

impl EnvManager for CondaCli {
    fn list_envs(&self) -> anyhow::Result<Vec<String>> {
        let output = self.run(&list_envs_args())?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_env_list(&stdout)
    }

    fn clone_env(&self, source: &str, target: &str) -> anyhow::Result<()> {
        self.run(&clone_env_args(source, target))?;
        Ok(())
    }

    fn uninstall(&self, env: &str, package: &str) -> anyhow::Result<UninstallOutcome> {
        let args = uninstall_args(env, package);
        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run {} {:?}", self.binary, args))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        // pip reports an absent package on stdout or stderr depending on
        // version, with exit status 0 or 1.
        let not_installed =
            stdout.contains("not installed") || stderr.contains("not installed");
        if not_installed {
            return Ok(UninstallOutcome::NotInstalled);
        }
        if !output.status.success() {
            anyhow::bail!(
                "{} command failed {:?}: {}",
                self.binary,
                args,
                stderr.trim()
            );
        }
        Ok(UninstallOutcome::Removed)
    }

    fn install_requirements(&self, env: &str, manifest: &Path) -> anyhow::Result<()> {
        self.run(&install_requirements_args(env, manifest))?;
        Ok(())
    }

    fn install_working_copy(&self, env: &str, repo: &Path) -> anyhow::Result<()> {
        self.run(&install_working_copy_args(env, repo))?;
        Ok(())
    }
}

fn list_envs_args() -> Vec<String> {
    to_args(&["env", "list", "--json"])
}

fn clone_env_args(source: &str, target: &str) -> Vec<String> {
    to_args(&[
        "create", "--yes", "--name", target, "--clone", source,
    ])
}

fn uninstall_args(env: &str, package: &str) -> Vec<String> {
    to_args(&["run", "-n", env, "pip", "uninstall", "--yes", package])
}

fn install_requirements_args(env: &str, manifest: &Path) -> Vec<String> {
    to_args(&[
        "run",
        "-n",
        env,
        "pip",
        "install",
        "--requirement",
        &manifest.display().to_string(),
    ])
}

fn install_working_copy_args(env: &str, repo: &Path) -> Vec<String> {
    to_args(&["run", "-n", env, "pip", "install", &repo.display().to_string()])
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Deserialize)]
struct EnvListing {
    #[serde(default)]
    envs: Vec<std::path::PathBuf>,
}

/// `conda env list --json` reports environment prefixes; names are the
/// final path components.
fn parse_env_list(json: &str) -> anyhow::Result<Vec<String>> {
    let listing: EnvListing =
        serde_json::from_str(json).context("Failed to parse environment listing")?;
    Ok(listing
        .envs
        .iter()
        .filter_map(|prefix| prefix.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}
