//! Shared fixtures: fake collaborators and a tempdir deployment layout.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use strata_core::config::{DataConfig, DeployConfig, EnvsConfig, PackageSpec};
use strata_core::env::{EnvManager, UninstallOutcome};
use strata_core::vcs::VersionControl;

/// One recorded call against a fake collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Pull(PathBuf),
    ListTags(PathBuf),
    Checkout(PathBuf, String),
    ListEnvs,
    CloneEnv(String, String),
    Uninstall(String, String),
    InstallRequirements(String, PathBuf),
    InstallWorkingCopy(String, PathBuf),
}

/// Version control fake with configurable tag listings.
#[derive(Debug, Default)]
pub struct FakeVcs {
    tags: HashMap<PathBuf, Vec<String>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, repo: &Path, tags: &[&str]) -> Self {
        self.tags.insert(
            repo.to_path_buf(),
            tags.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl VersionControl for FakeVcs {
    fn pull(&self, repo: &Path) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::Pull(repo.to_path_buf()));
        Ok(())
    }

    fn list_tags(&self, repo: &Path) -> anyhow::Result<Vec<String>> {
        self.calls
            .borrow_mut()
            .push(Call::ListTags(repo.to_path_buf()));
        Ok(self.tags.get(repo).cloned().unwrap_or_default())
    }

    fn checkout(&self, repo: &Path, reference: &str) -> anyhow::Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Checkout(repo.to_path_buf(), reference.to_string()));
        Ok(())
    }
}

/// Environment manager fake backed by an in-memory environment list.
#[derive(Debug, Default)]
pub struct FakeEnvs {
    envs: RefCell<Vec<String>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeEnvs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_envs(self, names: &[&str]) -> Self {
        *self.envs.borrow_mut() = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn has_env(&self, name: &str) -> bool {
        self.envs.borrow().iter().any(|env| env == name)
    }

    pub fn env_names(&self) -> Vec<String> {
        self.envs.borrow().clone()
    }

    /// Working copies installed into one environment, in order.
    pub fn installed_into(&self, env: &str) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::InstallWorkingCopy(name, repo) if name == env => Some(repo.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EnvManager for FakeEnvs {
    fn list_envs(&self) -> anyhow::Result<Vec<String>> {
        self.calls.borrow_mut().push(Call::ListEnvs);
        Ok(self.envs.borrow().clone())
    }

    fn clone_env(&self, source: &str, target: &str) -> anyhow::Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::CloneEnv(source.to_string(), target.to_string()));
        self.envs.borrow_mut().push(target.to_string());
        Ok(())
    }

    fn uninstall(&self, env: &str, package: &str) -> anyhow::Result<UninstallOutcome> {
        self.calls
            .borrow_mut()
            .push(Call::Uninstall(env.to_string(), package.to_string()));
        Ok(UninstallOutcome::NotInstalled)
    }

    fn install_requirements(&self, env: &str, manifest: &Path) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::InstallRequirements(
            env.to_string(),
            manifest.to_path_buf(),
        ));
        Ok(())
    }

    fn install_working_copy(&self, env: &str, repo: &Path) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call::InstallWorkingCopy(
            env.to_string(),
            repo.to_path_buf(),
        ));
        Ok(())
    }
}

/// The calling process's primary group; chgrp to it is always permitted.
pub fn current_group() -> String {
    let output = Command::new("id")
        .arg("-gn")
        .output()
        .expect("id -gn should run");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Build a deployment layout under `root`: working copies with manifests,
/// a head environment with one activation hook, and output roots.
///
/// Packages: pax (primary), hax (head_into_latest), cax.
pub fn test_config(root: &Path) -> DeployConfig {
    let repos = root.join("repos");
    for name in ["pax", "hax", "cax"] {
        let repo = repos.join(name);
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("requirements.txt"), "numpy\nscipy\n").unwrap();
    }

    let envs_root = root.join("envs");
    let hooks = envs_root.join("pax_head").join("etc/conda/activate.d");
    fs::create_dir_all(&hooks).unwrap();
    fs::write(hooks.join("env.sh"), "export PAX=head\n").unwrap();

    DeployConfig {
        primary: "pax".to_string(),
        admin_group: current_group(),
        conda: "conda".to_string(),
        envs: EnvsConfig {
            root: envs_root,
            hooks_subdir: PathBuf::from("etc/conda/activate.d"),
        },
        packages: vec![
            PackageSpec {
                name: "pax".to_string(),
                repo: repos.join("pax"),
                branch: "master".to_string(),
                head_into_latest: false,
            },
            PackageSpec {
                name: "hax".to_string(),
                repo: repos.join("hax"),
                branch: "master".to_string(),
                head_into_latest: true,
            },
            PackageSpec {
                name: "cax".to_string(),
                repo: repos.join("cax"),
                branch: "master".to_string(),
                head_into_latest: false,
            },
        ],
        data: DataConfig {
            processed: root.join("processed"),
            minitrees: root.join("minitrees"),
        },
    }
}
