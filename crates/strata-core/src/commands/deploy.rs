//! Deploy command implementation.
//!
//! Wires the provisioner to the real collaborators: the `git` CLI and the
//! configured conda-compatible binary.

use crate::config::{ConfigStore, DeployConfig};
use crate::env::CondaCli;
use crate::provision::{ProvisionReport, Provisioner};
use crate::vcs::GitCli;

/// Options for the deploy command
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Name of the package to deploy
    pub package: String,
    /// Bypass the already-provisioned guard and re-run the remaining steps
    pub force: bool,
}

impl DeployOptions {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Deploy command orchestrator
#[derive(Debug)]
pub struct DeployCommand {
    config: DeployConfig,
}

impl DeployCommand {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    /// Create a deploy command from the discovered configuration.
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(ConfigStore::discover()?.load()?))
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Execute the deploy command
    pub fn execute(&self, options: &DeployOptions) -> anyhow::Result<ProvisionReport> {
        let vcs = GitCli::new();
        let envs = CondaCli::new(self.config.conda.as_str());
        Provisioner::new(&self.config, &vcs, &envs).deploy(&options.package, options.force)
    }
}
