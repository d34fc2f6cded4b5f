//! Status command: read-only view of environments and output directories.
//!
//! Reports what deploy would act on without mutating anything: no pull, no
//! clone, no install.

use serde::Serialize;

use crate::config::{ConfigStore, DeployConfig};
use crate::env::{CondaCli, EnvManager};
use crate::vcs::{GitCli, VersionControl};
use crate::version::latest_tag;

/// Options for the status command
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Restrict the report to one package
    pub package: Option<String>,
}

impl StatusOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

/// Status of one configured package
#[derive(Debug, Clone, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub primary: bool,
    pub head_env: String,
    pub head_env_exists: bool,
    /// Latest-tag details; primary only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged: Option<TaggedStatus>,
}

/// Latest-tag provisioning state of the primary package
#[derive(Debug, Clone, Serialize)]
pub struct TaggedStatus {
    pub tag: String,
    pub environment: String,
    pub environment_exists: bool,
    pub processed_dir_exists: bool,
    pub minitrees_dir_exists: bool,
}

/// Status of every configured package
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub packages: Vec<PackageStatus>,
}

impl StatusReport {
    /// Whether the primary's latest tag is fully provisioned.
    pub fn provisioned(&self) -> bool {
        self.packages
            .iter()
            .filter_map(|p| p.tagged.as_ref())
            .all(|t| t.environment_exists && t.processed_dir_exists && t.minitrees_dir_exists)
    }
}

/// Status command orchestrator
#[derive(Debug)]
pub struct StatusCommand {
    config: DeployConfig,
}

impl StatusCommand {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    /// Create a status command from the discovered configuration.
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(ConfigStore::discover()?.load()?))
    }

    /// Execute the status command
    pub fn execute(&self, options: &StatusOptions) -> anyhow::Result<StatusReport> {
        let vcs = GitCli::new();
        let envs = CondaCli::new(self.config.conda.as_str());
        collect_status(&self.config, &vcs, &envs, options)
    }
}

/// Collect status against explicit collaborators.
pub fn collect_status(
    config: &DeployConfig,
    vcs: &dyn VersionControl,
    envs: &dyn EnvManager,
    options: &StatusOptions,
) -> anyhow::Result<StatusReport> {
    let existing = envs.list_envs()?;
    let mut packages = Vec::new();

    for spec in &config.packages {
        if let Some(filter) = &options.package {
            if &spec.name != filter {
                continue;
            }
        }

        let head_env = config.head_env(&spec.name);
        let head_env_exists = existing.iter().any(|name| name == &head_env);
        let primary = spec.name == config.primary;

        let tagged = if primary {
            let tags = vcs.list_tags(&spec.repo)?;
            latest_tag(&tags).map(|tag| {
                let environment = config.tagged_env(&spec.name, tag);
                TaggedStatus {
                    tag: tag.to_string(),
                    environment_exists: existing.iter().any(|name| name == &environment),
                    processed_dir_exists: config.data.processed.join(&environment).is_dir(),
                    minitrees_dir_exists: config.data.minitrees.join(&environment).is_dir(),
                    environment,
                }
            })
        } else {
            None
        };

        packages.push(PackageStatus {
            name: spec.name.clone(),
            primary,
            head_env,
            head_env_exists,
            tagged,
        });
    }

    Ok(StatusReport { packages })
}
