//! Deployment configuration (`strata.toml`).
//!
//! Declares the primary package, its companions, the environment root, and
//! the output directory trees. Loaded from an explicit path, `./strata.toml`,
//! or the user config directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// File name looked up during discovery.
const CONFIG_FILE: &str = "strata.toml";

/// Root configuration structure for strata.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Name of the primary package (full versioned-environment lifecycle).
    pub primary: String,

    /// Group given recursive ownership of provisioned output directories.
    pub admin_group: String,

    /// Environment-manager binary (conda-compatible).
    #[serde(default = "default_conda_binary")]
    pub conda: String,

    /// Environment layout
    pub envs: EnvsConfig,

    /// Managed packages, primary included
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageSpec>,

    /// Output directory trees provisioned per tag
    pub data: DataConfig,
}

/// Environment layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvsConfig {
    /// Directory containing the runtime environments.
    pub root: PathBuf,

    /// Activation-hooks directory, relative to an environment root.
    #[serde(default = "default_hooks_subdir")]
    pub hooks_subdir: PathBuf,
}

/// One managed package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Package name; environments are named `<name>_head` and `<name>_<tag>`.
    pub name: String,

    /// Working-copy checkout the package installs from.
    pub repo: PathBuf,

    /// Mainline branch restored after a tag checkout.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Install this package's head copy into the primary's latest tagged
    /// environment when deploying it. Only meaningful on companions.
    #[serde(default)]
    pub head_into_latest: bool,
}

/// Output directory roots, each receiving a `<primary>_<tag>` subdirectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root of the processed-data tree.
    pub processed: PathBuf,

    /// Root of the minitree tree.
    pub minitrees: PathBuf,
}

fn default_conda_binary() -> String {
    "conda".to_string()
}

fn default_hooks_subdir() -> PathBuf {
    PathBuf::from("etc/conda/activate.d")
}

fn default_branch() -> String {
    "master".to_string()
}

impl DeployConfig {
    /// Look up a package by name.
    pub fn package(&self, name: &str) -> Option<&PackageSpec> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// The primary package's spec.
    pub fn primary_package(&self) -> anyhow::Result<&PackageSpec> {
        self.package(&self.primary).ok_or_else(|| {
            anyhow::anyhow!("primary package '{}' is not declared", self.primary)
        })
    }

    /// All non-primary packages, in declaration order.
    pub fn companions(&self) -> impl Iterator<Item = &PackageSpec> {
        self.packages.iter().filter(|p| p.name != self.primary)
    }

    /// Name of a package's head environment.
    pub fn head_env(&self, package: &str) -> String {
        format!("{}_head", package)
    }

    /// Name of a package's environment for a released tag.
    pub fn tagged_env(&self, package: &str, tag: &str) -> String {
        format!("{}_{}", package, tag)
    }

    /// On-disk root of a named environment.
    pub fn env_dir(&self, env: &str) -> PathBuf {
        self.envs.root.join(env)
    }

    /// Activation-hooks directory of a named environment.
    pub fn hooks_dir(&self, env: &str) -> PathBuf {
        self.env_dir(env).join(&self.envs.hooks_subdir)
    }

    /// Reject configurations the provisioner cannot act on.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.primary.is_empty() {
            anyhow::bail!("primary package name is empty");
        }
        if self.admin_group.is_empty() {
            anyhow::bail!("admin_group is empty");
        }
        for package in &self.packages {
            if package.name.is_empty() {
                anyhow::bail!("a package entry has an empty name");
            }
            let duplicates = self
                .packages
                .iter()
                .filter(|p| p.name == package.name)
                .count();
            if duplicates > 1 {
                anyhow::bail!("package '{}' is declared more than once", package.name);
            }
        }
        let primary = self.primary_package()?;
        if primary.head_into_latest {
            anyhow::bail!(
                "head_into_latest is set on the primary package '{}'",
                self.primary
            );
        }
        Ok(())
    }
}

/// Loads strata.toml from a known location.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Locate the configuration: `./strata.toml` first, then the user
    /// config directory.
    pub fn discover() -> anyhow::Result<Self> {
        let local = std::env::current_dir()?.join(CONFIG_FILE);
        if local.exists() {
            return Ok(Self::from_path(local));
        }
        let global = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("strata")
            .join(CONFIG_FILE);
        Ok(Self::from_path(global))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<DeployConfig> {
        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!(
                "Failed to read config file: {}",
                self.config_path.display()
            )
        })?;
        let config: DeployConfig = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })?;
        config.validate().with_context(|| {
            format!("Invalid configuration: {}", self.config_path.display())
        })?;
        Ok(config)
    }
}
