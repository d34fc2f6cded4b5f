//! Environment-manager seam and session handles.
//!
//! Every operation names its environment explicitly; there is no
//! process-wide "active environment".

pub mod conda;

pub use conda::CondaCli;

use std::path::Path;

/// Outcome of removing a package from an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// A previous copy was removed.
    Removed,
    /// Nothing to remove.
    NotInstalled,
}

/// Operations the provisioner needs from the environment manager.
pub trait EnvManager {
    /// Names of all existing environments.
    fn list_envs(&self) -> anyhow::Result<Vec<String>>;

    /// Create `target` as a clone of `source`.
    fn clone_env(&self, source: &str, target: &str) -> anyhow::Result<()>;

    /// Remove a package from an environment; absence is not an error.
    fn uninstall(&self, env: &str, package: &str) -> anyhow::Result<UninstallOutcome>;

    /// Install a dependency manifest into an environment.
    fn install_requirements(&self, env: &str, manifest: &Path) -> anyhow::Result<()>;

    /// Install a working copy into an environment.
    fn install_working_copy(&self, env: &str, repo: &Path) -> anyhow::Result<()>;
}

/// Handle binding install operations to one named environment.
///
/// The environment a command runs in is carried by the value, never by
/// process-wide activation state.
pub struct EnvSession<'a> {
    manager: &'a dyn EnvManager,
    name: String,
}

impl<'a> EnvSession<'a> {
    pub fn new(manager: &'a dyn EnvManager, name: impl Into<String>) -> Self {
        Self {
            manager,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uninstall(&self, package: &str) -> anyhow::Result<UninstallOutcome> {
        self.manager.uninstall(&self.name, package)
    }

    pub fn install_requirements(&self, manifest: &Path) -> anyhow::Result<()> {
        self.manager.install_requirements(&self.name, manifest)
    }

    pub fn install_working_copy(&self, repo: &Path) -> anyhow::Result<()> {
        self.manager.install_working_copy(&self.name, repo)
    }
}
