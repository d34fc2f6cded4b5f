//! The environment provisioner.
//!
//! A linear state machine per invocation:
//! head install, then for companions an optional head-into-latest install,
//! and for the primary tag resolution, the idempotence guard, environment
//! creation, companion installs, hook linking, and output-directory
//! provisioning. Every step records an explicit outcome; every step is
//! idempotent so an interrupted run can be re-invoked.

mod report;

pub use report::{ProvisionReport, Step, StepOutcome, StepReport};

use std::path::PathBuf;

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{DeployConfig, PackageSpec};
use crate::env::{EnvManager, EnvSession, UninstallOutcome};
use crate::fs::{DirOutcome, link_hooks, provision_dir};
use crate::vcs::VersionControl;
use crate::version::latest_tag;

/// Fatal setup errors that abort a run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("package '{0}' is not declared in the configuration")]
    UnknownPackage(String),

    #[error("missing dependency manifest: {0}")]
    MissingManifest(PathBuf),

    #[error("no version tags in repository: {0}")]
    NoTags(PathBuf),
}

/// Drives one deployment run against the configured collaborators.
pub struct Provisioner<'a> {
    config: &'a DeployConfig,
    vcs: &'a dyn VersionControl,
    envs: &'a dyn EnvManager,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        config: &'a DeployConfig,
        vcs: &'a dyn VersionControl,
        envs: &'a dyn EnvManager,
    ) -> Self {
        Self { config, vcs, envs }
    }

    /// Deploy one package.
    ///
    /// `force` bypasses the already-provisioned guard and re-runs the
    /// remaining steps against the existing tagged environment.
    pub fn deploy(&self, package: &str, force: bool) -> anyhow::Result<ProvisionReport> {
        let spec = self
            .config
            .package(package)
            .ok_or_else(|| ProvisionError::UnknownPackage(package.to_string()))?;
        let mut report = ProvisionReport::new(&spec.name);

        self.head_install(spec, &mut report)?;

        if spec.name != self.config.primary {
            if spec.head_into_latest {
                self.head_into_latest(spec, &mut report)?;
            }
            return Ok(report);
        }

        self.provision_latest(spec, force, &mut report)?;
        Ok(report)
    }

    /// Step 1: reinstall the package's head environment copy.
    fn head_install(
        &self,
        spec: &PackageSpec,
        report: &mut ProvisionReport,
    ) -> anyhow::Result<()> {
        let head = self.config.head_env(&spec.name);
        info!(package = %spec.name, environment = %head, "reinstalling head copy");
        let session = EnvSession::new(self.envs, head);

        let removed = session.uninstall(&spec.name).with_context(|| {
            format!(
                "Failed to uninstall '{}' from {}",
                spec.name,
                session.name()
            )
        })?;

        let manifest = spec.repo.join("requirements.txt");
        if !manifest.is_file() {
            return Err(ProvisionError::MissingManifest(manifest).into());
        }
        session.install_requirements(&manifest).with_context(|| {
            format!("Failed to install manifest into {}", session.name())
        })?;
        session.install_working_copy(&spec.repo).with_context(|| {
            format!(
                "Failed to install {} into {}",
                spec.repo.display(),
                session.name()
            )
        })?;

        let detail = match removed {
            UninstallOutcome::Removed => "previous copy removed",
            UninstallOutcome::NotInstalled => "no previous copy",
        };
        report.record_with(Step::HeadInstall, StepOutcome::Changed, detail);
        Ok(())
    }

    /// Step 2: install a companion's head copy into the primary's latest
    /// tagged environment, when that environment exists.
    fn head_into_latest(
        &self,
        spec: &PackageSpec,
        report: &mut ProvisionReport,
    ) -> anyhow::Result<()> {
        let primary = self.config.primary_package()?;
        let tags = self.vcs.list_tags(&primary.repo)?;
        let Some(tag) = latest_tag(&tags) else {
            debug!(package = %spec.name, "primary repository has no tags");
            report.record_with(
                Step::HeadIntoLatest,
                StepOutcome::Skipped,
                "primary repository has no tags",
            );
            return Ok(());
        };

        let env_name = self.config.tagged_env(&primary.name, tag);
        let existing = self.envs.list_envs().context("Failed to list environments")?;
        if !existing.iter().any(|name| name == &env_name) {
            report.record_with(
                Step::HeadIntoLatest,
                StepOutcome::Skipped,
                format!("environment {} does not exist", env_name),
            );
            return Ok(());
        }

        info!(package = %spec.name, environment = %env_name, "installing head copy into tagged environment");
        let session = EnvSession::new(self.envs, env_name);
        session.install_working_copy(&spec.repo).with_context(|| {
            format!(
                "Failed to install {} into {}",
                spec.repo.display(),
                session.name()
            )
        })?;
        report.record_with(
            Step::HeadIntoLatest,
            StepOutcome::Changed,
            session.name().to_string(),
        );
        Ok(())
    }

    /// Steps 3-7: resolve the latest tag and provision its environment.
    fn provision_latest(
        &self,
        spec: &PackageSpec,
        force: bool,
        report: &mut ProvisionReport,
    ) -> anyhow::Result<()> {
        self.vcs
            .pull(&spec.repo)
            .with_context(|| format!("Failed to pull {}", spec.repo.display()))?;
        let tags = self.vcs.list_tags(&spec.repo)?;
        let tag = latest_tag(&tags)
            .ok_or_else(|| ProvisionError::NoTags(spec.repo.clone()))?
            .to_string();
        let env_name = self.config.tagged_env(&spec.name, &tag);
        info!(tag = %tag, environment = %env_name, "resolved latest tag");
        report.tag = Some(tag.clone());
        report.environment = Some(env_name.clone());

        let existing = self.envs.list_envs().context("Failed to list environments")?;
        let present = existing.iter().any(|name| name == &env_name);
        if present && !force {
            info!(environment = %env_name, "already provisioned, nothing to do");
            report.record_with(Step::CloneEnv, StepOutcome::AlreadyDone, "already provisioned");
            return Ok(());
        }

        if present {
            report.record_with(
                Step::CloneEnv,
                StepOutcome::AlreadyDone,
                "re-entering existing environment",
            );
        } else {
            let head = self.config.head_env(&spec.name);
            info!(source = %head, target = %env_name, "cloning baseline environment");
            self.envs
                .clone_env(&head, &env_name)
                .with_context(|| format!("Failed to clone {} into {}", head, env_name))?;
            report.record(Step::CloneEnv, StepOutcome::Changed);
        }

        let session = EnvSession::new(self.envs, env_name.clone());
        self.vcs
            .checkout(&spec.repo, &tag)
            .with_context(|| format!("Failed to check out tag {}", tag))?;
        session.install_working_copy(&spec.repo).with_context(|| {
            format!("Failed to install {} at {}", spec.name, tag)
        })?;
        self.vcs
            .checkout(&spec.repo, &spec.branch)
            .with_context(|| format!("Failed to restore branch {}", spec.branch))?;
        report.record_with(Step::InstallTagged, StepOutcome::Changed, tag);

        let mut installed = Vec::new();
        for companion in self.config.companions() {
            self.vcs
                .pull(&companion.repo)
                .with_context(|| format!("Failed to pull {}", companion.repo.display()))?;
            session.install_working_copy(&companion.repo).with_context(|| {
                format!(
                    "Failed to install companion {} into {}",
                    companion.name,
                    session.name()
                )
            })?;
            installed.push(companion.name.as_str());
        }
        if installed.is_empty() {
            report.record_with(
                Step::InstallCompanions,
                StepOutcome::Skipped,
                "no companions declared",
            );
        } else {
            report.record_with(
                Step::InstallCompanions,
                StepOutcome::Changed,
                installed.join(", "),
            );
        }

        self.link_hooks(spec, &env_name, report)?;
        self.provision_dirs(&env_name, report)?;
        Ok(())
    }

    /// Step 6: hard-link activation hooks from the head environment.
    fn link_hooks(
        &self,
        spec: &PackageSpec,
        env_name: &str,
        report: &mut ProvisionReport,
    ) -> anyhow::Result<()> {
        let head = self.config.head_env(&spec.name);
        let src = self.config.hooks_dir(&head);
        if !src.is_dir() {
            report.record_with(
                Step::LinkHooks,
                StepOutcome::Skipped,
                "baseline has no hooks directory",
            );
            return Ok(());
        }

        let dst = self.config.hooks_dir(env_name);
        let linked = link_hooks(&src, &dst)?;
        debug!(linked = linked.linked, replaced = linked.replaced, "linked activation hooks");
        report.record_with(
            Step::LinkHooks,
            StepOutcome::Changed,
            format!("{} linked, {} replaced", linked.linked, linked.replaced),
        );
        Ok(())
    }

    /// Step 7: create the output directories and hand them to the
    /// administrative group.
    fn provision_dirs(
        &self,
        env_name: &str,
        report: &mut ProvisionReport,
    ) -> anyhow::Result<()> {
        let mut created = 0;
        let mut dirs = Vec::new();
        for root in [&self.config.data.processed, &self.config.data.minitrees] {
            let dir = root.join(env_name);
            let outcome = provision_dir(&dir, &self.config.admin_group)?;
            if outcome == DirOutcome::Created {
                created += 1;
            }
            dirs.push(dir.display().to_string());
        }
        let outcome = if created > 0 {
            StepOutcome::Changed
        } else {
            StepOutcome::AlreadyDone
        };
        report.record_with(Step::ProvisionDirs, outcome, dirs.join(", "));
        Ok(())
    }
}
