//! Strata Core Library
//!
//! Provides the domain logic for provisioning versioned analysis
//! environments: deployment configuration, version-tag ordering, the
//! version-control and environment-manager seams, and the provisioning
//! state machine.

pub mod commands;
pub mod config;
pub mod env;
pub mod fs;
pub mod provision;
pub mod vcs;
pub mod version;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, DataConfig, DeployConfig, EnvsConfig, PackageSpec};

    // Environment manager
    pub use crate::env::{CondaCli, EnvManager, EnvSession, UninstallOutcome};

    // Version control
    pub use crate::vcs::{GitCli, VersionControl};

    // Provisioning
    pub use crate::provision::{
        ProvisionError, ProvisionReport, Provisioner, Step, StepOutcome, StepReport,
    };

    // Commands
    pub use crate::commands::{DeployCommand, DeployOptions, StatusCommand, StatusOptions};

    // Version ordering
    pub use crate::version::{TagVersion, latest_tag};
}
