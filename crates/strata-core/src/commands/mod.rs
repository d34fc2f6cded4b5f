//! High-level commands for strata operations.
//!
//! The public API the CLI drives: deploy (provision a package) and status
//! (read-only inspection).

pub mod deploy;
pub mod status;

pub use deploy::{DeployCommand, DeployOptions};
pub use status::{
    PackageStatus, StatusCommand, StatusOptions, StatusReport, TaggedStatus, collect_status,
};
