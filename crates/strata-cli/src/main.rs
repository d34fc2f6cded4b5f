//! Strata - Analysis Environment Deployment
//!
//! Usage:
//!   strata deploy <package>   # Provision a package into its environments
//!   strata status             # Show environment and directory state

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strata_core::commands::{
    DeployCommand, DeployOptions, PackageStatus, StatusCommand, StatusOptions, StatusReport,
};
use strata_core::config::ConfigStore;
use strata_core::provision::{ProvisionReport, StepOutcome};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Analysis environment deployment", long_about = None)]
struct Cli {
    /// Path to strata.toml (defaults to ./strata.toml, then the user config
    /// directory)
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a package into its environments
    Deploy {
        /// Name of the package to deploy
        package: String,

        /// Re-enter an already-provisioned environment and re-run the
        /// remaining steps
        #[arg(long, short)]
        force: bool,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show environment and output-directory state (read-only)
    Status {
        /// Restrict the report to one package
        #[arg(long, short)]
        package: Option<String>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// No output; exit status only
    Quiet,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strata=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
    info!(host = %hostname, "strata starting");

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy {
            package,
            force,
            format,
        } => {
            let command = deploy_command(cli.config)?;
            let options = DeployOptions::new(package).with_force(force);
            let report = command.execute(&options)?;
            print_deploy_report(&report, format)?;
        }
        Commands::Status { package, format } => {
            let command = status_command(cli.config)?;
            let mut options = StatusOptions::new();
            if let Some(package) = package {
                options = options.with_package(package);
            }
            let report = command.execute(&options)?;
            print_status_report(&report, format)?;
            // Quiet mode: exit status carries the verdict.
            if matches!(format, OutputFormat::Quiet) && !report.provisioned() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn deploy_command(config: Option<PathBuf>) -> Result<DeployCommand> {
    match config {
        Some(path) => Ok(DeployCommand::new(ConfigStore::from_path(path).load()?)),
        None => DeployCommand::with_defaults(),
    }
}

fn status_command(config: Option<PathBuf>) -> Result<StatusCommand> {
    match config {
        Some(path) => Ok(StatusCommand::new(ConfigStore::from_path(path).load()?)),
        None => StatusCommand::with_defaults(),
    }
}

fn print_deploy_report(report: &ProvisionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if report.changed() {
                println!("✓ Deployed '{}'", report.package);
            } else {
                println!("• '{}' is already provisioned", report.package);
            }
            if let (Some(tag), Some(env)) = (&report.tag, &report.environment) {
                println!("  Tag {} -> environment {}", tag, env);
            }
            for step in &report.steps {
                let symbol = outcome_symbol(step.outcome);
                match &step.detail {
                    Some(detail) => {
                        println!("  {} {} ({})", symbol, step.step.describe(), detail)
                    }
                    None => println!("  {} {}", symbol, step.step.describe()),
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn outcome_symbol(outcome: StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Changed => "✓",
        StepOutcome::AlreadyDone => "•",
        StepOutcome::Skipped => "-",
    }
}

fn print_status_report(report: &StatusReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print_status_table(&report.packages);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn print_status_table(packages: &[PackageStatus]) {
    if packages.is_empty() {
        println!("No packages configured.");
        return;
    }

    println!(
        "{:<12} {:<8} {:<20} {:<8} Latest",
        "Package", "Role", "Head Env", "Present"
    );
    println!("{}", "-".repeat(70));

    for package in packages {
        let role = if package.primary { "primary" } else { "companion" };
        let present = if package.head_env_exists { "yes" } else { "no" };
        let latest = match &package.tagged {
            Some(tagged) => {
                let env = if tagged.environment_exists {
                    "provisioned"
                } else {
                    "missing"
                };
                format!("{} ({})", tagged.tag, env)
            }
            None => "-".to_string(),
        };

        println!(
            "{:<12} {:<8} {:<20} {:<8} {}",
            package.name, role, package.head_env, present, latest
        );
    }

    for package in packages {
        let Some(tagged) = &package.tagged else {
            continue;
        };
        if !tagged.processed_dir_exists || !tagged.minitrees_dir_exists {
            println!();
            println!(
                "Output directories for {} incomplete (processed: {}, minitrees: {})",
                tagged.environment,
                exists_str(tagged.processed_dir_exists),
                exists_str(tagged.minitrees_dir_exists)
            );
        }
    }
}

fn exists_str(exists: bool) -> &'static str {
    if exists { "present" } else { "missing" }
}
