//! start-auxioc - launcher for the auxiliary EPICS soft IOC
//!
//! Kills stray IOCs, recreates the scratch directory, writes `st.cmd` and
//! replaces itself with `softIoc st.cmd`.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use auxioc_core::application::constants::STATUS_PATTERNS;
use auxioc_core::application::{Bootstrap, IocStatus, PreflightReport};
use auxioc_core::domain::{LaunchPlan, ProcessMatch};
use auxioc_core::port::time_provider::MonotonicTimeProvider;
use auxioc_infra_system::{ExecLauncher, FsFileStore, SysinfoProcessControl};

use crate::cli::{Cli, Commands};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    logging::init_logging()?;

    // 2. Load configuration
    let plan = cli.plan()?;

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(MonotonicTimeProvider::new());
    let bootstrap = Bootstrap::new(
        Arc::new(SysinfoProcessControl::new(time_provider)),
        Arc::new(FsFileStore),
        Arc::new(ExecLauncher),
    );

    match cli.command() {
        Commands::Launch { dry_run } => launch(&bootstrap, &plan, dry_run).await,
        Commands::Check { json } => check(&bootstrap, &plan, json),
        Commands::Status { json } => status(&bootstrap, json),
        Commands::Render => {
            print!("{}", bootstrap.script().contents());
            Ok(())
        }
    }
}

async fn launch(bootstrap: &Bootstrap, plan: &LaunchPlan, dry_run: bool) -> Result<()> {
    info!(
        version = VERSION,
        scratch_dir = %plan.scratch_dir.display(),
        ioc_binary = %plan.ioc_binary,
        dry_run,
        "Starting auxiliary IOC"
    );

    if dry_run {
        let path = bootstrap
            .prepare(plan)
            .await
            .context("Failed to prepare IOC scratch directory")?;
        println!("{}", path.display());
        return Ok(());
    }

    // Only returns if exec failed
    bootstrap
        .run(plan)
        .await
        .with_context(|| format!("Failed to start {}", plan.ioc_binary))
}

fn check(bootstrap: &Bootstrap, plan: &LaunchPlan, json: bool) -> Result<()> {
    let report = bootstrap.preflight(plan);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(bootstrap, &report);
    }

    if !report.is_ready() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(bootstrap: &Bootstrap, report: &PreflightReport) {
    println!("{}", "AuxIOC Preflight".cyan().bold());
    println!();

    match &report.ioc_binary_path {
        Some(path) => println!(
            "  {} {} ({})",
            "IOC binary:".bold(),
            report.ioc_binary,
            path.display().to_string().green()
        ),
        None => println!(
            "  {} {} ({})",
            "IOC binary:".bold(),
            report.ioc_binary,
            "NOT FOUND".red()
        ),
    }

    let database = report
        .database_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());
    let presence = if report.database_present {
        "present".green()
    } else {
        "MISSING".red()
    };
    println!("  {} {} ({})", "Database:".bold(), database, presence);
    println!("  {} {}", "Script:".bold(), report.script_path.display());

    let script = bootstrap.script();
    println!(
        "  {} port {}, addr list {}",
        "Channel Access:".bold(),
        script
            .server_port()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "default".to_string()),
        script.addr_list().join(" ")
    );
}

fn status(bootstrap: &Bootstrap, json: bool) -> Result<()> {
    let patterns = STATUS_PATTERNS
        .iter()
        .map(|p| ProcessMatch::new(*p))
        .collect::<Result<Vec<_>, _>>()?;

    let status = bootstrap.status(&patterns);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", "AuxIOC Status".cyan().bold());
        println!();
        match &status {
            IocStatus::Running { processes } => {
                println!("  {} {}", "Status:".bold(), "RUNNING".green());
                for process in processes {
                    println!("  {} {}", format!("{:>7}", process.pid).bold(), process.cmdline);
                }
            }
            IocStatus::Stopped => {
                println!("  {} {}", "Status:".bold(), "STOPPED".red());
                println!("  Start it with: start-auxioc");
            }
            IocStatus::Unknown { reason } => {
                println!("  {} {}", "Status:".bold(), "UNKNOWN".yellow());
                println!("  {} {}", "Error:".bold(), reason);
            }
        }
    }

    if !status.is_running() {
        std::process::exit(1);
    }
    Ok(())
}
