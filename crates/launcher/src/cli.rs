//! Command-line surface and its mapping onto a `LaunchPlan`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use auxioc_core::application::constants::{
    DEFAULT_IOC_BINARY, DEFAULT_KILL_PATTERN, DEFAULT_SCRATCH_DIR, GRACEFUL_SHUTDOWN_TIMEOUT,
};
use auxioc_core::domain::{LaunchPlan, ProcessMatch};

#[derive(Parser, Debug)]
#[command(name = "start-auxioc")]
#[command(about = "Kill stray IOCs, regenerate st.cmd and exec the auxiliary soft IOC", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Scratch directory recreated on every launch
    #[arg(long, global = true, env = "AUXIOC_SCRATCH_DIR", default_value = DEFAULT_SCRATCH_DIR)]
    pub scratch_dir: String,

    /// IOC executable (resolved through PATH)
    #[arg(long, global = true, env = "AUXIOC_IOC_BINARY", default_value = DEFAULT_IOC_BINARY)]
    pub ioc_binary: String,

    /// Command-line substring of processes to kill before launch
    #[arg(
        long,
        global = true,
        env = "AUXIOC_KILL_PATTERN",
        value_delimiter = ',',
        default_value = DEFAULT_KILL_PATTERN
    )]
    pub kill_pattern: Vec<String>,

    /// Wait after termination signals, in milliseconds
    #[arg(long, global = true, env = "AUXIOC_SETTLE_MS", default_value = "1000")]
    pub settle_ms: u64,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reset the scratch area and exec the IOC (default)
    Launch {
        /// Stop after writing st.cmd; print its path instead of exec'ing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check IOC binary and record database without side effects
    Check {
        #[arg(long)]
        json: bool,
    },

    /// Report whether an auxiliary IOC is running
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Print the embedded startup script
    Render,
}

impl Cli {
    /// Subcommand to run; bare invocation launches
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Launch { dry_run: false })
    }

    pub fn plan(&self) -> Result<LaunchPlan> {
        let kill_patterns = self
            .kill_pattern
            .iter()
            .map(|p| ProcessMatch::new(p.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --kill-pattern")?;

        Ok(LaunchPlan {
            scratch_dir: PathBuf::from(shellexpand::tilde(&self.scratch_dir).into_owned()),
            kill_patterns,
            settle_delay: Duration::from_millis(self.settle_ms),
            graceful_timeout: GRACEFUL_SHUTDOWN_TIMEOUT,
            ioc_binary: self.ioc_binary.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("start-auxioc").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_bare_invocation_is_fixed_launch() {
        let cli = parse(&[]);
        assert_eq!(cli.command(), Commands::Launch { dry_run: false });

        let plan = cli.plan().unwrap();
        let default = LaunchPlan::default();
        assert_eq!(plan.scratch_dir, default.scratch_dir);
        assert_eq!(plan.kill_patterns, default.kill_patterns);
        assert_eq!(plan.settle_delay, default.settle_delay);
        assert_eq!(plan.ioc_binary, default.ioc_binary);
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&[
            "launch",
            "--dry-run",
            "--scratch-dir",
            "/var/tmp/aux",
            "--kill-pattern",
            "softIoc,auxioc",
            "--settle-ms",
            "0",
        ]);

        assert_eq!(cli.command(), Commands::Launch { dry_run: true });
        let plan = cli.plan().unwrap();
        assert_eq!(plan.scratch_dir, PathBuf::from("/var/tmp/aux"));
        assert_eq!(plan.kill_patterns.len(), 2);
        assert_eq!(plan.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_tilde_expansion() {
        let cli = parse(&["--scratch-dir", "~/auxioc"]);
        let plan = cli.plan().unwrap();
        assert!(!plan.scratch_dir.to_string_lossy().starts_with('~'));
        assert!(plan.scratch_dir.ends_with("auxioc"));
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["render"]).command(), Commands::Render);
        assert_eq!(
            parse(&["status", "--json"]).command(),
            Commands::Status { json: true }
        );
        assert_eq!(
            parse(&["check"]).command(),
            Commands::Check { json: false }
        );
    }
}
