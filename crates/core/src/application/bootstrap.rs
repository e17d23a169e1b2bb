// Bootstrap service: kill strays → reset scratch → write st.cmd → exec IOC
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{LaunchPlan, ProcessInfo, ProcessMatch, StartupScript};
use crate::error::Result;
use crate::port::{FileStore, ProcessControl, ProcessLauncher, Termination};

/// Whether an auxiliary IOC is running
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IocStatus {
    Running { processes: Vec<ProcessInfo> },
    Stopped,
    /// Probe failed; callers treat this as running
    Unknown { reason: String },
}

impl IocStatus {
    pub fn is_running(&self) -> bool {
        !matches!(self, IocStatus::Stopped)
    }
}

/// Side-effect free readiness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightReport {
    pub ioc_binary: String,
    pub ioc_binary_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub database_present: bool,
    pub script_path: PathBuf,
}

impl PreflightReport {
    pub fn is_ready(&self) -> bool {
        self.ioc_binary_path.is_some() && self.database_present
    }
}

/// Launch sequence over the process, filesystem and exec ports
pub struct Bootstrap {
    processes: Arc<dyn ProcessControl>,
    files: Arc<dyn FileStore>,
    launcher: Arc<dyn ProcessLauncher>,
    script: StartupScript,
}

impl Bootstrap {
    /// Create a bootstrap service writing the embedded startup script
    ///
    /// # Example
    /// ```ignore
    /// let bootstrap = Bootstrap::new(
    ///     Arc::new(SysinfoProcessControl::new(Arc::new(MonotonicTimeProvider::new()))),
    ///     Arc::new(FsFileStore),
    ///     Arc::new(ExecLauncher),
    /// );
    /// bootstrap.run(&LaunchPlan::default()).await?;
    /// ```
    pub fn new(
        processes: Arc<dyn ProcessControl>,
        files: Arc<dyn FileStore>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        Self {
            processes,
            files,
            launcher,
            script: StartupScript::embedded(),
        }
    }

    pub fn script(&self) -> &StartupScript {
        &self.script
    }

    /// Full launch. Returns only if the handoff did not replace this process.
    pub async fn run(&self, plan: &LaunchPlan) -> Result<()> {
        let script_path = self.prepare(plan).await?;

        info!(
            program = %plan.ioc_binary,
            script = %script_path.display(),
            port = ?self.script.server_port(),
            "Handing off to IOC"
        );

        self.launcher
            .exec(&plan.ioc_binary, &script_path, &plan.scratch_dir)
    }

    /// Everything except the handoff; returns the written script path
    pub async fn prepare(&self, plan: &LaunchPlan) -> Result<PathBuf> {
        self.reset_environment(plan).await?;
        self.materialize(plan)
    }

    /// Kill strays, wait the settle delay, recreate the scratch directory
    pub async fn reset_environment(&self, plan: &LaunchPlan) -> Result<()> {
        let killed = self.terminate_matching(plan).await;
        debug!(killed, settle_ms = plan.settle_delay.as_millis() as u64, "Settling");
        tokio::time::sleep(plan.settle_delay).await;

        self.files.reset_dir(&plan.scratch_dir)?;
        info!(dir = %plan.scratch_dir.display(), "Scratch directory recreated");
        Ok(())
    }

    /// Best-effort termination of every process matching the plan's patterns
    ///
    /// Never fails: probe and signal errors are logged and skipped.
    /// Returns the number of processes that were terminated.
    pub async fn terminate_matching(&self, plan: &LaunchPlan) -> usize {
        // Deduplicate across patterns
        let mut targets: BTreeMap<u32, ProcessInfo> = BTreeMap::new();
        for pattern in &plan.kill_patterns {
            match self.processes.find(pattern) {
                Ok(found) => {
                    for process in found {
                        targets.insert(process.pid, process);
                    }
                }
                Err(e) => warn!(pattern = %pattern, error = %e, "Process lookup failed"),
            }
        }

        if targets.is_empty() {
            info!(patterns = ?plan.kill_patterns, "No stray processes to terminate");
            return 0;
        }

        let mut killed = 0;
        for (pid, process) in targets {
            info!(pid, cmdline = %process.cmdline, "Terminating stray process");
            match self.processes.terminate(pid, plan.graceful_timeout).await {
                Ok(Termination::AlreadyExited) => debug!(pid, "Process already exited"),
                Ok(outcome) => {
                    debug!(pid, ?outcome, "Process terminated");
                    killed += 1;
                }
                Err(e) => warn!(pid, error = %e, "Failed to terminate process"),
            }
        }
        killed
    }

    /// Write the startup script into the scratch directory
    pub fn materialize(&self, plan: &LaunchPlan) -> Result<PathBuf> {
        let path = self.script.path_in(&plan.scratch_dir);
        self.files.write_executable(&path, self.script.as_bytes())?;
        info!(
            path = %path.display(),
            bytes = self.script.as_bytes().len(),
            "Startup script written"
        );
        Ok(path)
    }

    /// Probe for a running IOC
    pub fn status(&self, patterns: &[ProcessMatch]) -> IocStatus {
        let mut found: BTreeMap<u32, ProcessInfo> = BTreeMap::new();
        for pattern in patterns {
            match self.processes.find(pattern) {
                Ok(list) => {
                    for process in list {
                        found.insert(process.pid, process);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Error checking for IOC process");
                    return IocStatus::Unknown {
                        reason: e.to_string(),
                    };
                }
            }
        }

        if found.is_empty() {
            IocStatus::Stopped
        } else {
            IocStatus::Running {
                processes: found.into_values().collect(),
            }
        }
    }

    /// Check binary and database availability without touching anything
    pub fn preflight(&self, plan: &LaunchPlan) -> PreflightReport {
        let database_path = self.script.database_path();
        let database_present = database_path
            .as_deref()
            .map(|p| self.files.exists(p))
            .unwrap_or(false);

        PreflightReport {
            ioc_binary: plan.ioc_binary.clone(),
            ioc_binary_path: self.launcher.resolve(&plan.ioc_binary),
            database_path,
            database_present,
            script_path: self.script.path_in(&plan.scratch_dir),
        }
    }
}
