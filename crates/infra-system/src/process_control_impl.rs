// Process control implementation
// reason: sysinfo for the process table, nix for signal delivery
use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use sysinfo::{ProcessRefreshKind, ProcessStatus, System, UpdateKind};
use tracing::{debug, info, warn};

use auxioc_core::application::constants::TERMINATION_POLL_INTERVAL;
use auxioc_core::domain::{ProcessInfo, ProcessMatch};
use auxioc_core::port::{ProcessControl, Termination, TimeProvider};
use auxioc_core::{LaunchError, Result};

/// Process control over the host process table
///
/// Matching is `pkill -f` style: substring of the full command line.
/// The calling process and zombies are never reported.
pub struct SysinfoProcessControl {
    system: Mutex<System>,
    time_provider: Arc<dyn TimeProvider>,
    poll_interval: Duration,
}

impl SysinfoProcessControl {
    /// Create a new process control adapter
    ///
    /// # Example
    /// ```ignore
    /// let processes = SysinfoProcessControl::new(Arc::new(MonotonicTimeProvider::new()));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            system: Mutex::new(System::new()),
            time_provider,
            poll_interval: TERMINATION_POLL_INTERVAL,
        }
    }

    fn system(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn to_pid(pid: u32) -> Result<Pid> {
        i32::try_from(pid)
            .map(Pid::from_raw)
            .map_err(|_| LaunchError::Signal {
                pid,
                message: "pid out of range".to_string(),
            })
    }

    /// Deliver `signal`; `Ok(false)` means the process was already gone
    fn signal(pid: u32, target: Pid, signal: Signal) -> Result<bool> {
        match kill(target, signal) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(LaunchError::Signal {
                pid,
                message: format!("{} failed: {}", signal.as_str(), e),
            }),
        }
    }
}

#[async_trait]
impl ProcessControl for SysinfoProcessControl {
    fn find(&self, pattern: &ProcessMatch) -> Result<Vec<ProcessInfo>> {
        let own_pid = sysinfo::get_current_pid().map_err(|e| LaunchError::Probe(e.to_string()))?;

        let mut sys = self.system();
        // Plain refresh_processes() leaves cmd() empty
        sys.refresh_processes_specifics(ProcessRefreshKind::new().with_cmd(UpdateKind::Always));

        let mut found: Vec<ProcessInfo> = sys
            .processes()
            .iter()
            .filter(|(pid, _)| **pid != own_pid)
            .filter(|(_, process)| process.status() != ProcessStatus::Zombie)
            .filter(|(_, process)| pattern.matches(process.name(), process.cmd()))
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string(),
                cmdline: process.cmd().join(" "),
            })
            .collect();
        found.sort_by_key(|p| p.pid);

        debug!(pattern = %pattern, matches = found.len(), "Process table scanned");
        Ok(found)
    }

    /// Kill process with SIGTERM first, then SIGKILL if needed
    async fn terminate(&self, pid: u32, graceful_timeout: Duration) -> Result<Termination> {
        let target = Self::to_pid(pid)?;

        // Step 1: Send SIGTERM for graceful shutdown
        info!(pid = %pid, "Sending SIGTERM for graceful shutdown");
        if !Self::signal(pid, target, Signal::SIGTERM)? {
            return Ok(Termination::AlreadyExited);
        }

        // Step 2: Wait for process to exit
        let timeout_ms = graceful_timeout.as_millis() as i64;
        let start_time = self.time_provider.now_millis();
        loop {
            tokio::time::sleep(self.poll_interval).await;

            if !self.is_alive(pid) {
                info!(pid = %pid, "Process exited gracefully after SIGTERM");
                return Ok(Termination::Graceful);
            }

            // Timeout: force kill with SIGKILL
            if self.time_provider.now_millis() - start_time > timeout_ms {
                warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
                return if Self::signal(pid, target, Signal::SIGKILL)? {
                    Ok(Termination::Forced)
                } else {
                    Ok(Termination::Graceful)
                };
            }
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        let Ok(target) = Self::to_pid(pid) else {
            return false;
        };

        // Signal 0 checks if process exists without actually sending a signal.
        // EPERM still means it exists.
        if let Err(Errno::ESRCH) = kill(target, None::<Signal>) {
            return false;
        }

        // Unreaped children linger as zombies
        let sys_pid = sysinfo::Pid::from_u32(pid);
        let mut sys = self.system();
        if !sys.refresh_process_specifics(sys_pid, ProcessRefreshKind::new()) {
            return false;
        }
        sys.process(sys_pid)
            .map(|process| process.status() != ProcessStatus::Zombie)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auxioc_core::port::time_provider::MonotonicTimeProvider;
    use std::process::{Child, Command};

    fn control() -> SysinfoProcessControl {
        SysinfoProcessControl::new(Arc::new(MonotonicTimeProvider::new()))
    }

    /// `sleep` with a distinctive duration so the command line is unique
    fn spawn_sleeper(marker: &str) -> Child {
        Command::new("sleep").arg(marker).spawn().unwrap()
    }

    #[test]
    fn test_find_spawned_process() {
        let mut child = spawn_sleeper("3601.125");
        let processes = control();

        let found = processes
            .find(&ProcessMatch::new("sleep 3601.125").unwrap())
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pid, child.id());
        assert_eq!(found[0].cmdline, "sleep 3601.125");

        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_find_excludes_self() {
        let own = std::process::id();
        let exe = std::env::current_exe().unwrap();
        let name = exe.file_name().unwrap().to_string_lossy().to_string();
        // $0 of the shell carries our executable name, so both processes match
        let mut child = Command::new("sh")
            .args(["-c", "while :; do sleep 0.1; done"])
            .arg(&name)
            .spawn()
            .unwrap();

        let found = control().find(&ProcessMatch::new(name).unwrap()).unwrap();

        assert!(found.iter().any(|p| p.pid == child.id()));
        assert!(found.iter().all(|p| p.pid != own));

        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_find_reports_command_line() {
        let mut child = spawn_sleeper("3607.875");

        let found = control()
            .find(&ProcessMatch::new("3607.875").unwrap())
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "sleep");
        assert_eq!(found[0].cmdline, "sleep 3607.875");

        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_find_nothing() {
        let found = control()
            .find(&ProcessMatch::new("no-such-process-7f3a9c").unwrap())
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_terminate_graceful() {
        let mut child = spawn_sleeper("3602.25");
        let processes = control();
        assert!(processes.is_alive(child.id()));

        let outcome = processes
            .terminate(child.id(), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(outcome, Termination::Graceful);
        assert!(!processes.is_alive(child.id()));
        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn test_terminate_forced_when_sigterm_ignored() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; while :; do sleep 0.1; done"])
            .spawn()
            .unwrap();
        // Give the shell time to install the trap
        tokio::time::sleep(Duration::from_millis(200)).await;
        let processes = control();

        let outcome = processes
            .terminate(child.id(), Duration::from_millis(300))
            .await
            .unwrap();

        assert_eq!(outcome, Termination::Forced);
        child.wait().unwrap();
    }

    #[tokio::test]
    async fn test_terminate_exited_process() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();

        let outcome = control()
            .terminate(pid, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(outcome, Termination::AlreadyExited);
    }
}
