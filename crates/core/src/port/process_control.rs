// Process control port: find and terminate processes by pattern
use async_trait::async_trait;
use std::time::Duration;

use crate::domain::{ProcessInfo, ProcessMatch};
use crate::error::Result;

/// Outcome of terminating one process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited after SIGTERM
    Graceful,
    /// Still alive after the graceful timeout, SIGKILL sent
    Forced,
    /// Already gone before any signal was delivered
    AlreadyExited,
}

/// Process table access
///
/// Implementations must never report the calling process itself.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// List running processes matching `pattern`
    ///
    /// # Errors
    /// - LaunchError::Probe if the process table cannot be read
    fn find(&self, pattern: &ProcessMatch) -> Result<Vec<ProcessInfo>>;

    /// SIGTERM, wait up to `graceful_timeout`, then SIGKILL
    ///
    /// # Errors
    /// - LaunchError::Signal if a signal cannot be delivered (e.g. EPERM)
    async fn terminate(&self, pid: u32, graceful_timeout: Duration) -> Result<Termination>;

    /// Check if a process is still alive
    fn is_alive(&self, pid: u32) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::LaunchError;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// In-memory process table
    #[derive(Default)]
    pub struct MockProcessControl {
        table: Arc<Mutex<Vec<(ProcessInfo, Vec<String>)>>>,
        refuse: Arc<Mutex<HashSet<u32>>>,
        terminated: Arc<Mutex<Vec<u32>>>,
        probe_broken: Arc<Mutex<bool>>,
    }

    impl MockProcessControl {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_process(self, pid: u32, cmdline: &[&str]) -> Self {
            let cmd: Vec<String> = cmdline.iter().map(|s| s.to_string()).collect();
            let info = ProcessInfo {
                pid,
                name: cmd.first().cloned().unwrap_or_default(),
                cmdline: cmd.join(" "),
            };
            self.table.lock().unwrap().push((info, cmd));
            self
        }

        /// Signals to `pid` fail with EPERM
        pub fn refuse_signals(self, pid: u32) -> Self {
            self.refuse.lock().unwrap().insert(pid);
            self
        }

        /// Every `find` fails
        pub fn break_probe(self) -> Self {
            *self.probe_broken.lock().unwrap() = true;
            self
        }

        pub fn terminated(&self) -> Vec<u32> {
            self.terminated.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessControl for MockProcessControl {
        fn find(&self, pattern: &ProcessMatch) -> Result<Vec<ProcessInfo>> {
            if *self.probe_broken.lock().unwrap() {
                return Err(LaunchError::Probe("mock probe failure".to_string()));
            }
            Ok(self
                .table
                .lock()
                .unwrap()
                .iter()
                .filter(|(info, cmd)| pattern.matches(&info.name, cmd))
                .map(|(info, _)| info.clone())
                .collect())
        }

        async fn terminate(&self, pid: u32, _graceful_timeout: Duration) -> Result<Termination> {
            if self.refuse.lock().unwrap().contains(&pid) {
                return Err(LaunchError::Signal {
                    pid,
                    message: "EPERM: Operation not permitted".to_string(),
                });
            }
            let mut table = self.table.lock().unwrap();
            let before = table.len();
            table.retain(|(info, _)| info.pid != pid);
            if table.len() == before {
                return Ok(Termination::AlreadyExited);
            }
            self.terminated.lock().unwrap().push(pid);
            Ok(Termination::Graceful)
        }

        fn is_alive(&self, pid: u32) -> bool {
            self.table
                .lock()
                .unwrap()
                .iter()
                .any(|(info, _)| info.pid == pid)
        }
    }
}
