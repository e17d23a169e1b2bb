// Process launcher port: hand control to the IOC binary
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Replaces the current process with an external program
pub trait ProcessLauncher: Send + Sync {
    /// Exec `program <script>` with `working_dir` as cwd
    ///
    /// The real implementation only returns when the handoff failed; after a
    /// successful exec nothing of this process remains.
    ///
    /// # Errors
    /// - LaunchError::Handoff if the program cannot be executed
    fn exec(&self, program: &str, script: &Path, working_dir: &Path) -> Result<()>;

    /// Resolve `program` the way exec would (PATH lookup for bare names)
    fn resolve(&self, program: &str) -> Option<PathBuf>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::LaunchError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Recorded exec call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ExecCall {
        pub program: String,
        pub script: PathBuf,
        pub working_dir: PathBuf,
    }

    /// Launcher that records calls instead of replacing the process
    #[derive(Default)]
    pub struct MockProcessLauncher {
        installed: HashMap<String, PathBuf>,
        calls: Mutex<Vec<ExecCall>>,
    }

    impl MockProcessLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `program` resolvable at `path`
        pub fn with_program(mut self, program: &str, path: impl Into<PathBuf>) -> Self {
            self.installed.insert(program.to_string(), path.into());
            self
        }

        pub fn calls(&self) -> Vec<ExecCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessLauncher for MockProcessLauncher {
        fn exec(&self, program: &str, script: &Path, working_dir: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(ExecCall {
                program: program.to_string(),
                script: script.to_path_buf(),
                working_dir: working_dir.to_path_buf(),
            });
            if self.installed.contains_key(program) {
                Ok(())
            } else {
                Err(LaunchError::Handoff {
                    program: program.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "No such file or directory",
                    ),
                })
            }
        }

        fn resolve(&self, program: &str) -> Option<PathBuf> {
            self.installed.get(program).cloned()
        }
    }
}
