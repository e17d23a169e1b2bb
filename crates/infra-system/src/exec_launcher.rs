// Process image replacement via execvp
use std::env;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::error;

use auxioc_core::port::ProcessLauncher;
use auxioc_core::{LaunchError, Result};

/// Launcher that replaces the current process with the IOC
///
/// Exit code and signal behaviour of the IOC become this process's own.
pub struct ExecLauncher;

impl ExecLauncher {
    fn is_executable(path: &Path) -> bool {
        path.metadata()
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
}

impl ProcessLauncher for ExecLauncher {
    fn exec(&self, program: &str, script: &Path, working_dir: &Path) -> Result<()> {
        // exec only returns on failure
        let source = Command::new(program)
            .arg(script)
            .current_dir(working_dir)
            .exec();

        error!(program = %program, error = %source, "Handoff failed");
        Err(LaunchError::Handoff {
            program: program.to_string(),
            source,
        })
    }

    fn resolve(&self, program: &str) -> Option<PathBuf> {
        if program.contains('/') {
            let path = PathBuf::from(program);
            return Self::is_executable(&path).then_some(path);
        }

        env::var_os("PATH").and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join(program))
                .find(|candidate| Self::is_executable(candidate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_on_path() {
        let resolved = ExecLauncher.resolve("sh").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("sh"));
    }

    #[test]
    fn test_resolve_missing() {
        assert!(ExecLauncher.resolve("softIoc-not-installed-4b1d").is_none());
    }

    #[test]
    fn test_resolve_explicit_path() {
        let root = tempfile::tempdir().unwrap();
        let script = root.path().join("fake-ioc");
        fs::write(&script, b"#!/bin/sh\n").unwrap();
        let path = script.to_str().unwrap();

        // Not executable yet
        assert!(ExecLauncher.resolve(path).is_none());

        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(ExecLauncher.resolve(path), Some(script.clone()));
    }

    #[test]
    fn test_exec_missing_binary_returns_error() {
        let root = tempfile::tempdir().unwrap();

        let result = ExecLauncher.exec(
            "softIoc-not-installed-4b1d",
            &root.path().join("st.cmd"),
            root.path(),
        );

        match result {
            Err(LaunchError::Handoff { program, source }) => {
                assert_eq!(program, "softIoc-not-installed-4b1d");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected handoff error, got {:?}", other),
        }
    }
}
