// Process name matching (pkill -f semantics)

use serde::Serialize;

use crate::error::{LaunchError, Result};

/// Substring pattern matched against a process's full command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatch(pub(crate) String);

impl ProcessMatch {
    /// Create a pattern
    ///
    /// An empty pattern would match every process on the host, so it is rejected.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(LaunchError::InvalidPattern(
                "pattern must not be empty".to_string(),
            ));
        }
        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Match against the command line, falling back to the process name
    /// when the command line is not readable (kernel threads, other users)
    pub fn matches(&self, name: &str, cmd: &[String]) -> bool {
        if cmd.is_empty() {
            name.contains(&self.0)
        } else {
            cmd.join(" ").contains(&self.0)
        }
    }
}

impl std::fmt::Display for ProcessMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A running process found by a probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cmdline: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            ProcessMatch::new(""),
            Err(LaunchError::InvalidPattern(_))
        ));
        assert!(ProcessMatch::new("   ").is_err());
    }

    #[test]
    fn test_matches_full_command_line() {
        let pattern = ProcessMatch::new("softIoc").unwrap();

        assert!(pattern.matches("softIoc", &cmd(&["softIoc", "st.cmd"])));
        assert!(pattern.matches(
            "perl",
            &cmd(&["/usr/bin/perl", "/opt/epics/bin/softIoc", "-d", "x.db"])
        ));
        assert!(!pattern.matches("bash", &cmd(&["bash", "-l"])));
    }

    #[test]
    fn test_pattern_spanning_arguments() {
        let pattern = ProcessMatch::new("softIoc /tmp/auxioc").unwrap();
        assert!(pattern.matches("softIoc", &cmd(&["softIoc", "/tmp/auxioc/st.cmd"])));
    }

    #[test]
    fn test_falls_back_to_name_without_cmdline() {
        let pattern = ProcessMatch::new("softIoc").unwrap();
        assert!(pattern.matches("softIoc", &[]));
        assert!(!pattern.matches("kworker/0:1", &[]));
    }

    #[test]
    fn test_case_sensitive() {
        let pattern = ProcessMatch::new("softIoc").unwrap();
        assert!(!pattern.matches("softioc", &cmd(&["softioc"])));
    }
}
