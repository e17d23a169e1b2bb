// Startup command file embedded at compile time

use std::path::{Path, PathBuf};

const TEMPLATE: &str = include_str!("../../templates/st.cmd");

/// Static IOC startup command file (`st.cmd`)
///
/// The contents are fixed when the launcher is built and written out verbatim.
/// Accessors below read the Channel Access parameters back out of the template
/// for preflight checks and log fields; they never alter what gets written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupScript {
    contents: &'static str,
}

impl StartupScript {
    /// The script shipped with this build
    pub fn embedded() -> Self {
        Self { contents: TEMPLATE }
    }

    pub fn contents(&self) -> &'static str {
        self.contents
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.contents.as_bytes()
    }

    pub fn file_name(&self) -> &'static str {
        crate::application::constants::STARTUP_SCRIPT_NAME
    }

    /// Where the script lands inside `scratch_dir`
    pub fn path_in(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(self.file_name())
    }

    /// Record database loaded by `dbLoadRecords`
    pub fn database_path(&self) -> Option<PathBuf> {
        self.contents
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("dbLoadRecords("))
            .and_then(first_quoted)
            .map(PathBuf::from)
    }

    /// Value assigned by `epicsEnvSet("<name>", "<value>")`
    pub fn env_value(&self, name: &str) -> Option<&'static str> {
        self.contents
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("epicsEnvSet("))
            .find_map(|line| {
                let (key, rest) = split_quoted(line)?;
                if key != name {
                    return None;
                }
                first_quoted(rest)
            })
    }

    pub fn server_port(&self) -> Option<u16> {
        self.env_value("EPICS_CA_SERVER_PORT")?.parse().ok()
    }

    pub fn addr_list(&self) -> Vec<&'static str> {
        self.env_value("EPICS_CA_ADDR_LIST")
            .map(|list| list.split_whitespace().collect())
            .unwrap_or_default()
    }
}

impl Default for StartupScript {
    fn default() -> Self {
        Self::embedded()
    }
}

fn first_quoted(s: &str) -> Option<&str> {
    split_quoted(s).map(|(value, _)| value)
}

/// Returns the first double-quoted value and the remainder after it
fn split_quoted(s: &str) -> Option<(&str, &str)> {
    let start = s.find('"')? + 1;
    let len = s[start..].find('"')?;
    Some((&s[start..start + len], &s[start + len + 1..]))
}
