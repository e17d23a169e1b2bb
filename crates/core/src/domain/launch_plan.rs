// Launch plan: every knob of the launch sequence in one place

use std::path::PathBuf;
use std::time::Duration;

use crate::application::constants::{
    DEFAULT_IOC_BINARY, DEFAULT_KILL_PATTERN, DEFAULT_SCRATCH_DIR, GRACEFUL_SHUTDOWN_TIMEOUT,
    SETTLE_DELAY,
};
use crate::domain::ProcessMatch;

/// Parameters of a single launch
///
/// `LaunchPlan::default()` is the fixed behaviour: kill `softIoc`, wait one
/// second, recreate `/tmp/auxioc`, write `st.cmd`, exec `softIoc`.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub scratch_dir: PathBuf,
    pub kill_patterns: Vec<ProcessMatch>,
    pub settle_delay: Duration,
    pub graceful_timeout: Duration,
    pub ioc_binary: String,
}

impl Default for LaunchPlan {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            kill_patterns: vec![ProcessMatch(DEFAULT_KILL_PATTERN.to_string())],
            settle_delay: SETTLE_DELAY,
            graceful_timeout: GRACEFUL_SHUTDOWN_TIMEOUT,
            ioc_binary: DEFAULT_IOC_BINARY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let plan = LaunchPlan::default();
        assert_eq!(plan.scratch_dir, PathBuf::from("/tmp/auxioc"));
        assert_eq!(plan.kill_patterns.len(), 1);
        assert_eq!(plan.kill_patterns[0].as_str(), "softIoc");
        assert_eq!(plan.settle_delay, Duration::from_secs(1));
        assert_eq!(plan.ioc_binary, "softIoc");
    }
}
