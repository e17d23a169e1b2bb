// Launcher constants (no magic values)
use std::time::Duration;

/// Scratch directory recreated on every launch
pub const DEFAULT_SCRATCH_DIR: &str = "/tmp/auxioc";

/// Startup command file name inside the scratch directory
pub const STARTUP_SCRIPT_NAME: &str = "st.cmd";

/// Permission bits of the startup command file (rwxr-xr-x)
pub const STARTUP_SCRIPT_MODE: u32 = 0o755;

/// External IOC executable, resolved through PATH
pub const DEFAULT_IOC_BINARY: &str = "softIoc";

/// Stray processes killed before launch
pub const DEFAULT_KILL_PATTERN: &str = "softIoc";

/// Processes that count as a running auxiliary IOC
pub const STATUS_PATTERNS: [&str; 2] = ["softIoc", "auxioc"];

/// Unconditional wait after termination signals (1s)
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Time allowed between SIGTERM and SIGKILL (5s)
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness poll interval while waiting for SIGTERM to take effect (100ms)
pub const TERMINATION_POLL_INTERVAL: Duration = Duration::from_millis(100);
