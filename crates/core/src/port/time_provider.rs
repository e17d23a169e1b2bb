// Clock port for termination deadlines

/// Millisecond clock used for the SIGTERM → SIGKILL deadline
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since an arbitrary fixed origin
    fn now_millis(&self) -> i64;
}

/// Monotonic clock backed by `tokio::time::Instant`
///
/// Wall-clock jumps during the grace period do not shorten or extend it,
/// and paused tokio time in tests is honoured.
pub struct MonotonicTimeProvider {
    origin: tokio::time::Instant,
}

impl MonotonicTimeProvider {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MonotonicTimeProvider {
    fn now_millis(&self) -> i64 {
        self.origin.elapsed().as_millis() as i64
    }
}
