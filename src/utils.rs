use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Format a `Duration` as a human-readable string with automatic unit scaling,
/// e.g. `1.94ms` or `2.34s`.
pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.2?}")
}

/// Times one operation and warns if it ran longer than its threshold.
#[derive(Debug)]
pub struct SlowLog {
    label: &'static str,
    threshold: Duration,
    start: Instant,
}

impl SlowLog {
    pub fn start(label: &'static str, threshold: Duration) -> Self {
        Self {
            label,
            threshold,
            start: Instant::now(),
        }
    }

    /// Stop timing and return the elapsed time.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        if elapsed > self.threshold {
            warn!(
                duration = fmt_duration(elapsed),
                threshold = fmt_duration(self.threshold),
                "slow operation: {}",
                self.label
            );
        } else {
            trace!(duration = fmt_duration(elapsed), "{} finished", self.label);
        }
        elapsed
    }
}
