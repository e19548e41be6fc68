//! Timings emitted as `blog.metrics` trace events; a subscriber aggregates them by field.

use std::time::{Duration, Instant};
use tracing::trace;

/// Wall-clock timer for one named stage or upload.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    started: Instant,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Reports the stage duration and returns it.
    pub fn finish_stage(self) -> Duration {
        let elapsed = self.elapsed();
        trace!(
            target = "blog.metrics",
            stage = self.label,
            elapsed_ms = millis(elapsed),
            "stage_elapsed"
        );
        elapsed
    }

    /// Reports an upload ending in `outcome` (`ready` or an `UploadError` label).
    pub fn finish_upload(self, outcome: &'static str) -> Duration {
        let elapsed = self.elapsed();
        trace!(
            target = "blog.metrics",
            upload = self.label,
            outcome,
            elapsed_ms = millis(elapsed),
            "media_upload"
        );
        elapsed
    }
}

pub fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
