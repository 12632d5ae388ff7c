use std::time::Duration;

use crate::SystemSnapshot;

/// Polling cadence of the system monitor.
pub const MONITOR_INTERVAL: Duration = Duration::from_secs(3);

/// Consecutive failed polls tolerated before the monitor gives up.
pub const MONITOR_MAX_FAILURES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorStatus {
    #[default]
    Stopped,
    Running,
    /// Stopped after too many consecutive failures.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitorState {
    status: MonitorStatus,
    consecutive_failures: u32,
    latest: Option<SystemSnapshot>,
}

/// What a poll result did to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    Recorded,
    Missed,
    GaveUp,
    /// The monitor is not running.
    Ignored,
}

impl MonitorState {
    /// Returns `false` if the monitor was already running.
    pub fn start(&mut self) -> bool {
        if self.status == MonitorStatus::Running {
            return false;
        }
        self.status = MonitorStatus::Running;
        self.consecutive_failures = 0;
        true
    }

    /// Returns `false` if the monitor was not running.
    pub fn stop(&mut self) -> bool {
        if self.status != MonitorStatus::Running {
            return false;
        }
        self.status = MonitorStatus::Stopped;
        true
    }

    pub fn record(&mut self, sample: Result<SystemSnapshot, String>) -> SampleOutcome {
        if self.status != MonitorStatus::Running {
            return SampleOutcome::Ignored;
        }
        match sample {
            Ok(snapshot) => {
                self.latest = Some(snapshot);
                self.consecutive_failures = 0;
                SampleOutcome::Recorded
            }
            Err(_) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures > MONITOR_MAX_FAILURES {
                    self.status = MonitorStatus::Failed;
                    SampleOutcome::GaveUp
                } else {
                    SampleOutcome::Missed
                }
            }
        }
    }

    pub fn status(&self) -> MonitorStatus {
        self.status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn latest(&self) -> Option<&SystemSnapshot> {
        self.latest.as_ref()
    }
}
