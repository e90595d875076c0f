//! Maintenance windows that take substations offline.

use std::fmt;

use serde::Serialize;

use crate::sim::clock::Timestamp;

/// Default length of a maintenance window requested from the command line.
pub const DEFAULT_MAINTENANCE_SECS: i64 = 3600;

/// Progress of a maintenance job. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceState {
    Scheduled,
    InProgress,
    Done,
}

impl fmt::Display for MaintenanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Scheduled => "SCHEDULED",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        };
        f.write_str(label)
    }
}

/// Handle returned when a job is scheduled; indexes the maintenance list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MaintenanceId(pub usize);

/// A maintenance window `[start, end)` on one substation.
///
/// The substation is referenced by id only. A job naming an unknown id never
/// matches anything and has no effect on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceJob {
    substation_id: String,
    start: Timestamp,
    end: Timestamp,
    state: MaintenanceState,
}

impl MaintenanceJob {
    /// Creates a job in the `Scheduled` state. Callers keep `start <= end`.
    pub fn new(substation_id: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            substation_id: substation_id.into(),
            start,
            end,
            state: MaintenanceState::Scheduled,
        }
    }

    pub fn substation_id(&self) -> &str {
        &self.substation_id
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn state(&self) -> MaintenanceState {
        self.state
    }

    /// Returns `true` while the window is being worked.
    pub fn is_in_progress(&self) -> bool {
        self.state == MaintenanceState::InProgress
    }

    /// Moves the job forward according to `now` and returns the new state.
    ///
    /// Both transitions are checked on every call, so a job whose whole
    /// window has elapsed since the last call goes straight to `Done`.
    /// `Done` is absorbing.
    ///
    /// # Examples
    ///
    /// ```
    /// use grid_dr::grid::maintenance::{MaintenanceJob, MaintenanceState};
    ///
    /// let mut job = MaintenanceJob::new("S01", 100, 200);
    /// assert_eq!(job.advance(99), MaintenanceState::Scheduled);
    /// assert_eq!(job.advance(100), MaintenanceState::InProgress);
    /// assert_eq!(job.advance(200), MaintenanceState::Done);
    /// ```
    pub fn advance(&mut self, now: Timestamp) -> MaintenanceState {
        if self.state == MaintenanceState::Scheduled && now >= self.start {
            self.state = MaintenanceState::InProgress;
        }
        if self.state == MaintenanceState::InProgress && now >= self.end {
            self.state = MaintenanceState::Done;
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_scheduled_before_start() {
        let mut job = MaintenanceJob::new("S01", 100, 200);
        assert_eq!(job.advance(0), MaintenanceState::Scheduled);
        assert_eq!(job.advance(99), MaintenanceState::Scheduled);
    }

    #[test]
    fn window_is_half_open() {
        let mut job = MaintenanceJob::new("S01", 100, 200);
        assert_eq!(job.advance(100), MaintenanceState::InProgress);
        assert_eq!(job.advance(199), MaintenanceState::InProgress);
        assert_eq!(job.advance(200), MaintenanceState::Done);
    }

    #[test]
    fn skips_through_in_progress_when_window_elapsed() {
        let mut job = MaintenanceJob::new("S01", 100, 200);
        assert_eq!(job.advance(500), MaintenanceState::Done);
    }

    #[test]
    fn zero_length_window_completes_immediately() {
        let mut job = MaintenanceJob::new("S01", 100, 100);
        assert_eq!(job.advance(100), MaintenanceState::Done);
    }

    #[test]
    fn done_is_idempotent() {
        let mut job = MaintenanceJob::new("S01", 100, 200);
        job.advance(300);
        for now in [300, 1_000, i64::MAX] {
            assert_eq!(job.advance(now), MaintenanceState::Done);
        }
        // Going back in time does not reopen the window either.
        assert_eq!(job.advance(150), MaintenanceState::Done);
    }

    #[test]
    fn in_progress_does_not_revert() {
        let mut job = MaintenanceJob::new("S01", 100, 200);
        job.advance(150);
        assert_eq!(job.advance(50), MaintenanceState::InProgress);
    }
}
