use crate::models::Mode;
use std::time::{Duration, SystemTime};

/// The live tracking session and its elapsed-time accumulator.
///
/// `started_at` is kept shifted forward by every completed pause, so
/// `now - effective_start()` is the active time excluding paused intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSession {
    started_at: SystemTime,
    paused_at: Option<SystemTime>,
    last_known_workspace: Option<String>,
    mode: Mode,
}

impl TrackingSession {
    pub fn new(started_at: SystemTime, mode: Mode) -> Self {
        Self {
            started_at,
            paused_at: None,
            last_known_workspace: None,
            mode,
        }
    }

    /// Record the start of an inactive interval. No-op while already paused.
    pub fn pause(&mut self, at: SystemTime) {
        if self.paused_at.is_none() {
            self.paused_at = Some(at);
        }
    }

    /// Close the pending inactive interval and move the start forward by its length.
    pub fn resume(&mut self, at: SystemTime) {
        let Some(paused_at) = self.paused_at.take() else {
            return;
        };

        let paused_for = at.duration_since(paused_at).unwrap_or(Duration::ZERO);
        let shifted = self
            .started_at
            .checked_add(paused_for)
            .unwrap_or(self.started_at);

        // start never moves past the resume instant
        self.started_at = shifted.min(at);
    }

    /// Restart the timer from `at`, forgetting any elapsed or paused time.
    pub fn relaunch(&mut self, at: SystemTime) {
        self.started_at = at;
        self.paused_at = None;
    }

    pub fn effective_start(&self) -> SystemTime {
        self.started_at
    }

    #[cfg(test)]
    pub fn paused_at(&self) -> Option<SystemTime> {
        self.paused_at
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn last_known_workspace(&self) -> Option<&str> {
        self.last_known_workspace.as_deref()
    }

    pub fn remember_workspace(&mut self, workspace: String) {
        self.last_known_workspace = Some(workspace);
    }
}
