use std::time::{SystemTime, UNIX_EPOCH};

/// Status blob published to the presence service.
///
/// `session_end` stays `None` while the tracked application is connected,
/// which the service renders as an "elapsed" counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceStatus {
    pub details: Option<String>,
    pub state: Option<String>,
    pub large_icon: String,
    pub small_icon: Option<String>,
    pub session_start: SystemTime,
    pub session_end: Option<SystemTime>,
}

/// Seconds since the Unix epoch, zero for instants before it.
pub fn unix_secs(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

impl PresenceStatus {
    pub fn new(large_icon: &str, session_start: SystemTime) -> Self {
        Self {
            details: None,
            state: None,
            large_icon: large_icon.to_string(),
            small_icon: None,
            session_start,
            session_end: None,
        }
    }

    pub fn start_secs(&self) -> u64 {
        unix_secs(self.session_start)
    }

    pub fn end_secs(&self) -> Option<u64> {
        self.session_end.map(unix_secs)
    }
}
