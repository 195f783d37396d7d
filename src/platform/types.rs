use crate::models::ActivitySnapshot;
use std::time::SystemTime;

/// Reads what the user currently looks at.
pub trait WindowInspector: Send {
    fn snapshot(&self) -> ActivitySnapshot;
}

/// Answers liveness and focus questions about applications.
pub trait AppProbe: Send + Sync {
    fn is_running(&self, bundle_id: &str) -> bool;
    /// Identifier of the frontmost application.
    fn frontmost_id(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    Launched,
    Terminated,
    Activated,
    Deactivated,
    WillSleep,
    DidWake,
}

/// An OS signal about an application, stamped with when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub kind: LifecycleKind,
    pub bundle_id: String,
    pub at: SystemTime,
}

impl LifecycleEvent {
    pub fn new(kind: LifecycleKind, bundle_id: &str, at: SystemTime) -> Self {
        Self {
            kind,
            bundle_id: bundle_id.to_string(),
            at,
        }
    }
}
