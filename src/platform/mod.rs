pub mod types;
pub mod watcher;
pub mod window_title;

pub use types::{AppProbe, LifecycleEvent, LifecycleKind, WindowInspector};
pub use watcher::{SignalWatcher, WatchState, WatcherConfig};

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub use macos::MacOSTracker as NativeTracker;

#[cfg(target_os = "linux")]
pub use linux::LinuxTracker as NativeTracker;

// Stub for development on other platforms
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub struct NativeTracker;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl NativeTracker {
    pub fn new(_target: crate::models::TargetApp) -> Self {
        Self
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl WindowInspector for NativeTracker {
    fn snapshot(&self) -> crate::models::ActivitySnapshot {
        crate::models::ActivitySnapshot::default()
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl AppProbe for NativeTracker {
    fn is_running(&self, _bundle_id: &str) -> bool {
        false
    }

    fn frontmost_id(&self) -> Option<String> {
        None
    }
}
