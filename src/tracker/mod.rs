pub mod dispatcher;
pub mod publisher;
pub mod session;
#[cfg(unix)]
pub mod signals;

use crate::constants::{
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_SLEEP_GAP_SECS,
};
use crate::models::{Mode, TargetApp};
use crate::platform::{LifecycleEvent, LifecycleKind, WatcherConfig};
use log::{debug, info, warn};
use publisher::StatusPublisher;
use session::TrackingSession;
use std::time::{Duration, SystemTime};

pub struct TrackerConfig {
    pub refresh_interval: Duration,
    pub poll_interval: Duration,
    pub sleep_gap: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            sleep_gap: Duration::from_secs(DEFAULT_SLEEP_GAP_SECS),
        }
    }
}

impl TrackerConfig {
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            poll_interval: self.poll_interval,
            sleep_gap: self.sleep_gap,
        }
    }
}

/// Owns the tracking session and reacts to lifecycle signals.
///
/// Disconnected while `session` is `None`, Connected otherwise. Every
/// transition into Connected publishes once; every signal that changes the
/// accumulator publishes once.
pub struct LifecycleController {
    publisher: StatusPublisher,
    mode: Mode,
    session: Option<TrackingSession>,
    relaunch_pending: bool,
}

impl LifecycleController {
    pub fn new(publisher: StatusPublisher, mode: Mode) -> Self {
        Self {
            publisher,
            mode,
            session: None,
            relaunch_pending: false,
        }
    }

    /// Pick up a target that was already running before we started.
    pub fn boot(&mut self, now: SystemTime, target_running: bool) {
        if target_running {
            info!("{} is already running", self.publisher.target().name);
            self.connect(now);
        } else {
            info!("Waiting for {} to launch", self.publisher.target().name);
        }
    }

    pub fn handle_event(&mut self, event: &LifecycleEvent) {
        if !self.publisher.target().matches_id(&event.bundle_id) {
            debug!("Ignoring {:?} from {}", event.kind, event.bundle_id);
            return;
        }

        let at = event.at;
        match event.kind {
            LifecycleKind::Launched => {
                if self.is_connected() {
                    debug!("Launch signal while already connected");
                } else {
                    info!("{} launched", self.publisher.target().name);
                    self.connect(at);
                }
            }
            LifecycleKind::Terminated => {
                if self.is_connected() {
                    info!("{} terminated", self.publisher.target().name);
                    self.teardown();
                }
            }
            LifecycleKind::Activated => {
                let relaunch = self.relaunch_pending;
                let applied = self.update_session(Mode::pauses_on_focus_loss, |session| {
                    if relaunch {
                        session.relaunch(at);
                    } else {
                        session.resume(at);
                    }
                });
                if applied && relaunch {
                    info!("Session timer restarted");
                    self.relaunch_pending = false;
                }
            }
            LifecycleKind::Deactivated => {
                self.update_session(Mode::pauses_on_focus_loss, |session| session.pause(at));
            }
            LifecycleKind::WillSleep => {
                self.update_session(Mode::pauses_on_sleep, |session| session.pause(at));
            }
            LifecycleKind::DidWake => {
                self.update_session(Mode::pauses_on_sleep, |session| session.resume(at));
            }
        }
    }

    /// Manual start. The next activation restarts the session timer.
    pub fn start(&mut self, now: SystemTime, target_running: bool) {
        if self.is_connected() {
            info!("Tracker already running");
            return;
        }

        self.relaunch_pending = true;
        if target_running {
            self.connect(now);
        } else {
            info!("Waiting for {} to launch", self.publisher.target().name);
        }
    }

    /// Manual stop, also used on shutdown.
    pub fn stop(&mut self) {
        if self.is_connected() {
            self.teardown();
        } else {
            info!("Tracker not running");
        }
    }

    pub fn tick(&mut self) {
        if self.is_connected() {
            self.publish();
        }
    }

    /// Takes effect with the next session.
    pub fn set_mode(&mut self, mode: Mode) {
        info!("Mode set to {mode}: {}", mode.description());
        self.mode = mode;
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&TrackingSession> {
        self.session.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> &TargetApp {
        self.publisher.target()
    }

    fn connect(&mut self, now: SystemTime) {
        if let Err(e) = self.publisher.connect() {
            warn!("Could not connect to the presence service: {e}");
            return;
        }

        info!("Connected, tracking in {} mode", self.mode);
        self.session = Some(TrackingSession::new(now, self.mode));
        self.publish();
    }

    fn teardown(&mut self) {
        if let Err(e) = self.publisher.clear() {
            warn!("Failed to clear presence: {e}");
        }
        self.publisher.disconnect();
        self.session = None;
        info!("Disconnected from the presence service");
    }

    /// Apply `change` when the session's mode passes `gate`, then publish.
    fn update_session(
        &mut self,
        gate: fn(Mode) -> bool,
        change: impl FnOnce(&mut TrackingSession),
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !gate(session.mode()) {
            debug!("Signal ignored in {} mode", session.mode());
            return false;
        }

        change(session);
        self.publish();
        true
    }

    fn publish(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match self.publisher.publish(session) {
            Ok(_) => {}
            Err(e) if e.is_disconnect() => {
                warn!("Lost the presence service: {e}");
                self.publisher.disconnect();
                self.session = None;
            }
            Err(e) => warn!("Presence update failed: {e}"),
        }
    }
}
