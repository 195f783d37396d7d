//! Turns app probe polls into lifecycle signals.
//!
//! The probe only answers "is it running" and "is it frontmost"; the watcher
//! keeps the previous answers and reports the edges. A poll that arrives much
//! later than scheduled means the machine was asleep in between.

use super::{AppProbe, LifecycleEvent, LifecycleKind};
use crate::constants::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SLEEP_GAP_SECS};
use crate::tracker::dispatcher::Command;
use crossbeam_channel::Sender;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherConfig {
    pub poll_interval: Duration,
    /// Extra delay beyond `poll_interval` that counts as a sleep.
    pub sleep_gap: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            sleep_gap: Duration::from_secs(DEFAULT_SLEEP_GAP_SECS),
        }
    }
}

/// What the previous poll saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    pub running: bool,
    pub frontmost: bool,
    pub last_poll: Option<SystemTime>,
}

impl WatchState {
    /// State for a poll already taken elsewhere, so the next poll reports
    /// changes since `now` instead of only seeding.
    pub fn seeded(running: bool, frontmost: bool, now: SystemTime) -> Self {
        Self {
            running,
            frontmost: running && frontmost,
            last_poll: Some(now),
        }
    }

    /// Record one poll and return the signals it implies, oldest first.
    pub fn observe(
        &mut self,
        running: bool,
        frontmost: bool,
        now: SystemTime,
        config: &WatcherConfig,
        bundle_id: &str,
    ) -> Vec<LifecycleEvent> {
        let frontmost = running && frontmost;
        let mut events = Vec::new();

        let Some(last_poll) = self.last_poll else {
            *self = Self {
                running,
                frontmost,
                last_poll: Some(now),
            };
            return events;
        };

        // A clock that went backwards is not a sleep
        let gap = now.duration_since(last_poll).unwrap_or_default();
        if gap > config.poll_interval.saturating_add(config.sleep_gap) {
            events.push(LifecycleEvent::new(LifecycleKind::WillSleep, bundle_id, last_poll));
            events.push(LifecycleEvent::new(LifecycleKind::DidWake, bundle_id, now));
        }

        if running && !self.running {
            events.push(LifecycleEvent::new(LifecycleKind::Launched, bundle_id, now));
        }

        if frontmost && !self.frontmost {
            events.push(LifecycleEvent::new(LifecycleKind::Activated, bundle_id, now));
        } else if !frontmost && self.frontmost && running {
            events.push(LifecycleEvent::new(LifecycleKind::Deactivated, bundle_id, now));
        }

        if !running && self.running {
            events.push(LifecycleEvent::new(LifecycleKind::Terminated, bundle_id, now));
        }

        *self = Self {
            running,
            frontmost,
            last_poll: Some(now),
        };
        events
    }
}

pub struct SignalWatcher {
    config: WatcherConfig,
    running: Arc<AtomicBool>,
    probe: Arc<dyn AppProbe>,
    bundle_id: String,
    commands: Sender<Command>,
    initial: WatchState,
}

impl SignalWatcher {
    pub fn new(
        probe: Arc<dyn AppProbe>,
        bundle_id: &str,
        commands: Sender<Command>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            probe,
            bundle_id: bundle_id.to_string(),
            commands,
            initial: WatchState::default(),
        }
    }

    /// Start from `state` rather than seeding from the first poll.
    #[must_use]
    pub fn with_initial(mut self, state: WatchState) -> Self {
        self.initial = state;
        self
    }

    pub fn start(&self) -> thread::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let probe = Arc::clone(&self.probe);
        let commands = self.commands.clone();
        let bundle_id = self.bundle_id.clone();
        let config = self.config;
        let mut state = self.initial.clone();

        thread::spawn(move || {

            while running.load(Ordering::SeqCst) {
                let is_running = probe.is_running(&bundle_id);
                let frontmost =
                    is_running && probe.frontmost_id().as_deref() == Some(bundle_id.as_str());

                let events =
                    state.observe(is_running, frontmost, SystemTime::now(), &config, &bundle_id);
                for event in events {
                    debug!("Lifecycle signal: {:?} {}", event.kind, event.bundle_id);
                    if commands.send(Command::Signal(event)).is_err() {
                        info!("Dispatcher gone, signal watcher exiting");
                        running.store(false, Ordering::SeqCst);
                        return;
                    }
                }

                thread::sleep(config.poll_interval);
            }
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
