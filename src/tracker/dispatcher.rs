//! The control loop.
//!
//! Lifecycle signals, manual commands and the refresh tick all arrive here
//! and are handled one at a time on the calling thread.

use super::LifecycleController;
use crate::db::Database;
use crate::error::AppError;
use crate::models::{Mode, Settings};
use crate::platform::{AppProbe, LifecycleEvent};
use crossbeam_channel::{never, select, tick, unbounded, Receiver, Sender};
use log::{debug, error, info};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Signal(LifecycleEvent),
    Start,
    Stop,
    SetMode(Mode),
    Shutdown,
}

/// Sending side of the dispatcher. Cheap to clone.
#[derive(Clone)]
pub struct DispatcherHandle {
    sender: Sender<Command>,
}

impl DispatcherHandle {
    pub fn send(&self, command: Command) -> Result<(), AppError> {
        self.sender.send(command).map_err(|_| AppError::ChannelClosed)
    }

    pub fn sender(&self) -> Sender<Command> {
        self.sender.clone()
    }
}

pub fn channel() -> (DispatcherHandle, Receiver<Command>) {
    let (sender, receiver) = unbounded();
    (DispatcherHandle { sender }, receiver)
}

pub struct Dispatcher {
    controller: LifecycleController,
    probe: Arc<dyn AppProbe>,
    db: Database,
    refresh_interval: Duration,
    commands: Receiver<Command>,
}

impl Dispatcher {
    pub fn new(
        controller: LifecycleController,
        probe: Arc<dyn AppProbe>,
        db: Database,
        refresh_interval: Duration,
        commands: Receiver<Command>,
    ) -> Self {
        Self {
            controller,
            probe,
            db,
            refresh_interval,
            commands,
        }
    }

    /// Run until `Shutdown` or until every handle is dropped. The session is
    /// stopped on the way out.
    pub fn run(mut self) -> LifecycleController {
        let mut ticker: Receiver<Instant> = never();
        let mut armed = false;

        loop {
            // A fresh tick channel per connection; a tick channel buffers at most one tick
            if self.controller.is_connected() != armed {
                armed = self.controller.is_connected();
                ticker = if armed {
                    tick(self.refresh_interval)
                } else {
                    never()
                };
            }

            let flow = select! {
                recv(self.commands) -> command => match command {
                    Ok(command) => self.handle(command),
                    Err(_) => {
                        info!("All dispatcher handles dropped");
                        ControlFlow::Break(())
                    }
                },
                recv(ticker) -> _ => {
                    debug!("Refresh tick");
                    self.controller.tick();
                    ControlFlow::Continue(())
                },
            };

            if flow.is_break() {
                break;
            }
        }

        self.controller.stop();
        info!("Dispatcher stopped");
        self.controller
    }

    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Signal(event) => self.controller.handle_event(&event),
            Command::Start => {
                let running = self.probe.is_running(&self.controller.target().bundle_id);
                self.controller.start(SystemTime::now(), running);
            }
            Command::Stop => self.controller.stop(),
            Command::SetMode(mode) => self.set_mode(mode),
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn set_mode(&mut self, mode: Mode) {
        match Settings::for_mode(mode).save(self.db.connection()) {
            Ok(()) => self.controller.set_mode(mode),
            Err(e) => error!("Failed to save mode {mode}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetApp;
    use crate::platform::LifecycleKind;
    use crate::presence::WorkspacePolicy;
    use crate::test_utils::{setup_test_db, ClientCall, FakeInspector, FakeProbe, RecordingClient};
    use crate::tracker::publisher::StatusPublisher;
    use std::thread;

    const ID: &str = "com.apple.dt.Xcode";

    fn spawn(
        client: &RecordingClient,
        probe: Arc<FakeProbe>,
        db: Database,
        refresh_interval: Duration,
    ) -> (DispatcherHandle, thread::JoinHandle<LifecycleController>) {
        let publisher = StatusPublisher::new(
            Box::new(FakeInspector::showing("Xcode", Some("main.swift"), None)),
            Box::new(client.clone()),
            TargetApp::default(),
            WorkspacePolicy::default(),
        );
        let controller = LifecycleController::new(publisher, Mode::Strict);
        let (handle, receiver) = channel();
        let dispatcher = Dispatcher::new(controller, probe, db, refresh_interval, receiver);
        (handle, thread::spawn(move || dispatcher.run()))
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_ticks_publish_while_connected() {
        let (db, _dir) = setup_test_db();
        let client = RecordingClient::new();
        let (handle, join) = spawn(&client, Arc::new(FakeProbe::default()), db, Duration::from_millis(20));

        // Nothing is published before the target launches
        thread::sleep(Duration::from_millis(60));
        assert_eq!(client.publish_count(), 0);

        handle
            .send(Command::Signal(LifecycleEvent::new(LifecycleKind::Launched, ID, SystemTime::now())))
            .unwrap();
        wait_for(|| client.publish_count() >= 3);

        handle.send(Command::Shutdown).unwrap();
        let controller = join.join().unwrap();

        assert!(!controller.is_connected());
        let calls = client.calls();
        assert_eq!(calls[calls.len() - 2..], [ClientCall::Clear, ClientCall::Disconnect]);
    }

    #[test]
    fn test_stop_disarms_tick() {
        let (db, _dir) = setup_test_db();
        let client = RecordingClient::new();
        let probe = Arc::new(FakeProbe::default());
        probe.launch(ID);
        let (handle, join) = spawn(&client, Arc::clone(&probe), db, Duration::from_millis(20));

        handle.send(Command::Start).unwrap();
        wait_for(|| client.publish_count() >= 2);

        handle.send(Command::Stop).unwrap();
        wait_for(|| client.calls().last() == Some(&ClientCall::Disconnect));
        let published = client.publish_count();

        thread::sleep(Duration::from_millis(100));
        assert_eq!(client.publish_count(), published);

        handle.send(Command::Shutdown).unwrap();
        join.join().unwrap();
    }

    #[test]
    fn test_start_without_target_waits() {
        let (db, _dir) = setup_test_db();
        let client = RecordingClient::new();
        let (handle, join) = spawn(&client, Arc::new(FakeProbe::default()), db, Duration::from_millis(20));

        handle.send(Command::Start).unwrap();
        handle.send(Command::Shutdown).unwrap();
        let controller = join.join().unwrap();

        assert!(!controller.is_connected());
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_set_mode_survives_restart() {
        let (db, dir) = setup_test_db();
        let client = RecordingClient::new();
        let (handle, join) = spawn(&client, Arc::new(FakeProbe::default()), db, Duration::from_millis(20));

        handle.send(Command::SetMode(Mode::Flaunt)).unwrap();
        handle.send(Command::Shutdown).unwrap();
        let controller = join.join().unwrap();
        assert_eq!(controller.mode(), Mode::Flaunt);

        let reopened = Database::open(&dir.path().join("test.db")).unwrap();
        let settings = Settings::load(reopened.connection()).unwrap();
        assert_eq!(settings.mode().unwrap(), Mode::Flaunt);
    }

    #[test]
    fn test_exits_when_handles_are_dropped() {
        let (db, _dir) = setup_test_db();
        let client = RecordingClient::new();
        let probe = Arc::new(FakeProbe::default());
        probe.launch(ID);
        let (handle, join) = spawn(&client, probe, db, Duration::from_millis(20));

        handle.send(Command::Start).unwrap();
        drop(handle);
        let controller = join.join().unwrap();

        assert!(!controller.is_connected());
        assert_eq!(client.calls().last(), Some(&ClientCall::Disconnect));
    }

    #[test]
    fn test_send_after_shutdown_fails() {
        let (db, _dir) = setup_test_db();
        let client = RecordingClient::new();
        let (handle, join) = spawn(&client, Arc::new(FakeProbe::default()), db, Duration::from_millis(20));

        handle.send(Command::Shutdown).unwrap();
        join.join().unwrap();

        assert!(matches!(handle.send(Command::Stop), Err(AppError::ChannelClosed)));
    }
}
