//! Shared test utilities for xcpresence.
//!
//! Fakes for the OS and the presence service, plus a migrated temp database.

#![cfg(test)]

use crate::db::{migrations, Database};
use crate::models::{ActivitySnapshot, PresenceStatus};
use crate::platform::{AppProbe, WindowInspector};
use crate::rpc::{PresenceClient, RpcError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (`Database`, `TempDir`). The `TempDir` must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Window inspector returning whatever the test last set. Clones share state.
#[derive(Clone, Default)]
pub struct FakeInspector {
    current: Arc<Mutex<ActivitySnapshot>>,
}

impl FakeInspector {
    pub fn showing(application: &str, file: Option<&str>, workspace: Option<&str>) -> Self {
        let inspector = Self::default();
        inspector.show(application, file, workspace);
        inspector
    }

    pub fn show(&self, application: &str, file: Option<&str>, workspace: Option<&str>) {
        *self.current.lock().unwrap() = ActivitySnapshot::new(Some(application), file, workspace);
    }
}

impl WindowInspector for FakeInspector {
    fn snapshot(&self) -> ActivitySnapshot {
        self.current.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    Connect,
    SetPresence(PresenceStatus),
    Clear,
    Disconnect,
}

#[derive(Default)]
struct ClientLog {
    calls: Vec<ClientCall>,
    connected: bool,
    refuse_connect: bool,
    publish_errors: VecDeque<RpcError>,
}

/// Presence client that records every call. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingClient {
    log: Arc<Mutex<ClientLog>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose service is never reachable.
    pub fn unreachable() -> Self {
        let client = Self::default();
        client.log.lock().unwrap().refuse_connect = true;
        client
    }

    /// Make the next `set_presence` fail with `error`.
    pub fn fail_next_publish(&self, error: RpcError) {
        self.log.lock().unwrap().publish_errors.push_back(error);
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn published(&self) -> Vec<PresenceStatus> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ClientCall::SetPresence(status) => Some(status),
                ClientCall::Connect | ClientCall::Clear | ClientCall::Disconnect => None,
            })
            .collect()
    }

    pub fn last_published(&self) -> Option<PresenceStatus> {
        self.published().pop()
    }

    pub fn publish_count(&self) -> usize {
        self.published().len()
    }
}

impl PresenceClient for RecordingClient {
    fn connect(&mut self) -> Result<(), RpcError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(ClientCall::Connect);
        if log.refuse_connect {
            return Err(RpcError::Unavailable);
        }
        log.connected = true;
        Ok(())
    }

    fn set_presence(&mut self, status: &PresenceStatus) -> Result<(), RpcError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(ClientCall::SetPresence(status.clone()));
        if !log.connected {
            return Err(RpcError::NotConnected);
        }
        match log.publish_errors.pop_front() {
            Some(error) => {
                if error.is_disconnect() {
                    log.connected = false;
                }
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn clear(&mut self) -> Result<(), RpcError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(ClientCall::Clear);
        if log.connected {
            Ok(())
        } else {
            Err(RpcError::NotConnected)
        }
    }

    fn disconnect(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.calls.push(ClientCall::Disconnect);
        log.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.log.lock().unwrap().connected
    }
}

#[derive(Default)]
struct ProbeState {
    running: Vec<String>,
    frontmost: Option<String>,
}

/// App probe driven by the test.
#[derive(Default)]
pub struct FakeProbe {
    state: Mutex<ProbeState>,
}

impl FakeProbe {
    /// Start `bundle_id` and bring it to the front.
    pub fn launch(&self, bundle_id: &str) {
        let mut state = self.state.lock().unwrap();
        if !state.running.iter().any(|id| id == bundle_id) {
            state.running.push(bundle_id.to_string());
        }
        state.frontmost = Some(bundle_id.to_string());
    }

    pub fn quit(&self, bundle_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.running.retain(|id| id != bundle_id);
        if state.frontmost.as_deref() == Some(bundle_id) {
            state.frontmost = None;
        }
    }

    pub fn focus(&self, bundle_id: Option<&str>) {
        self.state.lock().unwrap().frontmost = bundle_id.map(ToString::to_string);
    }
}

impl AppProbe for FakeProbe {
    fn is_running(&self, bundle_id: &str) -> bool {
        self.state.lock().unwrap().running.iter().any(|id| id == bundle_id)
    }

    fn frontmost_id(&self) -> Option<String> {
        self.state.lock().unwrap().frontmost.clone()
    }
}
