use crate::models::{PresenceStatus, TargetApp};
use crate::platform::WindowInspector;
use crate::presence::{compute_status, WorkspacePolicy};
use crate::rpc::{PresenceClient, RpcError};
use crate::tracker::session::TrackingSession;
use log::debug;

/// Snapshot, compute, send.
pub struct StatusPublisher {
    inspector: Box<dyn WindowInspector>,
    client: Box<dyn PresenceClient>,
    target: TargetApp,
    policy: WorkspacePolicy,
}

impl StatusPublisher {
    pub fn new(
        inspector: Box<dyn WindowInspector>,
        client: Box<dyn PresenceClient>,
        target: TargetApp,
        policy: WorkspacePolicy,
    ) -> Self {
        Self {
            inspector,
            client,
            target,
            policy,
        }
    }

    pub fn target(&self) -> &TargetApp {
        &self.target
    }

    /// Publish the current activity for `session`, remembering the
    /// workspace the editor reported.
    pub fn publish(&mut self, session: &mut TrackingSession) -> Result<PresenceStatus, RpcError> {
        let snapshot = self.inspector.snapshot();
        if snapshot.is_empty() {
            debug!("No frontmost window information");
        }
        let update = compute_status(&snapshot, session, &self.target, self.policy);

        if let Some(workspace) = update.remembered_workspace {
            session.remember_workspace(workspace);
        }

        debug!(
            "Publishing presence: {} / {}",
            update.status.details.as_deref().unwrap_or("-"),
            update.status.state.as_deref().unwrap_or("-")
        );
        self.client.set_presence(&update.status)?;
        Ok(update.status)
    }

    pub fn connect(&mut self) -> Result<(), RpcError> {
        self.client.connect()
    }

    pub fn clear(&mut self) -> Result<(), RpcError> {
        self.client.clear()
    }

    pub fn disconnect(&mut self) {
        self.client.disconnect();
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}
