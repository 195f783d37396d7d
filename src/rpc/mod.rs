pub mod discord;

pub use discord::DiscordIpcClient;

use crate::models::PresenceStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("presence service is not reachable")]
    Unavailable,

    #[error("not connected to the presence service")]
    NotConnected,

    #[error("presence service closed the connection: {0}")]
    Disconnected(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("presence rejected ({code}): {message}")]
    Rejected { code: i64, message: String },
}

impl RpcError {
    /// Errors after which the connection can no longer be used.
    pub fn is_disconnect(&self) -> bool {
        match self {
            RpcError::NotConnected | RpcError::Disconnected(_) | RpcError::Io(_) => true,
            RpcError::Unavailable
            | RpcError::Json(_)
            | RpcError::Protocol(_)
            | RpcError::Rejected { .. } => false,
        }
    }
}

/// The chat client that displays the presence.
pub trait PresenceClient: Send {
    fn connect(&mut self) -> Result<(), RpcError>;
    fn set_presence(&mut self, status: &PresenceStatus) -> Result<(), RpcError>;
    /// Remove the presence without closing the connection.
    fn clear(&mut self) -> Result<(), RpcError>;
    /// Close the connection. Safe to call when not connected.
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
}
