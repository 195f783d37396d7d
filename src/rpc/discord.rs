//! Discord local IPC client.
//!
//! Discord listens on `discord-ipc-{0..9}` in the user's runtime or temp
//! directory. Every message is a frame of a little-endian `u32` opcode, a
//! little-endian `u32` body length and a JSON body.

use super::{PresenceClient, RpcError};
use crate::models::PresenceStatus;
use log::{debug, info};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

const RPC_VERSION: u32 = 1;
const IPC_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_SOCKETS: u8 = 10;
const MAX_FRAME_LEN: u32 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Handshake,
    Frame,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn code(self) -> u32 {
        match self {
            Opcode::Handshake => 0,
            Opcode::Frame => 1,
            Opcode::Close => 2,
            Opcode::Ping => 3,
            Opcode::Pong => 4,
        }
    }
}

impl TryFrom<u32> for Opcode {
    type Error = RpcError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Opcode::Handshake),
            1 => Ok(Opcode::Frame),
            2 => Ok(Opcode::Close),
            3 => Ok(Opcode::Ping),
            4 => Ok(Opcode::Pong),
            other => Err(RpcError::Protocol(format!("unknown opcode {other}"))),
        }
    }
}

pub fn encode_frame(op: Opcode, payload: &Value) -> Result<Vec<u8>, RpcError> {
    let body = serde_json::to_vec(payload)?;
    let len = u32::try_from(body.len())
        .map_err(|_| RpcError::Protocol("payload too large".to_string()))?;

    let mut frame = Vec::with_capacity(body.len() + 8);
    frame.extend_from_slice(&op.code().to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

pub fn write_frame<W: Write>(writer: &mut W, op: Opcode, payload: &Value) -> Result<(), RpcError> {
    writer.write_all(&encode_frame(op, payload)?)?;
    writer.flush()?;
    Ok(())
}

pub fn read_frame<R: Read>(reader: &mut R) -> Result<(Opcode, Value), RpcError> {
    let mut op = [0u8; 4];
    let mut len = [0u8; 4];
    reader.read_exact(&mut op)?;
    reader.read_exact(&mut len)?;

    let op = Opcode::try_from(u32::from_le_bytes(op))?;
    let len = u32::from_le_bytes(len);
    if len > MAX_FRAME_LEN {
        return Err(RpcError::Protocol(format!("frame of {len} bytes exceeds limit")));
    }

    let len = usize::try_from(len).map_err(|_| RpcError::Protocol("frame length overflow".to_string()))?;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;

    Ok((op, serde_json::from_slice(&body)?))
}

#[derive(Debug, Serialize)]
struct Activity<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    timestamps: Timestamps,
    assets: Assets<'a>,
}

#[derive(Debug, Serialize)]
struct Timestamps {
    start: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<u64>,
}

#[derive(Debug, Serialize)]
struct Assets<'a> {
    large_image: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    small_image: Option<&'a str>,
}

impl<'a> From<&'a PresenceStatus> for Activity<'a> {
    fn from(status: &'a PresenceStatus) -> Self {
        Self {
            details: status.details.as_deref(),
            state: status.state.as_deref(),
            timestamps: Timestamps {
                start: status.start_secs(),
                end: status.end_secs(),
            },
            assets: Assets {
                large_image: &status.large_icon,
                small_image: status.small_icon.as_deref(),
            },
        }
    }
}

pub fn activity_payload(status: &PresenceStatus) -> Result<Value, RpcError> {
    Ok(serde_json::to_value(Activity::from(status))?)
}

/// `SET_ACTIVITY` command; a `null` activity clears the presence.
pub fn set_activity_command(pid: u32, activity: Value) -> Value {
    json!({
        "cmd": "SET_ACTIVITY",
        "args": { "pid": pid, "activity": activity },
        "nonce": Uuid::new_v4().to_string(),
    })
}

fn socket_paths_in(dir: &Path) -> Vec<PathBuf> {
    (0..MAX_SOCKETS)
        .map(|i| dir.join(format!("discord-ipc-{i}")))
        .collect()
}

/// Socket paths Discord may be listening on, in the order they are tried.
pub fn socket_candidates() -> Vec<PathBuf> {
    let dir = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
        .iter()
        .find_map(std::env::var_os)
        .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
    socket_paths_in(&dir)
}

fn event_name(payload: &Value) -> Option<&str> {
    payload.get("evt").and_then(Value::as_str)
}

fn close_reason(payload: &Value) -> String {
    payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("closed by peer")
        .to_string()
}

fn reply_result(payload: Value) -> Result<Value, RpcError> {
    if event_name(&payload) != Some("ERROR") {
        return Ok(payload);
    }

    let data = payload.get("data");
    let code = data
        .and_then(|d| d.get("code"))
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let message = data
        .and_then(|d| d.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Err(RpcError::Rejected { code, message })
}

/// Send one command and wait for its reply, answering pings on the way.
pub fn exchange<S: Read + Write>(stream: &mut S, command: &Value) -> Result<Value, RpcError> {
    write_frame(stream, Opcode::Frame, command)?;

    loop {
        let (op, payload) = read_frame(stream)?;
        match op {
            Opcode::Frame => return reply_result(payload),
            Opcode::Ping => write_frame(stream, Opcode::Pong, &payload)?,
            Opcode::Close => return Err(RpcError::Disconnected(close_reason(&payload))),
            Opcode::Handshake | Opcode::Pong => debug!("Ignoring {op:?} frame from Discord"),
        }
    }
}

pub struct DiscordIpcClient {
    client_id: String,
    pid: u32,
    #[cfg(unix)]
    stream: Option<UnixStream>,
}

impl DiscordIpcClient {
    pub fn new(client_id: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            pid: std::process::id(),
            #[cfg(unix)]
            stream: None,
        }
    }

    /// Perform the handshake over an already open socket.
    #[cfg(unix)]
    pub fn connect_stream(&mut self, mut stream: UnixStream) -> Result<(), RpcError> {
        stream.set_read_timeout(Some(IPC_TIMEOUT))?;
        stream.set_write_timeout(Some(IPC_TIMEOUT))?;

        let handshake = json!({ "v": RPC_VERSION, "client_id": self.client_id });
        write_frame(&mut stream, Opcode::Handshake, &handshake)?;

        let (op, payload) = read_frame(&mut stream)?;
        match op {
            Opcode::Frame if event_name(&payload) == Some("READY") => {
                let user = payload
                    .get("data")
                    .and_then(|d| d.get("user"))
                    .and_then(|u| u.get("username"))
                    .and_then(Value::as_str)
                    .unwrap_or("unknown user");
                info!("Connected to Discord as {user}");
                self.stream = Some(stream);
                Ok(())
            }
            Opcode::Close => Err(RpcError::Disconnected(close_reason(&payload))),
            Opcode::Frame | Opcode::Handshake | Opcode::Ping | Opcode::Pong => Err(RpcError::Protocol(
                format!("unexpected handshake reply {op:?}"),
            )),
        }
    }

    #[cfg(unix)]
    fn request(&mut self, command: &Value) -> Result<Value, RpcError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(RpcError::NotConnected);
        };

        let result = exchange(stream, command);
        if matches!(&result, Err(e) if e.is_disconnect()) {
            self.stream = None;
        }
        result
    }

    #[cfg(not(unix))]
    fn request(&mut self, _command: &Value) -> Result<Value, RpcError> {
        Err(RpcError::NotConnected)
    }
}

impl PresenceClient for DiscordIpcClient {
    #[cfg(unix)]
    fn connect(&mut self) -> Result<(), RpcError> {
        if self.stream.is_some() {
            return Ok(());
        }

        for path in socket_candidates() {
            match UnixStream::connect(&path) {
                Ok(stream) => return self.connect_stream(stream),
                Err(e) => debug!("No Discord socket at {}: {e}", path.display()),
            }
        }
        Err(RpcError::Unavailable)
    }

    #[cfg(not(unix))]
    fn connect(&mut self) -> Result<(), RpcError> {
        Err(RpcError::Unavailable)
    }

    fn set_presence(&mut self, status: &PresenceStatus) -> Result<(), RpcError> {
        let command = set_activity_command(self.pid, activity_payload(status)?);
        self.request(&command).map(|_| ())
    }

    fn clear(&mut self) -> Result<(), RpcError> {
        let command = set_activity_command(self.pid, Value::Null);
        self.request(&command).map(|_| ())
    }

    #[cfg(unix)]
    fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = write_frame(&mut stream, Opcode::Close, &json!({})) {
                debug!("Discord close frame not delivered: {e}");
            }
            if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
                debug!("Discord socket shutdown failed: {e}");
            }
            info!("Disconnected from Discord");
        }
    }

    #[cfg(not(unix))]
    fn disconnect(&mut self) {}

    #[cfg(unix)]
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    #[cfg(not(unix))]
    fn is_connected(&self) -> bool {
        false
    }
}
