//! Unix signals as dispatcher commands.
//!
//! SIGINT and SIGTERM shut the tracker down, which clears the presence on the
//! way out. SIGUSR1 starts tracking by hand and SIGUSR2 stops it.

use super::dispatcher::{Command, DispatcherHandle};
use log::{debug, info};
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook::iterator::{Handle, Signals};
use std::ffi::c_int;
use std::thread;

pub const FORWARDED_SIGNALS: [c_int; 4] = [SIGINT, SIGTERM, SIGUSR1, SIGUSR2];

pub fn command_for(signal: c_int) -> Option<Command> {
    match signal {
        SIGINT | SIGTERM => Some(Command::Shutdown),
        SIGUSR1 => Some(Command::Start),
        SIGUSR2 => Some(Command::Stop),
        _ => None,
    }
}

/// Listens for `FORWARDED_SIGNALS` on its own thread until closed.
pub struct SignalForwarder {
    handle: Handle,
    thread: thread::JoinHandle<()>,
}

impl SignalForwarder {
    pub fn install(dispatcher: DispatcherHandle) -> std::io::Result<Self> {
        let mut signals = Signals::new(FORWARDED_SIGNALS)?;
        let handle = signals.handle();

        let thread = thread::spawn(move || {
            for signal in signals.forever() {
                let Some(command) = command_for(signal) else {
                    continue;
                };
                info!("Received signal {signal}, sending {command:?}");
                if dispatcher.send(command).is_err() {
                    debug!("Dispatcher gone, signal forwarder exiting");
                    return;
                }
            }
        });

        Ok(Self { handle, thread })
    }

    /// Stop listening and wait for the forwarding thread.
    pub fn close(self) -> thread::Result<()> {
        self.handle.close();
        self.thread.join()
    }
}
