//! Thread plumbing shared by the two daemons.
//!
//! Each daemon runs its work on background threads and parks the main
//! thread on a "done" channel.  The first [`Shutdown`] that arrives, from
//! a signal or from the end of the event stream, sends the main thread
//! down the normal cleanup path so guards such as the pidfile are dropped.

use crate::command::WmEvent;
use crate::error::Error;
use crate::traits::{EventSource, WmError};
use log::{error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::io;
use std::sync::mpsc;
use std::thread;

/// Why a daemon stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shutdown {
    /// SIGINT or SIGTERM.
    Signal(i32),
    /// The window manager event stream ended, with its error if it failed.
    EventsClosed(Option<String>),
}

impl Shutdown {
    /// What the daemon reports once it has cleaned up.  Losing the window
    /// manager is an error; a signal is not.
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Shutdown::Signal(signal) => {
                info!("received signal {}, shutting down", signal);
                Ok(())
            }
            Shutdown::EventsClosed(reason) => Err(Error::Protocol(WmError::Ipc(
                reason.unwrap_or_else(|| "event stream closed".into()),
            ))),
        }
    }
}

/// Run `source` on its own thread, forwarding events into `sink`.
///
/// When the source returns, `sink` is dropped (ending any consumer loop)
/// and [`Shutdown::EventsClosed`] is sent on `done`.
pub fn spawn_event_source<S>(
    mut source: S,
    sink: mpsc::Sender<WmEvent>,
    done: mpsc::Sender<Shutdown>,
) -> io::Result<thread::JoinHandle<()>>
where
    S: EventSource + 'static,
{
    thread::Builder::new()
        .name("wm-events".into())
        .spawn(move || {
            let reason = match source.run(sink) {
                Ok(()) => None,
                Err(e) => {
                    error!("event source failed: {}", e);
                    Some(e.to_string())
                }
            };
            let _ = done.send(Shutdown::EventsClosed(reason));
        })
}

/// Send [`Shutdown::Signal`] on `done` at the first SIGINT or SIGTERM.
pub fn spawn_signal_watcher(done: mpsc::Sender<Shutdown>) -> io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                let _ = done.send(Shutdown::Signal(signal));
            }
        })?;
    Ok(())
}

/// Process exit status for a daemon result.  Finding another instance
/// already running is a clean exit.
pub fn exit_code(result: &Result<(), Error>) -> i32 {
    match result {
        Ok(()) | Err(Error::AlreadyRunning(_)) => 0,
        Err(_) => 1,
    }
}
