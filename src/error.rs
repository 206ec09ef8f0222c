//! Crate-wide error taxonomy.
//!
//! Adapters keep their own narrow error types ([`WmError`],
//! [`UnixSocketError`](crate::ipc::listener::UnixSocketError),
//! [`ConfigError`](crate::config::ConfigError), …) and convert into
//! [`Error`] at the component boundary.  The variant decides how the
//! caller recovers:
//!
//! * [`NotFound`](Error::NotFound) : log and skip the current cycle.
//! * [`AlreadyRunning`](Error::AlreadyRunning) : fatal at startup.
//! * [`Validation`](Error::Validation) : rejected at the call boundary.
//! * [`Transport`](Error::Transport) : abandon the connection, keep serving.
//! * [`Protocol`](Error::Protocol) / [`Display`](Error::Display) : abandon
//!   the reactive cycle.

use crate::traits::WmError;

/// Errors surfaced by the core components.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("already running with pid {0}")]
    AlreadyRunning(i32),

    #[error("invalid {0}")]
    Validation(String),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("window manager error: {0}")]
    Protocol(#[from] WmError),

    #[error("display server error: {0}")]
    Display(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
