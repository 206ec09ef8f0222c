//! IPC over a Unix socket.
//!
//! Clients connect, write exactly one JSON value and close.  There is no
//! response.

pub mod client;
pub mod listener;

use crate::config::runtime_file;
use std::path::PathBuf;

/// Socket name used by the scratchpad daemon.
pub const SCRATCH_SOCKET: &str = "sway_scratch";

/// `<XDG_RUNTIME_DIR or /tmp>/<name>.sock`.
pub fn socket_path(name: &str) -> PathBuf {
    runtime_file(name, "sock")
}
