//! Sending a single message to a listener.

use super::listener::UnixSocketError;
use log::debug;
use serde::Serialize;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::Path;

/// Connect to `path`, write `message` as one JSON value and close.
pub fn send<M: Serialize>(path: &Path, message: &M) -> Result<(), UnixSocketError> {
    let mut stream = UnixStream::connect(path)?;
    serde_json::to_writer(&mut stream, message)?;
    stream.flush()?;
    stream.shutdown(std::net::Shutdown::Write)?;
    debug!("sent message to {}", path.display());
    Ok(())
}
