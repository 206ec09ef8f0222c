//! Unix-socket listener that turns connections into messages.
//!
//! Binds a Unix stream socket and accepts one connection at a time.  Each
//! connection carries exactly one JSON value, which is decoded into `M` and
//! forwarded into a [`mpsc`] channel.
//!
//! # Wire format
//!
//! ```json
//! {"ID":"term","Definition":{"Position":0,"Cmd":"kitty","WindowWidth":200,"WindowHeight":100}}
//! ```

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// Listens on a Unix stream socket for JSON-encoded `M` messages.
///
/// Connections are served sequentially.  A connection that fails to read
/// or decode is dropped and the listener moves on to the next one.
pub struct UnixSocketListener<M> {
    path: PathBuf,
    stop: Arc<AtomicBool>,
    _message: PhantomData<fn() -> M>,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<UnixSocketError> for crate::error::Error {
    fn from(e: UnixSocketError) -> Self {
        match e {
            UnixSocketError::Io(e) => crate::error::Error::Transport(e),
            UnixSocketError::Json(e) => crate::error::Error::Transport(e.into()),
        }
    }
}

impl<M: DeserializeOwned> UnixSocketListener<M> {
    /// Create a listener for `path`.
    ///
    /// The socket file is created when [`run`](UnixSocketListener::run) is
    /// called and removed when it returns.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stop: Arc::new(AtomicBool::new(false)),
            _message: PhantomData,
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A handle that stops the listener; see [`StopHandle::stop`].
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            path: self.path.clone(),
            stop: Arc::clone(&self.stop),
        }
    }

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until stopped or until `sink` is closed.  Run
    /// it on a dedicated thread.
    pub fn run(&mut self, sink: mpsc::Sender<M>) -> Result<(), UnixSocketError> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                info!("stop requested, shutting down");
                break;
            }
            match stream {
                Ok(stream) => match read_message::<M>(stream) {
                    Ok(msg) => {
                        if sink.send(msg).is_err() {
                            info!("sink closed, shutting down");
                            break;
                        }
                    }
                    Err(e) => warn!("dropping connection: {}", e),
                },
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }

        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

fn read_message<M: DeserializeOwned>(stream: UnixStream) -> Result<M, UnixSocketError> {
    debug!("client connected");
    let mut de = serde_json::Deserializer::from_reader(stream);
    Ok(M::deserialize(&mut de)?)
}

/// Stops a running [`UnixSocketListener`] from another thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    path: PathBuf,
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    /// Raise the stop flag and wake the accept loop with an empty
    /// connection.  The listener exits before handling anything else.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Err(e) = UnixStream::connect(&self.path) {
            debug!("wake-up connect to {} failed: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch::{ToggleRequest, WireDefinition};
    use std::io::Write;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    /// Monotonic counter to generate unique socket paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("sway-reflex-test-{}-{}.sock", std::process::id(), id))
    }

    fn spawn_listener(
        path: &Path,
    ) -> (
        mpsc::Receiver<ToggleRequest>,
        StopHandle,
        std::thread::JoinHandle<()>,
    ) {
        let (tx, rx) = mpsc::channel();
        let mut listener = UnixSocketListener::<ToggleRequest>::new(path);
        let stop = listener.stop_handle();
        let handle = std::thread::spawn(move || {
            let _ = listener.run(tx);
        });
        // Give the listener a moment to bind.
        std::thread::sleep(Duration::from_millis(150));
        (rx, stop, handle)
    }

    fn request(id: &str) -> ToggleRequest {
        ToggleRequest {
            id: id.into(),
            definition: WireDefinition {
                position: 0,
                cmd: "kitty".into(),
                window_width: 200,
                window_height: 100,
            },
        }
    }

    #[test]
    fn one_message_per_connection() {
        let path = tmp_socket_path();
        let (rx, stop, handle) = spawn_listener(&path);

        for id in ["a", "b"] {
            let mut stream = UnixStream::connect(&path).expect("connect");
            serde_json::to_writer(&mut stream, &request(id)).unwrap();
            stream.shutdown(std::net::Shutdown::Write).unwrap();
        }

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, request("a"));
        assert_eq!(second, request("b"));

        stop.stop();
        handle.join().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn malformed_json_does_not_crash() {
        let path = tmp_socket_path();
        let (rx, stop, handle) = spawn_listener(&path);

        {
            let mut stream = UnixStream::connect(&path).expect("connect");
            writeln!(stream, "not json at all").unwrap();
        }
        {
            let mut stream = UnixStream::connect(&path).expect("connect");
            serde_json::to_writer(&mut stream, &request("ok")).unwrap();
        }

        let got = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(got.id, "ok");
        assert!(rx.try_recv().is_err());

        stop.stop();
        handle.join().unwrap();
    }

    #[test]
    fn stale_socket_file_is_replaced() {
        let path = tmp_socket_path();
        std::fs::write(&path, b"stale").unwrap();
        let (rx, stop, handle) = spawn_listener(&path);

        let mut stream = UnixStream::connect(&path).expect("connect");
        serde_json::to_writer(&mut stream, &request("fresh")).unwrap();
        drop(stream);

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap().id, "fresh");
        stop.stop();
        handle.join().unwrap();
    }

    #[test]
    fn closed_sink_stops_listener() {
        let path = tmp_socket_path();
        let (rx, _stop, handle) = spawn_listener(&path);
        drop(rx);

        let mut stream = UnixStream::connect(&path).expect("connect");
        serde_json::to_writer(&mut stream, &request("x")).unwrap();
        drop(stream);

        handle.join().unwrap();
    }
}
