//! Single-instance locking through a pidfile.

use crate::config::runtime_file;
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Pidfile name of the autogap/autotile daemon.
pub const REFLEX_PIDFILE: &str = "sway_reflex";

/// Pidfile name of the scratchpad daemon.
pub const SCRATCH_PIDFILE: &str = "sway_scratch";

/// A claimed pidfile.  The file is removed when this guard is dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Claim `<XDG_RUNTIME_DIR or /tmp>/<name>.pid` for this process.
    pub fn lock(name: &str) -> Result<Self> {
        Self::lock_at(runtime_file(name, "pid"))
    }

    /// Claim the pidfile at `path`.
    ///
    /// Fails with [`Error::AlreadyRunning`] when the file names a live
    /// process.  A file naming a dead process, or one that does not parse,
    /// is stale and gets overwritten.
    pub fn lock_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        match fs::read_to_string(&path) {
            Ok(contents) => match contents.trim().parse::<i32>() {
                Ok(pid) if pid > 0 && is_alive(pid) => return Err(Error::AlreadyRunning(pid)),
                Ok(pid) => info!("reclaiming stale pidfile {} (pid {})", path.display(), pid),
                Err(_) => warn!("reclaiming unreadable pidfile {}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        fs::write(&path, format!("{}\n", std::process::id()))?;
        debug!("locked {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("failed to remove {}: {}", self.path.display(), e);
        }
    }
}

fn is_alive(pid: i32) -> bool {
    // SAFETY: signal 0 performs only the existence and permission check.
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return true;
    }
    // EPERM: the process exists but belongs to someone else.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}
