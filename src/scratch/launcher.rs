//! Spawning scratchpad programs through the shell.

use crate::traits::Launcher;
use log::{debug, info, warn};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

/// A [`Launcher`] that runs commands with `<shell> -c`.
///
/// The child's stdout and stderr are forwarded to the log line by line and
/// the child is reaped on a background thread, so it never lingers as a
/// zombie.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    shell: String,
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self { shell: "sh".into() }
    }
}

impl ShellLauncher {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Launcher for ShellLauncher {
    fn launch(&self, command: &str) -> io::Result<u32> {
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let pid = child.id();
        info!("spawned {:?} with pid {}", command, pid);

        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, "command out");
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, "command err");
        }

        thread::spawn(move || match child.wait() {
            Ok(status) => debug!("pid {} exited: {}", pid, status),
            Err(e) => warn!("failed to wait for pid {}: {}", pid, e),
        });

        Ok(pid)
    }
}

fn forward_lines<R: Read + Send + 'static>(reader: R, prefix: &'static str) {
    thread::spawn(move || {
        for line in BufReader::new(reader).lines().map_while(Result::ok) {
            info!("{}: {}", prefix, line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_returns_child_pid() {
        let pid = ShellLauncher::default().launch("echo hello").unwrap();
        assert!(pid > 0);
    }

    #[test]
    fn missing_shell_is_an_error() {
        let launcher = ShellLauncher::new("/nonexistent/shell");
        assert!(launcher.launch("true").is_err());
    }
}
