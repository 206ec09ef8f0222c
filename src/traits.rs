//! Core traits that decouple sway-reflex from sway, Wayland and the host
//! process table.
//!
//! Every concrete backend (sway IPC, a Wayland client, a test harness, …)
//! implements one of these traits.  The
//! [`AutotileController`](crate::autotile::AutotileController) and the
//! [`ScratchpadRegistry`](crate::scratch::ScratchpadRegistry) only depend on
//! these abstractions.

use crate::command::{ContainerNode, OutputInfo, PhysicalSize, WmCommand, WmEvent, WorkspaceInfo};
use std::sync::mpsc;

/// Errors that can occur when talking to the window manager.
#[derive(Debug, thiserror::Error)]
pub enum WmError {
    /// The command's criteria matched no window.  This is an expected
    /// outcome (e.g. showing a scratchpad whose window was closed), not a
    /// failure.
    #[error("no matching node")]
    NoMatchingNode,

    /// The window manager rejected the command.
    #[error("command {command:?} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// Connection, framing or decoding problem.
    #[error("ipc: {0}")]
    Ipc(String),
}

/// Abstraction over a window manager that can be queried and commanded.
///
/// An implementation might talk to sway via IPC, or it might be an
/// in-memory stub used in tests.  Methods take `&self`; implementations
/// that need exclusive access to a connection guard it internally.
pub trait WindowManager {
    /// The full container tree, rooted at the root node.
    fn tree(&self) -> Result<ContainerNode, WmError>;

    /// All workspaces with their focus flag and output assignment.
    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, WmError>;

    /// All outputs with their pixel geometry.
    fn outputs(&self) -> Result<Vec<OutputInfo>, WmError>;

    /// Execute one command string.  A command string may chain several
    /// sway commands with `;`; it fails if any of them fails.
    fn run(&self, command: &WmCommand) -> Result<(), WmError>;

    /// The currently focused workspace.
    fn focused_workspace(&self) -> Result<Option<WorkspaceInfo>, WmError> {
        Ok(self.workspaces()?.into_iter().find(|w| w.focused))
    }
}

/// Source of monitor physical sizes.
///
/// Two strategies exist: asking the compositor over the Wayland protocol
/// ([`WaylandPhysicalSource`](crate::output::wayland::WaylandPhysicalSource))
/// and reading them from configuration
/// ([`FixedPhysicalSource`](crate::output::fixed::FixedPhysicalSource)).
/// Which one runs is decided at startup.
pub trait PhysicalSizeSource {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Physical size of every monitor currently connected.
    fn physical_sizes(&self) -> Result<Vec<PhysicalSize>, Self::Error>;
}

/// A source of [`WmEvent`]s.
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Events are forwarded in the order received, each exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming event into `sink`.
    fn run(&mut self, sink: mpsc::Sender<WmEvent>) -> Result<(), Self::Error>;
}

/// Starts scratchpad programs.
pub trait Launcher {
    /// Launch `command` detached from the caller and return its process id.
    fn launch(&self, command: &str) -> std::io::Result<u32>;
}
