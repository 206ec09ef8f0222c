//! Named scratchpads: quick-launch windows that are spawned once and then
//! toggled in and out of view.
//!
//! A client sends a [`ToggleRequest`] over the IPC socket; the
//! [`ScratchpadRegistry`] either shows the window that belongs to that id or
//! spawns its program.  Window events are routed back to the registry so a
//! freshly shown scratchpad is resized to its physical size and placed on the
//! focused output.

pub mod definition;
pub mod launcher;
pub mod registry;

pub use definition::{Definition, ToggleRequest, WireDefinition};
pub use launcher::ShellLauncher;
pub use registry::ScratchpadRegistry;

/// A scratchpad and the process that backs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scratchpad {
    pub definition: Definition,
    /// `0` until the first successful spawn.  Never checked for liveness.
    pub pid: u32,
}

impl Scratchpad {
    pub fn new(definition: Definition) -> Self {
        Self { definition, pid: 0 }
    }
}
