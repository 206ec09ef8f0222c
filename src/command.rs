//! Commands and types used throughout sway-reflex.
//!
//! This module defines the vocabulary that all components share:
//! [`WmCommand`] describes every command the daemons send to the window
//! manager, [`WmEvent`] every event they react to, and [`ContainerNode`] /
//! [`WorkspaceInfo`] / [`OutputInfo`] provide read-only snapshots of the
//! window manager's state.
//!
//! Nothing here talks to sway directly; the adapters in
//! [`sway`](crate::sway) translate to and from these types.

use crate::geometry::Shape;
use std::fmt;

/// Split orientation of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
    /// Leaf windows, tabbed/stacked containers and anything else that is not
    /// a plain split.
    None,
}

impl Orientation {
    /// The sway layout command that produces this orientation.
    fn split_command(self) -> &'static str {
        match self {
            Orientation::Vertical => "splitv",
            Orientation::Horizontal | Orientation::None => "splith",
        }
    }
}

/// Axis-aligned rectangle in the compositor's global coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// What a [`ContainerNode`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A tiled window or split container.
    Container,
    Workspace,
    FloatingContainer,
    /// Root, outputs, dock areas.
    Other,
}

/// Read-only snapshot of a node in the window manager's container tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    pub id: i64,
    pub kind: NodeKind,
    pub name: Option<String>,
    pub rect: Rect,
    pub orientation: Orientation,
    pub focused: bool,
    /// Process id of the client owning the window, if any.
    pub pid: Option<u32>,
    pub app_id: Option<String>,
    /// Tiled children.
    pub children: Vec<ContainerNode>,
    pub floating_children: Vec<ContainerNode>,
}

impl ContainerNode {
    /// Depth-first search over tiled and floating children, including
    /// `self`.
    pub fn find(&self, predicate: impl Fn(&ContainerNode) -> bool + Copy) -> Option<&ContainerNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter()
            .chain(self.floating_children.iter())
            .find_map(|child| child.find(predicate))
    }

    /// The node that currently has keyboard focus.
    pub fn find_focused(&self) -> Option<&ContainerNode> {
        self.find(|n| n.focused)
    }

    /// The workspace node with the given name.
    pub fn find_workspace(&self, name: &str) -> Option<&ContainerNode> {
        self.find(|n| n.kind == NodeKind::Workspace && n.name.as_deref() == Some(name))
    }

    /// Tiled children that are containers (windows or splits).
    pub fn container_children(&self) -> impl Iterator<Item = &ContainerNode> {
        self.children
            .iter()
            .filter(|n| n.kind == NodeKind::Container)
    }
}

/// Workspace as reported by the window manager's workspace list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub num: i32,
    pub name: String,
    pub focused: bool,
    /// Name of the output the workspace is currently shown on.
    pub output: String,
}

/// Pixel geometry of a monitor as reported by the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    /// Unique name the window manager uses for this monitor (e.g. `"DP-1"`).
    pub name: String,
    pub rect: Rect,
    pub active: bool,
}

/// Physical size of a monitor as reported by the display server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalSize {
    pub name: String,
    pub width_mm: i32,
    pub height_mm: i32,
}

/// Kinds of window change the daemons distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowChange {
    New,
    Close,
    Focus,
    Move,
    Floating,
    Other,
}

/// Every window-manager event the daemons subscribe to.
///
/// Produced by [`EventSource`](crate::traits::EventSource) implementations.
/// Consumers `match` on the variant; kinds a consumer does not care about
/// fall through to an explicit no-op arm.
#[derive(Debug, Clone, PartialEq)]
pub enum WmEvent {
    /// A window changed.  The container snapshot is informational only;
    /// handlers re-query the tree because events may lag behind state.
    Window {
        change: WindowChange,
        container: Box<ContainerNode>,
    },
    /// Workspace focus/creation/move; the output arrangement may have changed.
    Workspace,
    /// A key binding fired with the given command string.
    Binding { command: String },
}

/// Autogap participation switch carried by a `reflex:` binding.
///
/// Bind it in the sway config with e.g.
/// `bindsym $mod+g nop reflex:toggle_current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAction {
    ToggleCurrent,
    EnableCurrent,
    DisableCurrent,
}

/// Namespace prefix that marks a binding command as ours.
pub const BINDING_NAMESPACE: &str = "reflex:";

impl BindingAction {
    /// Parse a binding command.  Returns `None` for bindings outside the
    /// `reflex:` namespace or with an unknown action.
    pub fn parse(command: &str) -> Option<Self> {
        if !command.contains(BINDING_NAMESPACE) {
            return None;
        }
        if command.contains("disable_current") {
            Some(BindingAction::DisableCurrent)
        } else if command.contains("enable_current") {
            Some(BindingAction::EnableCurrent)
        } else if command.contains("toggle_current") {
            Some(BindingAction::ToggleCurrent)
        } else {
            None
        }
    }
}

/// Every command the daemons send to the window manager.
///
/// The [`Display`](fmt::Display) impl renders the exact sway command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmCommand {
    /// Set outer gaps on the current workspace.  Negative values are sent
    /// as `0`.
    SetGaps { horizontal: i32, vertical: i32 },
    /// Set the split orientation of a container.
    Split { con_id: i64, orientation: Orientation },
    /// Remove a redundant split container.
    SplitNone { con_id: i64 },
    /// Toggle the scratchpad window owned by `pid`.
    ShowScratchpad { pid: u32 },
    /// Install the startup rule that sends the first window of `pid` to the
    /// scratchpad and shows it.
    ScratchpadRule { pid: u32 },
    /// Resize and move the window owned by `pid`.
    Place { pid: u32, shape: Shape },
}

impl fmt::Display for WmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WmCommand::SetGaps {
                horizontal,
                vertical,
            } => write!(
                f,
                "gaps horizontal current set {}; gaps vertical current set {}",
                (*horizontal).max(0),
                (*vertical).max(0)
            ),
            WmCommand::Split {
                con_id,
                orientation,
            } => write!(f, "[con_id={}] {}", con_id, orientation.split_command()),
            WmCommand::SplitNone { con_id } => write!(f, "[con_id={}] split none", con_id),
            WmCommand::ShowScratchpad { pid } => write!(f, "[pid={}] scratchpad show", pid),
            WmCommand::ScratchpadRule { pid } => write!(
                f,
                "for_window [pid={}] move scratchpad; for_window [pid={}] scratchpad show",
                pid, pid
            ),
            WmCommand::Place { pid, shape } => write!(
                f,
                "[pid={}] resize set {} {}; [pid={}] move absolute position {} {}",
                pid, shape.width, shape.height, pid, shape.x, shape.y
            ),
        }
    }
}
