//! [`WindowManager`] implementation backed by sway IPC.

use crate::command::{
    ContainerNode, NodeKind, OutputInfo, Orientation, Rect, WmCommand, WorkspaceInfo,
};
use crate::traits::{WindowManager, WmError};
use log::debug;
use std::sync::Mutex;
use swayipc as s;

/// Sway-backed window manager.
///
/// Holds one IPC connection; requests are serialized through a mutex
/// because sway answers them strictly in order.
pub struct SwayWm {
    conn: Mutex<s::Connection>,
}

impl SwayWm {
    /// Connect to the sway instance named by `$SWAYSOCK`.
    pub fn connect() -> Result<Self, WmError> {
        let conn = s::Connection::new().map_err(ipc_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut s::Connection) -> s::Fallible<T>,
    ) -> Result<T, WmError> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut conn).map_err(ipc_error)
    }
}

impl WindowManager for SwayWm {
    fn tree(&self) -> Result<ContainerNode, WmError> {
        let root = self.with_conn(|c| c.get_tree())?;
        Ok(convert_node(&root))
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, WmError> {
        let workspaces = self.with_conn(|c| c.get_workspaces())?;
        Ok(workspaces
            .into_iter()
            .map(|w| WorkspaceInfo {
                num: w.num,
                name: w.name,
                focused: w.focused,
                output: w.output,
            })
            .collect())
    }

    fn outputs(&self) -> Result<Vec<OutputInfo>, WmError> {
        let outputs = self.with_conn(|c| c.get_outputs())?;
        Ok(outputs
            .into_iter()
            .map(|o| OutputInfo {
                name: o.name,
                rect: convert_rect(&o.rect),
                active: o.active,
            })
            .collect())
    }

    fn run(&self, command: &WmCommand) -> Result<(), WmError> {
        let payload = command.to_string();
        debug!("run: {}", payload);
        let outcomes = self.with_conn(|c| c.run_command(&payload))?;
        for outcome in outcomes {
            if let Err(e) = outcome {
                return Err(command_error(&payload, e));
            }
        }
        Ok(())
    }
}

fn ipc_error(e: s::Error) -> WmError {
    WmError::Ipc(e.to_string())
}

fn command_error(payload: &str, e: s::Error) -> WmError {
    match e {
        s::Error::CommandFailed(reason) if is_no_match(&reason) => WmError::NoMatchingNode,
        s::Error::CommandFailed(reason) => WmError::CommandFailed {
            command: payload.to_string(),
            reason,
        },
        other => ipc_error(other),
    }
}

fn is_no_match(reason: &str) -> bool {
    reason.contains("No matching node")
}

fn convert_rect(r: &s::Rect) -> Rect {
    Rect {
        x: r.x,
        y: r.y,
        width: r.width,
        height: r.height,
    }
}

pub(super) fn convert_node(node: &s::Node) -> ContainerNode {
    let kind = match node.node_type {
        s::NodeType::Con => NodeKind::Container,
        s::NodeType::FloatingCon => NodeKind::FloatingContainer,
        s::NodeType::Workspace => NodeKind::Workspace,
        _ => NodeKind::Other,
    };
    let orientation = match node.layout {
        s::NodeLayout::SplitH => Orientation::Horizontal,
        s::NodeLayout::SplitV => Orientation::Vertical,
        _ => Orientation::None,
    };

    ContainerNode {
        id: node.id,
        kind,
        name: node.name.clone(),
        rect: convert_rect(&node.rect),
        orientation,
        focused: node.focused,
        pid: node.pid.and_then(|p| u32::try_from(p).ok()),
        app_id: node.app_id.clone(),
        children: node.nodes.iter().map(convert_node).collect(),
        floating_children: node.floating_nodes.iter().map(convert_node).collect(),
    }
}
