//! Pure functions over a container tree snapshot.
//!
//! Nothing here talks to the window manager: every function reads a
//! [`ContainerNode`] and returns node references or the commands to issue.

use crate::command::{ContainerNode, NodeKind, Orientation, WmCommand};

/// Commands that remove redundant nesting below `root`.
///
/// Every container with exactly one child, where that child is itself a
/// container, gets a `split none` on the child.  Commands are produced
/// top-down, depth-first.
pub fn normalize_commands(root: &ContainerNode) -> Vec<WmCommand> {
    let mut commands = Vec::new();
    collect_normalize(root, &mut commands);
    commands
}

fn collect_normalize(node: &ContainerNode, out: &mut Vec<WmCommand>) {
    if let [only] = node.children.as_slice() {
        if node.kind == NodeKind::Container && only.kind == NodeKind::Container {
            out.push(WmCommand::SplitNone { con_id: only.id });
        }
    }
    for child in &node.children {
        collect_normalize(child, out);
    }
}

/// The containers autogap fits to the screen.
///
/// Starts with the workspace's tiled containers and keeps descending while
/// there is exactly one of them and it has container children of its own.
pub fn top_level_containers(workspace: &ContainerNode) -> Vec<&ContainerNode> {
    let mut level: Vec<&ContainerNode> = workspace.container_children().collect();
    while let [only] = level.as_slice() {
        let below: Vec<&ContainerNode> = only.container_children().collect();
        if below.is_empty() {
            break;
        }
        level = below;
    }
    level
}

/// Orientation the split heuristic picks for `node`: vertical when it is
/// taller than wide.
pub fn split_direction(node: &ContainerNode) -> Orientation {
    if node.rect.height > node.rect.width {
        Orientation::Vertical
    } else {
        Orientation::Horizontal
    }
}

/// A split command for `node`, unless it already has `orientation`.
pub fn split_command_if_needed(node: &ContainerNode, orientation: Orientation) -> Option<WmCommand> {
    (node.orientation != orientation).then_some(WmCommand::Split {
        con_id: node.id,
        orientation,
    })
}
