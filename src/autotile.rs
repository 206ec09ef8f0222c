//! The autogap / autotile event handler.
//!
//! [`AutotileController`] reacts to [`WmEvent`]s by re-reading the container
//! tree, tidying redundant nesting, and then either sizing the outer gaps so
//! the top-level containers keep their preferred physical size, or picking a
//! split orientation for the focused window from its aspect ratio.

use crate::command::{
    BindingAction, ContainerNode, NodeKind, Orientation, WindowChange, WmCommand, WmEvent,
    WorkspaceInfo,
};
use crate::config::ReflexSettings;
use crate::error::{Error, Result};
use crate::geometry::{Direction, Screen};
use crate::output::OutputRegistry;
use crate::traits::{PhysicalSizeSource, WindowManager};
use crate::tree::{normalize_commands, split_command_if_needed, split_direction, top_level_containers};
use log::{debug, info};

/// Reacts to window-manager events with gap and split commands.
///
/// Generic over the [`WindowManager`] and the [`PhysicalSizeSource`], so it
/// runs against sway in production and against in-memory doubles in tests.
/// Events are handled one at a time; the controller is not shared.
pub struct AutotileController<W: WindowManager, P: PhysicalSizeSource> {
    wm: W,
    outputs: OutputRegistry<P>,
    settings: ReflexSettings,
}

impl<W: WindowManager, P: PhysicalSizeSource> AutotileController<W, P> {
    pub fn new(wm: W, outputs: OutputRegistry<P>, settings: ReflexSettings) -> Self {
        Self {
            wm,
            outputs,
            settings,
        }
    }

    /// Whether autogap is currently switched off for workspace `num`.
    pub fn is_disabled(&self, num: i32) -> bool {
        self.settings.disabled_workspaces.contains(&num)
    }

    /// Process a single event.
    ///
    /// Errors abandon the current cycle only; the caller logs them and keeps
    /// feeding events.
    pub fn handle(&mut self, event: WmEvent) -> Result<()> {
        match event {
            WmEvent::Window { change, .. } => self.on_window(change),
            WmEvent::Workspace => {
                debug!("workspace event, invalidating output cache");
                self.outputs.invalidate();
                Ok(())
            }
            WmEvent::Binding { command } => match BindingAction::parse(&command) {
                Some(action) => self.on_binding(action),
                None => Ok(()),
            },
        }
    }

    fn on_window(&mut self, change: WindowChange) -> Result<()> {
        let tree = self.wm.tree()?;
        let Some(focused) = tree.find_focused() else {
            debug!("no focused node");
            return Ok(());
        };
        if focused.kind != NodeKind::Container {
            return Ok(());
        }
        if let Some(app_id) = &focused.app_id {
            if self.settings.disabled_app_ids.contains(app_id) {
                debug!("app {} is disabled, ignoring", app_id);
                return Ok(());
            }
        }
        let focused_id = focused.id;

        let Some(workspace_info) = self.wm.focused_workspace()? else {
            debug!("no focused workspace");
            return Ok(());
        };
        if self.is_disabled(workspace_info.num) {
            debug!("workspace {} is disabled, ignoring", workspace_info.num);
            return Ok(());
        }

        let normalize = normalize_commands(find_workspace(&tree, &workspace_info)?);
        let tree = if normalize.is_empty() {
            tree
        } else {
            debug!("normalizing {} container(s)", normalize.len());
            for cmd in &normalize {
                self.wm.run(cmd)?;
            }
            self.wm.tree()?
        };

        let workspace = find_workspace(&tree, &workspace_info)?;
        let top = top_level_containers(workspace);

        if change == WindowChange::Close || top.iter().any(|n| n.id == focused_id) {
            return self.autogap(&workspace_info, &top);
        }

        match tree.find(|n| n.id == focused_id) {
            Some(node) => self.autotile(node),
            None => Ok(()),
        }
    }

    fn on_binding(&mut self, action: BindingAction) -> Result<()> {
        let Some(workspace_info) = self.wm.focused_workspace()? else {
            return Ok(());
        };
        let num = workspace_info.num;

        let disable = match action {
            BindingAction::DisableCurrent => true,
            BindingAction::EnableCurrent => false,
            BindingAction::ToggleCurrent => !self.is_disabled(num),
        };

        if disable {
            info!("autogap disabled on workspace {}", num);
            self.settings.disabled_workspaces.insert(num);
            self.wm.run(&WmCommand::SetGaps {
                horizontal: self.settings.default_gap_horizontal,
                vertical: self.settings.default_gap_vertical,
            })?;
            Ok(())
        } else {
            info!("autogap enabled on workspace {}", num);
            self.settings.disabled_workspaces.remove(&num);
            let tree = self.wm.tree()?;
            let workspace = find_workspace(&tree, &workspace_info)?;
            self.autogap(&workspace_info, &top_level_containers(workspace))
        }
    }

    /// Size the outer gaps around `top` and settle their orientation.
    fn autogap(&mut self, workspace: &WorkspaceInfo, top: &[&ContainerNode]) -> Result<()> {
        let output = self.outputs.get(&self.wm, &workspace.output)?;
        let screen = Screen::new(
            &output,
            self.settings.preference,
            self.settings.default_gap_horizontal,
            self.settings.default_gap_vertical,
        );

        let (width, height) = screen.fit_container(top.len());
        let (horizontal, vertical) = screen.outer_gaps(width, height);
        debug!(
            "{} top-level container(s) on {}: {}x{}, gaps {}/{}",
            top.len(),
            output.name,
            width,
            height,
            horizontal,
            vertical
        );
        self.wm.run(&WmCommand::SetGaps {
            horizontal,
            vertical,
        })?;

        if let [only] = top {
            let orientation = match screen.direction {
                Direction::Horizontal => Orientation::Horizontal,
                Direction::Vertical => Orientation::Vertical,
            };
            if let Some(cmd) = split_command_if_needed(only, orientation) {
                self.wm.run(&cmd)?;
            }
        }

        if screen.is_filled(width, height) {
            for node in top {
                self.autotile(node)?;
            }
        }
        Ok(())
    }

    fn autotile(&self, node: &ContainerNode) -> Result<()> {
        if let Some(cmd) = split_command_if_needed(node, split_direction(node)) {
            self.wm.run(&cmd)?;
        }
        Ok(())
    }
}

fn find_workspace<'a>(tree: &'a ContainerNode, info: &WorkspaceInfo) -> Result<&'a ContainerNode> {
    tree.find_workspace(&info.name)
        .ok_or_else(|| Error::NotFound(format!("workspace {:?}", info.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PhysicalPreference;
    use crate::traits::testing::{
        single_output, split, tree_with_workspace, window, workspace_info, MockPhysical, MockWm,
    };
    use std::collections::HashSet;

    /// 50×25 mm on the 2000×1000 px / 200×100 mm test monitor is 500×250 px.
    fn settings() -> ReflexSettings {
        ReflexSettings {
            preference: PhysicalPreference {
                width_mm: 50,
                height_mm: 25,
            },
            default_gap_horizontal: 0,
            default_gap_vertical: 0,
            disabled_workspaces: HashSet::new(),
            disabled_app_ids: HashSet::new(),
        }
    }

    fn controller(
        children: Vec<ContainerNode>,
        settings: ReflexSettings,
    ) -> AutotileController<MockWm, MockPhysical> {
        let (outputs, sizes) = single_output();
        let wm = MockWm::default();
        *wm.outputs.lock().unwrap() = outputs;
        *wm.workspaces.lock().unwrap() = vec![workspace_info(1, "DP-1")];
        wm.set_tree(tree_with_workspace("1", children));
        let registry = OutputRegistry::new(MockPhysical {
            sizes,
            ..Default::default()
        });
        AutotileController::new(wm, registry, settings)
    }

    fn focused(mut node: ContainerNode) -> ContainerNode {
        node.focused = true;
        node
    }

    fn window_event(change: WindowChange) -> WmEvent {
        WmEvent::Window {
            change,
            container: Box::new(window(99, 1, 1)),
        }
    }

    #[test]
    fn two_windows_are_centered() {
        let mut ctl = controller(
            vec![focused(window(10, 1000, 1000)), window(11, 1000, 1000)],
            settings(),
        );
        ctl.handle(window_event(WindowChange::New)).unwrap();
        assert_eq!(
            ctl.wm.commands(),
            vec!["gaps horizontal current set 500; gaps vertical current set 375"]
        );
    }

    #[test]
    fn single_window_takes_screen_direction() {
        let mut ctl = controller(vec![focused(window(10, 2000, 1000))], settings());
        ctl.handle(window_event(WindowChange::Focus)).unwrap();
        assert_eq!(
            ctl.wm.commands(),
            vec![
                "gaps horizontal current set 750; gaps vertical current set 375",
                "[con_id=10] splith",
            ]
        );
    }

    #[test]
    fn single_window_already_oriented_gets_no_split() {
        let mut node = focused(window(10, 2000, 1000));
        node.orientation = Orientation::Horizontal;
        let mut ctl = controller(vec![node], settings());
        ctl.handle(window_event(WindowChange::Focus)).unwrap();
        assert_eq!(ctl.wm.commands().len(), 1);
    }

    #[test]
    fn nested_focus_uses_heuristic() {
        let nested = split(
            10,
            Orientation::Horizontal,
            vec![focused(window(11, 300, 600)), window(12, 300, 600)],
        );
        let mut ctl = controller(vec![nested, window(13, 1000, 1000)], settings());
        ctl.handle(window_event(WindowChange::Focus)).unwrap();
        assert_eq!(ctl.wm.commands(), vec!["[con_id=11] splitv"]);
    }

    #[test]
    fn close_event_runs_autogap_even_when_nested() {
        let nested = split(
            10,
            Orientation::Horizontal,
            vec![focused(window(11, 300, 600)), window(12, 300, 600)],
        );
        let mut ctl = controller(vec![nested, window(13, 1000, 1000)], settings());
        ctl.handle(window_event(WindowChange::Close)).unwrap();
        assert_eq!(
            ctl.wm.commands(),
            vec!["gaps horizontal current set 500; gaps vertical current set 375"]
        );
    }

    #[test]
    fn filled_screen_applies_heuristic_to_every_top_level_container() {
        // 100×50 mm is 1000×500 px; four of them overflow to the full screen.
        let mut s = settings();
        s.preference = PhysicalPreference {
            width_mm: 100,
            height_mm: 50,
        };
        let mut ctl = controller(
            vec![
                focused(window(10, 500, 1000)),
                window(11, 500, 1000),
                window(12, 500, 1000),
                window(13, 500, 1000),
            ],
            s,
        );
        ctl.handle(window_event(WindowChange::New)).unwrap();
        assert_eq!(
            ctl.wm.commands(),
            vec![
                "gaps horizontal current set 0; gaps vertical current set 0",
                "[con_id=10] splitv",
                "[con_id=11] splitv",
                "[con_id=12] splitv",
                "[con_id=13] splitv",
            ]
        );
    }

    #[test]
    fn normalization_runs_before_autogap() {
        let inner = split(
            11,
            Orientation::Vertical,
            vec![focused(window(12, 1000, 1000)), window(13, 1000, 1000)],
        );
        let outer = split(10, Orientation::Horizontal, vec![inner]);
        let mut ctl = controller(vec![outer], settings());
        ctl.handle(window_event(WindowChange::New)).unwrap();

        let commands = ctl.wm.commands();
        assert_eq!(commands[0], "[con_id=11] split none");
        assert_eq!(
            commands[1],
            "gaps horizontal current set 500; gaps vertical current set 375"
        );
    }

    #[test]
    fn disabled_workspace_is_ignored() {
        let mut s = settings();
        s.disabled_workspaces.insert(1);
        let mut ctl = controller(vec![focused(window(10, 1000, 1000))], s);
        ctl.handle(window_event(WindowChange::New)).unwrap();
        assert!(ctl.wm.commands().is_empty());
    }

    #[test]
    fn disabled_app_id_is_ignored() {
        let mut s = settings();
        s.disabled_app_ids.insert("pavucontrol".into());
        let mut node = focused(window(10, 1000, 1000));
        node.app_id = Some("pavucontrol".into());
        let mut ctl = controller(vec![node], s);
        ctl.handle(window_event(WindowChange::New)).unwrap();
        assert!(ctl.wm.commands().is_empty());
    }

    #[test]
    fn floating_focus_is_ignored() {
        let mut ctl = controller(vec![window(10, 1000, 1000)], settings());
        let mut tree = tree_with_workspace("1", vec![window(10, 1000, 1000)]);
        tree.children[0].children[0]
            .floating_children
            .push(ContainerNode {
                kind: NodeKind::FloatingContainer,
                ..focused(window(20, 400, 300))
            });
        ctl.wm.set_tree(tree);
        ctl.handle(window_event(WindowChange::Floating)).unwrap();
        assert!(ctl.wm.commands().is_empty());
    }

    #[test]
    fn workspace_event_only_invalidates() {
        let mut ctl = controller(vec![focused(window(10, 1000, 1000))], settings());
        ctl.handle(window_event(WindowChange::Focus)).unwrap();
        assert!(ctl.outputs.is_valid());
        let before = ctl.wm.commands().len();

        ctl.handle(WmEvent::Workspace).unwrap();
        assert!(!ctl.outputs.is_valid());
        assert_eq!(ctl.wm.commands().len(), before);
    }

    #[test]
    fn unknown_output_is_not_found() {
        let mut ctl = controller(vec![focused(window(10, 1000, 1000))], settings());
        *ctl.wm.workspaces.lock().unwrap() = vec![workspace_info(1, "HDMI-A-1")];
        let err = ctl.handle(window_event(WindowChange::New)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn disable_binding_resets_gaps() {
        let mut s = settings();
        s.default_gap_horizontal = 6;
        s.default_gap_vertical = 4;
        let mut ctl = controller(vec![focused(window(10, 1000, 1000))], s);
        ctl.handle(WmEvent::Binding {
            command: "nop reflex:disable_current".into(),
        })
        .unwrap();
        assert!(ctl.is_disabled(1));
        assert_eq!(
            ctl.wm.commands(),
            vec!["gaps horizontal current set 6; gaps vertical current set 4"]
        );

        ctl.handle(window_event(WindowChange::New)).unwrap();
        assert_eq!(ctl.wm.commands().len(), 1);
    }

    #[test]
    fn toggle_binding_round_trip() {
        let mut ctl = controller(
            vec![focused(window(10, 1000, 1000)), window(11, 1000, 1000)],
            settings(),
        );
        let toggle = || WmEvent::Binding {
            command: "nop reflex:toggle_current".into(),
        };

        ctl.handle(toggle()).unwrap();
        assert!(ctl.is_disabled(1));
        ctl.handle(toggle()).unwrap();
        assert!(!ctl.is_disabled(1));
        assert_eq!(
            ctl.wm.commands(),
            vec![
                "gaps horizontal current set 0; gaps vertical current set 0",
                "gaps horizontal current set 500; gaps vertical current set 375",
            ]
        );
    }

    #[test]
    fn foreign_bindings_are_ignored() {
        let mut ctl = controller(vec![focused(window(10, 1000, 1000))], settings());
        ctl.handle(WmEvent::Binding {
            command: "exec kitty".into(),
        })
        .unwrap();
        assert!(ctl.wm.commands().is_empty());
        assert!(!ctl.is_disabled(1));
    }
}
