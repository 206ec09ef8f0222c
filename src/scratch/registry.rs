//! The shared scratchpad table.

use super::{Definition, Scratchpad, ToggleRequest};
use crate::command::{WmCommand, WmEvent};
use crate::error::Result;
use crate::geometry::scratchpad_shape;
use crate::output::OutputRegistry;
use crate::traits::{Launcher, PhysicalSizeSource, WindowManager, WmError};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

struct State<P: PhysicalSizeSource> {
    scratchpads: HashMap<String, Scratchpad>,
    outputs: OutputRegistry<P>,
}

/// Tracks named scratchpads by the pid of the program that backs them.
///
/// Shared between the IPC loop and the window-event loop.  A single mutex
/// guards the table and the output cache, and it stays held while commands
/// are sent to the window manager, so toggles and repositioning never
/// interleave.
pub struct ScratchpadRegistry<W, P, L>
where
    W: WindowManager,
    P: PhysicalSizeSource,
    L: Launcher,
{
    wm: W,
    launcher: L,
    state: Mutex<State<P>>,
}

impl<W, P, L> ScratchpadRegistry<W, P, L>
where
    W: WindowManager,
    P: PhysicalSizeSource,
    L: Launcher,
{
    pub fn new(wm: W, outputs: OutputRegistry<P>, launcher: L) -> Self {
        Self {
            wm,
            launcher,
            state: Mutex::new(State {
                scratchpads: HashMap::new(),
                outputs,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<P>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Show, hide or spawn the scratchpad called `request.id`.
    ///
    /// An unseen id is validated first; an invalid definition leaves the
    /// table untouched.  The definition of a known id is ignored.
    pub fn toggle(&self, request: ToggleRequest) -> Result<()> {
        let mut state = self.lock();

        if let Some(pad) = state.scratchpads.get_mut(&request.id) {
            debug!("toggling scratchpad {}", request.id);
            return self.toggle_pad(pad);
        }

        let definition = Definition::try_from(&request.definition)?;
        let mut pad = Scratchpad::new(definition);
        self.toggle_pad(&mut pad)?;
        info!("new scratchpad {} with pid {}", request.id, pad.pid);
        state.scratchpads.insert(request.id, pad);
        Ok(())
    }

    /// Place the focused window if it belongs to a scratchpad.
    pub fn on_window(&self) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let tree = self.wm.tree()?;
        let Some(pid) = tree.find_focused().and_then(|n| n.pid) else {
            return Ok(());
        };
        if pid == 0 {
            return Ok(());
        }
        let Some(pad) = state.scratchpads.values().find(|p| p.pid == pid) else {
            return Ok(());
        };
        let Some(workspace) = self.wm.focused_workspace()? else {
            return Ok(());
        };

        let output = state.outputs.get(&self.wm, &workspace.output)?;
        let shape = scratchpad_shape(&output, pad.definition.position, pad.definition.preference);
        debug!("placing scratchpad pid {} at {:?}", pid, shape);
        self.wm.run(&WmCommand::Place { pid, shape })?;
        Ok(())
    }

    /// The output arrangement may have changed.
    pub fn on_workspace(&self) {
        self.lock().outputs.invalidate();
    }

    /// Route a window-manager event.  Bindings are not ours.
    pub fn handle_event(&self, event: WmEvent) -> Result<()> {
        match event {
            WmEvent::Window { .. } => self.on_window(),
            WmEvent::Workspace => {
                self.on_workspace();
                Ok(())
            }
            WmEvent::Binding { .. } => Ok(()),
        }
    }

    /// Number of known scratchpads.
    pub fn len(&self) -> usize {
        self.lock().scratchpads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pid recorded for `id`, if the id is known.
    pub fn pid_of(&self, id: &str) -> Option<u32> {
        self.lock().scratchpads.get(id).map(|p| p.pid)
    }

    fn toggle_pad(&self, pad: &mut Scratchpad) -> Result<()> {
        if pad.pid == 0 {
            return self.spawn(pad);
        }

        match self.wm.run(&WmCommand::ShowScratchpad { pid: pad.pid }) {
            Ok(()) => Ok(()),
            Err(WmError::NoMatchingNode) => {
                info!("no window for pid {}, respawning", pad.pid);
                self.spawn(pad)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn spawn(&self, pad: &mut Scratchpad) -> Result<()> {
        let pid = self.launcher.launch(&pad.definition.command)?;
        self.wm.run(&WmCommand::ScratchpadRule { pid })?;
        pad.pid = pid;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::scratch::WireDefinition;
    use crate::traits::testing::{
        single_output, tree_with_workspace, window, workspace_info, MockLauncher, MockPhysical,
        MockWm,
    };
    use std::sync::Arc;

    type TestRegistry = ScratchpadRegistry<MockWm, MockPhysical, MockLauncher>;

    fn registry() -> TestRegistry {
        let (outputs, sizes) = single_output();
        let wm = MockWm::default();
        *wm.outputs.lock().unwrap() = outputs;
        *wm.workspaces.lock().unwrap() = vec![workspace_info(1, "DP-1")];
        ScratchpadRegistry::new(
            wm,
            OutputRegistry::new(MockPhysical {
                sizes,
                ..Default::default()
            }),
            MockLauncher::default(),
        )
    }

    fn request(id: &str) -> ToggleRequest {
        ToggleRequest {
            id: id.into(),
            definition: WireDefinition {
                position: 0,
                cmd: "kitty".into(),
                window_width: 50,
                window_height: 40,
            },
        }
    }

    /// Focus a window owned by `pid` on workspace `1`.
    fn focus_pid(reg: &TestRegistry, pid: u32) {
        let mut node = window(10, 500, 400);
        node.pid = Some(pid);
        node.focused = true;
        reg.wm.set_tree(tree_with_workspace("1", vec![node]));
    }

    #[test]
    fn first_toggle_spawns() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();

        assert_eq!(reg.launcher.launched(), vec!["kitty"]);
        assert_eq!(
            reg.wm.commands(),
            vec!["for_window [pid=4001] move scratchpad; for_window [pid=4001] scratchpad show"]
        );
        assert_eq!(reg.pid_of("term"), Some(4001));
    }

    #[test]
    fn second_toggle_shows() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();
        reg.toggle(request("term")).unwrap();

        assert_eq!(reg.launcher.launched().len(), 1);
        let commands = reg.wm.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1], "[pid=4001] scratchpad show");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn missing_window_respawns() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();
        reg.wm.push_result(Err(WmError::NoMatchingNode));
        reg.toggle(request("term")).unwrap();

        assert_eq!(reg.launcher.launched().len(), 2);
        assert_eq!(reg.pid_of("term"), Some(4002));
        assert_eq!(
            reg.wm.commands().last().unwrap(),
            "for_window [pid=4002] move scratchpad; for_window [pid=4002] scratchpad show"
        );
    }

    #[test]
    fn other_show_failure_is_protocol_error() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();
        reg.wm.push_result(Err(WmError::Ipc("broken pipe".into())));

        let err = reg.toggle(request("term")).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert_eq!(reg.launcher.launched().len(), 1);
        assert_eq!(reg.pid_of("term"), Some(4001));
    }

    #[test]
    fn invalid_definition_is_not_inserted() {
        let reg = registry();
        let mut req = request("bad");
        req.definition.position = 5;

        let err = reg.toggle(req).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(reg.is_empty());
        assert!(reg.launcher.launched().is_empty());
        assert!(reg.wm.commands().is_empty());
    }

    #[test]
    fn failed_first_toggle_is_not_inserted() {
        let reg = registry();
        reg.wm.push_result(Err(WmError::Ipc("gone".into())));
        assert!(reg.toggle(request("term")).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn known_id_ignores_new_definition() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();
        let mut other = request("term");
        other.definition.cmd = "alacritty".into();
        reg.toggle(other).unwrap();
        assert_eq!(reg.launcher.launched(), vec!["kitty"]);
    }

    #[test]
    fn distinct_ids_spawn_separately() {
        let reg = registry();
        reg.toggle(request("a")).unwrap();
        reg.toggle(request("b")).unwrap();
        assert_eq!(reg.pid_of("a"), Some(4001));
        assert_eq!(reg.pid_of("b"), Some(4002));
    }

    #[test]
    fn focused_scratchpad_is_placed() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();
        focus_pid(&reg, 4001);

        reg.on_window().unwrap();
        // 50×40 mm on 2000×1000 px / 200×100 mm, centered.
        assert_eq!(
            reg.wm.commands().last().unwrap(),
            "[pid=4001] resize set 500 400; [pid=4001] move absolute position 750 300"
        );
    }

    #[test]
    fn unrelated_window_is_left_alone() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();
        focus_pid(&reg, 77);

        reg.on_window().unwrap();
        assert_eq!(reg.wm.commands().len(), 1);
    }

    #[test]
    fn workspace_event_invalidates_outputs() {
        let reg = registry();
        reg.toggle(request("term")).unwrap();
        focus_pid(&reg, 4001);
        reg.on_window().unwrap();
        assert!(reg.lock().outputs.is_valid());

        reg.handle_event(WmEvent::Workspace).unwrap();
        assert!(!reg.lock().outputs.is_valid());
    }

    #[test]
    fn bindings_are_ignored() {
        let reg = registry();
        reg.handle_event(WmEvent::Binding {
            command: "nop reflex:toggle_current".into(),
        })
        .unwrap();
        assert!(reg.wm.commands().is_empty());
    }

    #[test]
    fn concurrent_toggles_spawn_once() {
        let reg = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || reg.toggle(request("term")).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(reg.launcher.launched().len(), 1);
        assert_eq!(reg.wm.commands().len(), 8);
    }
}
