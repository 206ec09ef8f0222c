//! [`EventSource`] implementation backed by a sway event subscription.

use crate::command::{WindowChange, WmEvent};
use crate::traits::{EventSource, WmError};
use log::{debug, info, warn};
use std::sync::mpsc;
use swayipc as s;

/// Subscribes to window, workspace and binding events.
pub struct SwayEventSource {
    conn: Option<s::Connection>,
}

impl SwayEventSource {
    /// Open a dedicated connection for the subscription.
    pub fn connect() -> Result<Self, WmError> {
        let conn = s::Connection::new().map_err(|e| WmError::Ipc(e.to_string()))?;
        Ok(Self { conn: Some(conn) })
    }
}

impl EventSource for SwayEventSource {
    type Error = WmError;

    /// Blocks for as long as sway keeps the subscription open.  Can only
    /// run once; the connection is consumed by the subscription.
    fn run(&mut self, sink: mpsc::Sender<WmEvent>) -> Result<(), WmError> {
        let conn = self
            .conn
            .take()
            .ok_or_else(|| WmError::Ipc("event source already ran".into()))?;
        let events = conn
            .subscribe([
                s::EventType::Window,
                s::EventType::Workspace,
                s::EventType::Binding,
            ])
            .map_err(|e| WmError::Ipc(e.to_string()))?;
        info!("subscribed to sway events");

        for event in events {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!("event stream error: {}", e);
                    return Err(WmError::Ipc(e.to_string()));
                }
            };
            let Some(event) = convert_event(event) else {
                continue;
            };
            debug!("event {:?}", event);
            if sink.send(event).is_err() {
                info!("sink closed, shutting down");
                break;
            }
        }
        Ok(())
    }
}

fn convert_event(event: s::Event) -> Option<WmEvent> {
    match event {
        s::Event::Window(ev) => Some(WmEvent::Window {
            change: convert_change(ev.change),
            container: Box::new(super::wm::convert_node(&ev.container)),
        }),
        s::Event::Workspace(_) => Some(WmEvent::Workspace),
        s::Event::Binding(ev) => Some(WmEvent::Binding {
            command: ev.binding.command.clone(),
        }),
        _ => None,
    }
}

fn convert_change(change: s::WindowChange) -> WindowChange {
    match change {
        s::WindowChange::New => WindowChange::New,
        s::WindowChange::Close => WindowChange::Close,
        s::WindowChange::Focus => WindowChange::Focus,
        s::WindowChange::Move => WindowChange::Move,
        s::WindowChange::Floating => WindowChange::Floating,
        _ => WindowChange::Other,
    }
}
