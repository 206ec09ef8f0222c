//! [`PhysicalSizeSource`] that asks the compositor over the Wayland
//! protocol.
//!
//! Each query opens a short-lived connection, binds every `wl_output`
//! global and waits for two roundtrips: the first delivers the registry
//! globals, the second flushes the per-output `geometry` and `name` events
//! queued by binding them.

use crate::command::PhysicalSize;
use crate::traits::PhysicalSizeSource;
use log::{debug, warn};
use wayland_client::protocol::{wl_output, wl_registry};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle};

/// `wl_output.name` was added in version 4.
const WL_OUTPUT_VERSION: u32 = 4;

/// Wayland-backed physical size source.
///
/// No connection is held between queries.
#[derive(Debug, Default)]
pub struct WaylandPhysicalSource;

impl WaylandPhysicalSource {
    pub fn new() -> Self {
        Self
    }
}

/// Errors that can occur while enumerating outputs.
#[derive(Debug, thiserror::Error)]
pub enum WaylandError {
    #[error("connect: {0}")]
    Connect(#[from] wayland_client::ConnectError),
    #[error("dispatch: {0}")]
    Dispatch(#[from] wayland_client::DispatchError),
}

/// Per-output state accumulated from events; indexed by the user data
/// attached to each bound `wl_output`.
#[derive(Debug, Default)]
struct OutputEntry {
    name: Option<String>,
    width_mm: i32,
    height_mm: i32,
}

#[derive(Debug, Default)]
struct Collector {
    entries: Vec<OutputEntry>,
    proxies: Vec<wl_output::WlOutput>,
}

impl Dispatch<wl_registry::WlRegistry, ()> for Collector {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            if interface != "wl_output" {
                return;
            }
            if version < WL_OUTPUT_VERSION {
                warn!("wl_output global {} has version {}, names unavailable", name, version);
            }
            let index = state.entries.len();
            state.entries.push(OutputEntry::default());
            let output = registry.bind::<wl_output::WlOutput, _, _>(
                name,
                version.min(WL_OUTPUT_VERSION),
                qh,
                index,
            );
            state.proxies.push(output);
        }
    }
}

impl Dispatch<wl_output::WlOutput, usize> for Collector {
    fn event(
        state: &mut Self,
        _: &wl_output::WlOutput,
        event: wl_output::Event,
        index: &usize,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let Some(entry) = state.entries.get_mut(*index) else {
            return;
        };
        match event {
            wl_output::Event::Geometry {
                physical_width,
                physical_height,
                ..
            } => {
                entry.width_mm = physical_width;
                entry.height_mm = physical_height;
            }
            wl_output::Event::Name { name } => entry.name = Some(name),
            _ => {}
        }
    }
}

impl PhysicalSizeSource for WaylandPhysicalSource {
    type Error = WaylandError;

    fn physical_sizes(&self) -> Result<Vec<PhysicalSize>, WaylandError> {
        let conn = Connection::connect_to_env()?;
        let mut queue = conn.new_event_queue();
        let qh = queue.handle();
        let _registry = conn.display().get_registry(&qh, ());

        let mut collector = Collector::default();
        queue.roundtrip(&mut collector)?;
        queue.roundtrip(&mut collector)?;

        for output in &collector.proxies {
            if output.version() >= 3 {
                output.release();
            }
        }

        let sizes: Vec<PhysicalSize> = collector
            .entries
            .into_iter()
            .filter_map(|e| {
                Some(PhysicalSize {
                    name: e.name?,
                    width_mm: e.width_mm,
                    height_mm: e.height_mm,
                })
            })
            .collect();
        debug!("wayland reported {} named output(s)", sizes.len());
        Ok(sizes)
    }
}
