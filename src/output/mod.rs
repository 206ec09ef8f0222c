//! Monitor metadata: a lazily refreshed cache of [`Output`]s plus the two
//! strategies for learning each monitor's physical size.
//!
//! The window manager knows pixel geometry but not millimeters; the display
//! server knows millimeters.  [`OutputRegistry`] joins the two by output
//! name and caches the result until [`invalidate`](OutputRegistry::invalidate)
//! is called.

pub mod fixed;
pub mod wayland;

use crate::command::PhysicalSize;
use crate::config::{Config, PhysicalSourceKind};
use crate::error::{Error, Result};
use crate::geometry::Output;
use crate::traits::{PhysicalSizeSource, WindowManager};
use fixed::FixedPhysicalSource;
use log::{debug, warn};
use std::collections::HashMap;
use wayland::{WaylandError, WaylandPhysicalSource};

/// The physical-size strategy picked at startup.
#[derive(Debug)]
pub enum PhysicalSource {
    Wayland(WaylandPhysicalSource),
    Fixed(FixedPhysicalSource),
}

impl PhysicalSource {
    /// Build the strategy selected by `config`.
    pub fn from_config(config: &Config) -> Self {
        match config.physical_source {
            PhysicalSourceKind::Wayland => PhysicalSource::Wayland(WaylandPhysicalSource::new()),
            PhysicalSourceKind::Fixed => {
                PhysicalSource::Fixed(FixedPhysicalSource::new(config.outputs.clone()))
            }
        }
    }
}

impl PhysicalSizeSource for PhysicalSource {
    type Error = WaylandError;

    fn physical_sizes(&self) -> std::result::Result<Vec<PhysicalSize>, WaylandError> {
        match self {
            PhysicalSource::Wayland(source) => source.physical_sizes(),
            PhysicalSource::Fixed(source) => match source.physical_sizes() {
                Ok(sizes) => Ok(sizes),
                Err(never) => match never {},
            },
        }
    }
}

/// Cache of per-monitor pixel and physical geometry.
///
/// The cache is either fully valid or fully stale.  Refreshing happens only
/// on demand, in [`get`](OutputRegistry::get).
///
/// Not synchronized: a registry has exactly one owner, and callers that share
/// it between threads must wrap it in their own lock.
pub struct OutputRegistry<P: PhysicalSizeSource> {
    physical: P,
    lookup: HashMap<String, Output>,
    valid: bool,
}

impl<P: PhysicalSizeSource> OutputRegistry<P> {
    /// Create an empty, stale registry backed by `physical`.
    pub fn new(physical: P) -> Self {
        Self {
            physical,
            lookup: HashMap::new(),
            valid: false,
        }
    }

    /// Look up the output called `name`, refreshing first if the cache is
    /// stale.
    ///
    /// A miss on a valid cache is reported as [`Error::NotFound`] without
    /// refreshing.  A failed refresh is returned as is and leaves the cache
    /// stale, so the next call tries again.
    pub fn get<W: WindowManager + ?Sized>(&mut self, wm: &W, name: &str) -> Result<Output> {
        if !self.valid {
            self.refresh(wm)?;
        }

        self.lookup
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("output {:?}", name)))
    }

    /// Mark the cache stale.  The next [`get`](OutputRegistry::get) pays for
    /// the refresh.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Whether the next lookup will be served from the cache.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    fn refresh<W: WindowManager + ?Sized>(&mut self, wm: &W) -> Result<()> {
        let physical = self
            .physical
            .physical_sizes()
            .map_err(|e| Error::Display(e.to_string()))?;
        let outputs = wm.outputs()?;

        let physical: HashMap<&str, (i32, i32)> = physical
            .iter()
            .map(|p| (p.name.as_str(), (p.width_mm, p.height_mm)))
            .collect();

        let mut lookup = HashMap::with_capacity(outputs.len());
        for out in outputs.into_iter().filter(|o| o.active) {
            let Some(&(physical_width, physical_height)) = physical.get(out.name.as_str()) else {
                warn!("no physical size for output {}, skipping", out.name);
                continue;
            };
            lookup.insert(
                out.name.clone(),
                Output {
                    name: out.name,
                    width: out.rect.width,
                    height: out.rect.height,
                    physical_width,
                    physical_height,
                    x: out.rect.x,
                    y: out.rect.y,
                },
            );
        }

        debug!("output cache refreshed with {} output(s)", lookup.len());
        self.lookup = lookup;
        self.valid = true;
        Ok(())
    }
}
