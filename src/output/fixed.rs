//! Physical sizes taken from configuration.
//!
//! Useful for monitors with broken EDID data and for running without a
//! Wayland connection.

use crate::command::PhysicalSize;
use crate::config::PhysicalDimensions;
use crate::traits::PhysicalSizeSource;
use std::collections::BTreeMap;
use std::convert::Infallible;

/// A [`PhysicalSizeSource`] backed by a static `name → size` map.
#[derive(Debug, Clone, Default)]
pub struct FixedPhysicalSource {
    sizes: BTreeMap<String, PhysicalDimensions>,
}

impl FixedPhysicalSource {
    pub fn new(sizes: BTreeMap<String, PhysicalDimensions>) -> Self {
        Self { sizes }
    }
}

impl PhysicalSizeSource for FixedPhysicalSource {
    type Error = Infallible;

    fn physical_sizes(&self) -> Result<Vec<PhysicalSize>, Infallible> {
        Ok(self
            .sizes
            .iter()
            .map(|(name, dims)| PhysicalSize {
                name: name.clone(),
                width_mm: dims.width_mm,
                height_mm: dims.height_mm,
            })
            .collect())
    }
}
