//! Scratchpad definitions and the toggle message.
//!
//! # Wire format
//!
//! One JSON value per connection:
//!
//! ```json
//! {"ID":"kitty_0_200x100","Definition":{"Position":0,"Cmd":"kitty","WindowWidth":200,"WindowHeight":100}}
//! ```
//!
//! `Position` is `0` (center), `1` (left) or `2` (right).  Sizes are in
//! millimeters.

use crate::error::{Error, Result};
use crate::geometry::{PhysicalPreference, Position};
use serde::{Deserialize, Serialize};

/// A scratchpad definition exactly as it travels over the socket.
///
/// Nothing is validated here; see [`Definition::try_from`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireDefinition {
    pub position: i64,
    pub cmd: String,
    pub window_width: i32,
    pub window_height: i32,
}

impl WireDefinition {
    pub fn new(position: Position, cmd: impl Into<String>, preference: PhysicalPreference) -> Self {
        Self {
            position: position.as_number(),
            cmd: cmd.into(),
            window_width: preference.width_mm,
            window_height: preference.height_mm,
        }
    }
}

/// Request to show, hide or spawn the scratchpad called `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRequest {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Definition")]
    pub definition: WireDefinition,
}

impl ToggleRequest {
    /// Build a request whose id is derived from the definition:
    /// `<cmd>_<position>_<width>x<height>`.
    pub fn with_default_id(definition: WireDefinition) -> Self {
        let id = format!(
            "{}_{}_{}x{}",
            definition.cmd, definition.position, definition.window_width, definition.window_height
        );
        Self { id, definition }
    }
}

/// A validated scratchpad definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub position: Position,
    pub command: String,
    pub preference: PhysicalPreference,
}

impl TryFrom<&WireDefinition> for Definition {
    type Error = Error;

    fn try_from(wire: &WireDefinition) -> Result<Self> {
        if wire.cmd.trim().is_empty() {
            return Err(Error::Validation("scratchpad command: empty".into()));
        }
        let position = Position::from_number(wire.position).ok_or_else(|| {
            Error::Validation(format!("scratchpad position: {}", wire.position))
        })?;
        if wire.window_width < 1 || wire.window_height < 1 {
            return Err(Error::Validation(format!(
                "scratchpad size: {}x{}",
                wire.window_width, wire.window_height
            )));
        }

        Ok(Self {
            position,
            command: wire.cmd.clone(),
            preference: PhysicalPreference {
                width_mm: wire.window_width,
                height_mm: wire.window_height,
            },
        })
    }
}
