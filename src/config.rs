//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/sway-reflex/config.json`
//! and may be overridden by command-line flags.  Every section is optional;
//! a minimal `{}` file is valid and all values fall back to their
//! compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "reflex": {
//!     "window_size": "500x300",
//!     "default_gaps": 0,
//!     "disabled_workspaces": [9],
//!     "disabled_app_ids": ["pavucontrol"]
//!   },
//!   "scratch": { "position": "center", "window_size": "200x100" },
//!   "physical_source": "wayland",
//!   "outputs": { "DP-1": { "width_mm": 600, "height_mm": 340 } }
//! }
//! ```

use crate::geometry::{PhysicalPreference, Position};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Autogap / autotile settings.
    #[serde(default)]
    pub reflex: ReflexConfig,

    /// Defaults for `sway-scratch call`.
    #[serde(default)]
    pub scratch: ScratchConfig,

    /// Where monitor physical sizes come from.
    #[serde(default)]
    pub physical_source: PhysicalSourceKind,

    /// Physical sizes used by [`PhysicalSourceKind::Fixed`].
    #[serde(default)]
    pub outputs: BTreeMap<String, PhysicalDimensions>,
}

/// Autogap / autotile settings as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexConfig {
    /// Preferred window size, `<width>x<height>` in millimeters.
    pub window_size: String,
    /// Minimum outer gaps in pixels.
    pub default_gaps: i32,
    /// Workspace numbers autogap leaves alone.
    pub disabled_workspaces: Vec<i32>,
    /// App ids whose windows are ignored.
    pub disabled_app_ids: Vec<String>,
}

impl Default for ReflexConfig {
    fn default() -> Self {
        Self {
            window_size: "500x300".into(),
            default_gaps: 0,
            disabled_workspaces: Vec::new(),
            disabled_app_ids: Vec::new(),
        }
    }
}

/// Defaults for scratchpad calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// `center`, `left` or `right`.
    pub position: String,
    /// Preferred window size, `<width>x<height>` in millimeters.
    pub window_size: String,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            position: "center".into(),
            window_size: "200x100".into(),
        }
    }
}

/// Strategy used to learn monitor physical sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicalSourceKind {
    /// Ask the compositor over the Wayland protocol.
    #[default]
    Wayland,
    /// Use the `outputs` table from the configuration.
    Fixed,
}

impl std::str::FromStr for PhysicalSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "wayland" => Ok(PhysicalSourceKind::Wayland),
            "fixed" => Ok(PhysicalSourceKind::Fixed),
            _ => Err(ConfigError(format!("unknown physical source: {:?}", s))),
        }
    }
}

/// Physical size of one monitor in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalDimensions {
    pub width_mm: i32,
    pub height_mm: i32,
}

/// Validated autogap / autotile settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflexSettings {
    pub preference: PhysicalPreference,
    pub default_gap_horizontal: i32,
    pub default_gap_vertical: i32,
    pub disabled_workspaces: HashSet<i32>,
    pub disabled_app_ids: HashSet<String>,
}

impl ReflexConfig {
    /// Validate and resolve into [`ReflexSettings`].
    pub fn validate(&self) -> Result<ReflexSettings, ConfigError> {
        let preference = parse_window_size(&self.window_size)?;
        if self.default_gaps < 0 {
            return Err(ConfigError(format!(
                "invalid default gaps {} - should be a non-negative integer",
                self.default_gaps
            )));
        }

        Ok(ReflexSettings {
            preference,
            default_gap_horizontal: self.default_gaps,
            default_gap_vertical: self.default_gaps,
            disabled_workspaces: self.disabled_workspaces.iter().copied().collect(),
            disabled_app_ids: self.disabled_app_ids.iter().cloned().collect(),
        })
    }
}

impl ScratchConfig {
    /// Validate and resolve into a position and preferred size.
    pub fn validate(&self) -> Result<(Position, PhysicalPreference), ConfigError> {
        let position = Position::parse(&self.position)
            .ok_or_else(|| ConfigError(format!("invalid position: {:?}", self.position)))?;
        Ok((position, parse_window_size(&self.window_size)?))
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load `explicit` if given, otherwise the default location.
    ///
    /// A missing default file is not an error: compiled-in defaults are used
    /// instead.  An explicitly requested file must exist and parse.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let cfg = Self::load(path)?;
            info!("loaded config from {}", path.display());
            return Ok(cfg);
        }

        let path = default_config_path();
        if !path.exists() {
            info!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let cfg = Self::load(&path)?;
        info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physical_source == PhysicalSourceKind::Fixed && self.outputs.is_empty() {
            return Err(ConfigError(
                "physical source \"fixed\" needs at least one entry in \"outputs\"".into(),
            ));
        }
        for (name, dims) in &self.outputs {
            if dims.width_mm < 1 || dims.height_mm < 1 {
                return Err(ConfigError(format!(
                    "invalid physical size for {}: {}x{}",
                    name, dims.width_mm, dims.height_mm
                )));
            }
        }
        Ok(())
    }
}

/// Parse `<width>x<height>` (case-insensitive `x`), both at least `1`.
pub fn parse_window_size(input: &str) -> Result<PhysicalPreference, ConfigError> {
    let lower = input.to_lowercase();
    let Some((w, h)) = lower.split_once('x') else {
        return Err(ConfigError(format!(
            "invalid window size format: {:?}, should be <width>x<height>",
            input
        )));
    };

    let width_mm: i32 = w
        .trim()
        .parse()
        .map_err(|_| ConfigError(format!("invalid width parameter: {:?} - not a number", w)))?;
    let height_mm: i32 = h
        .trim()
        .parse()
        .map_err(|_| ConfigError(format!("invalid height parameter: {:?} - not a number", h)))?;

    if width_mm < 1 || height_mm < 1 {
        return Err(ConfigError(format!(
            "invalid window size {:?} - width and height should be positive integers",
            input
        )));
    }

    Ok(PhysicalPreference {
        width_mm,
        height_mm,
    })
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/sway-reflex`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("sway-reflex")
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// `<XDG_RUNTIME_DIR or /tmp>/<name>.<extension>`, used for sockets and
/// pidfiles.
pub fn runtime_file(name: &str, extension: &str) -> PathBuf {
    let dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(dir).join(format!("{}.{}", name, extension))
}

/// Error from loading, parsing or validating configuration.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        crate::error::Error::Validation(e.0)
    }
}
