//! **sway-reflex**: physically-proportioned autogaps, autotiling and
//! scratchpads for sway.
//!
//! Window sizes are expressed in millimeters.  Every decision converts them
//! to pixels using the monitor's physical size, so a preferred window looks
//! the same on a 13" laptop panel and on a 32" desktop monitor.
//!
//! # Architecture
//!
//! The crate is organised around a handful of traits in [`traits`]:
//!
//! * [`traits::WindowManager`] abstracts tree/workspace/output queries and
//!   command execution, so the controllers are not coupled to sway.
//! * [`traits::EventSource`] abstracts the event subscription that drives
//!   the daemons.
//! * [`traits::PhysicalSizeSource`] abstracts where monitor millimeters come
//!   from (Wayland or configuration).
//! * [`traits::Launcher`] abstracts starting scratchpad programs.
//!
//! The logic lives in [`geometry`] (pure arithmetic), [`tree`] (pure tree
//! analysis), [`autotile`] (the autogap/autotile controller) and
//! [`scratch`] (the scratchpad registry).  Concrete backends live in
//! [`sway`], [`output`] and [`ipc`].

pub mod autotile;
pub mod command;
pub mod config;
pub mod daemon;
pub mod error;
pub mod geometry;
pub mod ipc;
pub mod output;
pub mod pidfile;
pub mod scratch;
pub mod sway;
pub mod traits;
pub mod tree;

pub use error::{Error, Result};
