//! Adapters between sway's IPC and the crate's own vocabulary.
//!
//! [`SwayWm`] answers queries and runs commands on one connection;
//! [`SwayEventSource`] owns a second connection that is turned into an
//! event subscription.

pub mod events;
pub mod wm;

pub use events::SwayEventSource;
pub use wm::SwayWm;
