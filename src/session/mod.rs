//! Session lifecycle
//!
//! A session is one connect-to-disconnect interval of the authenticated link.
//! `Session` owns the transport and the resolved topics; `events` runs the
//! task that reacts to transport notifications.
//!
//! Flow:
//! 1. `start` mints a fresh credential and asks the transport to connect
//! 2. `Connected`: subscribe config and commands, go online, arm timers
//! 3. Config deliveries are parsed and queued for the worker
//! 4. `Disconnected`: go offline, stop timers; a later `start` opens a new
//!    session with a new credential

pub mod events;
pub mod lifecycle;

pub use lifecycle::{CONNECT_USERNAME, HEARTBEAT_PAYLOAD, Session};

#[cfg(test)]
mod tests;
