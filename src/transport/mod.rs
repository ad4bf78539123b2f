//! The `transport` module defines the publish/subscribe collaborator the
//! engine drives, and ships two implementations of it.
//!
//! The engine never speaks a wire protocol itself. It asks a `Transport` to
//! connect, subscribe and publish, and receives connection and message
//! notifications on an unbounded channel. Notifications are delivered on
//! the transport's own execution context, independent of the engine worker.
//!
//! - `websocket`: a WebSocket pub/sub bridge speaking JSON frames.
//! - `memory`: an in-process transport that records traffic, for tests and
//!   simulations.

pub mod memory;
pub mod message;
pub mod websocket;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

pub use memory::{MemoryTransport, Published};
pub use websocket::WsTransport;

/// Delivery guarantee requested for a subscribe or publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
}

impl QoS {
    /// Wire value carried in bridge frames.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a wire value; anything above 1 is not supported by the bridge.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            _ => None,
        }
    }
}

/// Everything a transport needs to open an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub broker_uri: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

/// Notifications a transport sends to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Message { topic: String, payload: Vec<u8> },
}

/// Sending side of the notification channel handed to `Transport::connect`.
pub type TransportEvents = UnboundedSender<TransportEvent>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("publish to {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },

    #[error("connection failed: {0}")]
    Connect(String),
}

/// The raw pub/sub connection. Calls are synchronous: `publish` succeeds
/// once the transport has accepted the message for delivery, not when the
/// cloud acknowledges it.
pub trait Transport: Send + Sync {
    fn connect(&self, options: ConnectOptions, events: TransportEvents) -> Result<(), TransportError>;

    fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), TransportError>;

    fn publish(&self, topic: &str, payload: &[u8], qos: QoS, retain: bool) -> Result<(), TransportError>;

    fn disconnect(&self);
}
