//! In-process transport
//!
//! `MemoryTransport` accepts connections without any network, records every
//! subscribe and publish, and lets the caller inject connection and message
//! notifications as if they came from a broker. Publishes are accepted only
//! between an injected `Connected` and the next `Disconnected`.

use std::sync::Mutex;

use tracing::warn;

use super::{ConnectOptions, QoS, Transport, TransportError, TransportEvent, TransportEvents};

/// One publish accepted by `MemoryTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

impl Published {
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or("")
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    events: Option<TransportEvents>,
    connects: Vec<ConnectOptions>,
    subscriptions: Vec<(String, QoS)>,
    published: Vec<Published>,
    online: bool,
    reject_publish: bool,
    disconnected: bool,
}

/// Network-free transport whose broker side is driven by the caller.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<MemoryState>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // a panicking test thread must not hide the recorded traffic
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Delivers a notification to whoever connected. Returns false when no
    /// connection is open or the receiving side has gone away.
    pub fn emit(&self, event: TransportEvent) -> bool {
        let mut state = self.lock();
        match event {
            TransportEvent::Connected => state.online = true,
            TransportEvent::Disconnected => state.online = false,
            TransportEvent::Message { .. } => {}
        }
        match &state.events {
            Some(events) => events.send(event).is_ok(),
            None => false,
        }
    }

    /// Simulates the broker accepting the connection.
    pub fn bring_up(&self) -> bool {
        self.emit(TransportEvent::Connected)
    }

    /// Simulates the link dropping. The listener stays attached.
    pub fn bring_down(&self) -> bool {
        self.emit(TransportEvent::Disconnected)
    }

    pub fn deliver(&self, topic: &str, payload: impl Into<Vec<u8>>) -> bool {
        self.emit(TransportEvent::Message {
            topic: topic.to_string(),
            payload: payload.into(),
        })
    }

    /// While set, every publish fails with `Rejected`, online or not.
    pub fn set_reject_publish(&self, reject: bool) {
        self.lock().reject_publish = reject;
    }

    pub fn connect_attempts(&self) -> Vec<ConnectOptions> {
        self.lock().connects.clone()
    }

    pub fn subscriptions(&self) -> Vec<(String, QoS)> {
        self.lock().subscriptions.clone()
    }

    pub fn published(&self) -> Vec<Published> {
        self.lock().published.clone()
    }

    pub fn published_on(&self, topic: &str) -> Vec<Published> {
        self.lock()
            .published
            .iter()
            .filter(|p| p.topic == topic)
            .cloned()
            .collect()
    }

    pub fn clear_published(&self) {
        self.lock().published.clear();
    }

    /// True after `disconnect` and until the next `connect`.
    pub fn is_disconnected(&self) -> bool {
        self.lock().disconnected
    }
}

impl Transport for MemoryTransport {
    fn connect(&self, options: ConnectOptions, events: TransportEvents) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.connects.push(options);
        state.events = Some(events);
        state.disconnected = false;
        Ok(())
    }

    fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), TransportError> {
        let mut state = self.lock();
        if !state.online {
            return Err(TransportError::NotConnected);
        }
        state.subscriptions.push((topic.to_string(), qos));
        Ok(())
    }

    fn publish(&self, topic: &str, payload: &[u8], qos: QoS, retain: bool) -> Result<(), TransportError> {
        let mut state = self.lock();
        if state.reject_publish {
            return Err(TransportError::Rejected {
                topic: topic.to_string(),
                reason: "rejected by memory transport".to_string(),
            });
        }
        if !state.online {
            warn!(topic, "publish while offline");
            return Err(TransportError::NotConnected);
        }
        state.published.push(Published {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
            retain,
        });
        Ok(())
    }

    fn disconnect(&self) {
        let mut state = self.lock();
        state.online = false;
        state.events = None;
        state.disconnected = true;
    }
}
