use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::{DeviceApp, EngineConfig};
use crate::identity::Topics;
use crate::transport::{ConnectOptions, QoS, Transport, TransportError, TransportEvents};
use crate::utils::error::EngineError;

/// The bridge authenticates by password only; the username is ignored.
pub const CONNECT_USERNAME: &str = "unused";
/// Fixed body of every heartbeat publish.
pub const HEARTBEAT_PAYLOAD: &str = "pulse";

/// The device's link to the cloud: one transport plus the topics derived
/// from the device identity.
pub struct Session {
    transport: Arc<dyn Transport>,
    topics: Topics,
    project_id: String,
    broker_uri: String,
    log_topic: String,
    pulse_topic: String,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>, config: &EngineConfig) -> Self {
        Self {
            transport,
            topics: Topics::resolve(&config.identity),
            project_id: config.identity.project_id.clone(),
            broker_uri: config.broker_uri.clone(),
            log_topic: config.log_topic().to_string(),
            pulse_topic: config.pulse_topic().to_string(),
        }
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Opens a connection. Returns once the transport has the request; the
    /// outcome arrives later as a `Connected` or `Disconnected` event.
    pub fn start(&self, app: &dyn DeviceApp, events: TransportEvents) -> Result<(), EngineError> {
        let token = app.credential(&self.project_id)?;
        let options = ConnectOptions {
            broker_uri: self.broker_uri.clone(),
            client_id: self.topics.client_id.clone(),
            username: CONNECT_USERNAME.to_string(),
            password: token,
        };
        info!(client_id = %options.client_id, uri = %options.broker_uri, "connecting");
        self.transport.connect(options, events)?;
        Ok(())
    }

    /// Subscribes to the config and command topics at least once.
    pub fn subscribe_all(&self) -> Result<(), TransportError> {
        self.transport.subscribe(&self.topics.config, QoS::AtLeastOnce)?;
        self.transport
            .subscribe(&self.topics.commands, QoS::AtLeastOnce)?;
        debug!(config = %self.topics.config, commands = %self.topics.commands, "subscribed");
        Ok(())
    }

    /// Publishes a serialized snapshot on the state topic, retained.
    pub fn publish_state(&self, text: &str) -> Result<(), TransportError> {
        self.transport
            .publish(&self.topics.state, text.as_bytes(), QoS::AtLeastOnce, true)
    }

    /// Publishes on `/devices/{id}/events/{suffix}`, retained.
    pub fn publish_telemetry(&self, suffix: &str, text: &str) -> Result<(), TransportError> {
        let topic = self.topics.telemetry(suffix);
        self.transport
            .publish(&topic, text.as_bytes(), QoS::AtLeastOnce, true)
    }

    pub fn send_pulse(&self) -> Result<(), TransportError> {
        self.publish_telemetry(&self.pulse_topic, HEARTBEAT_PAYLOAD)
    }

    pub fn log(&self, message: &str) -> Result<(), TransportError> {
        self.publish_telemetry(&self.log_topic, message)
    }

    /// Drops the connection; no further notifications arrive.
    pub fn close(&self) {
        self.transport.disconnect();
        info!(client_id = %self.topics.client_id, "session closed");
    }
}
