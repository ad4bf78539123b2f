use serde_json::{Map, Value, json};
use tracing::{info, trace};

use crate::dispatcher::Period;
use crate::transport::TransportError;
use crate::utils::error::EngineError;

/// Engine-owned half of the state snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub firmware: String,
    pub state_period: Period,
    pub pulse_period: Period,
    pub reset_reason: i32,
}

impl DeviceState {
    /// Builds `{"device_state": {..}, "app_state": {..}}`, letting `fill_app`
    /// add the application's fields.
    pub fn snapshot(&self, fill_app: impl FnOnce(&mut Map<String, Value>)) -> Value {
        let mut app_state = Map::new();
        fill_app(&mut app_state);
        json!({
            "device_state": {
                "firmware": self.firmware,
                "state_period_ms": self.state_period.as_millis(),
                "pulse_period_ms": self.pulse_period.as_millis(),
                "reset_reason": self.reset_reason,
            },
            "app_state": app_state,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Sent,
    Unchanged,
}

/// Publishes state snapshots, skipping any that equal the last one sent.
#[derive(Debug, Default)]
pub struct StatePublisher {
    last: Option<Value>,
}

impl StatePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Value> {
        self.last.as_ref()
    }

    /// A changed snapshot is kept as the new baseline even when `publish`
    /// fails; the error is returned and not retried.
    pub fn publish_if_changed(
        &mut self,
        snapshot: Value,
        publish: impl FnOnce(&str) -> Result<(), TransportError>,
    ) -> Result<Publish, EngineError> {
        if self.last.as_ref() == Some(&snapshot) {
            trace!("state unchanged, not publishing");
            return Ok(Publish::Unchanged);
        }

        let text = serde_json::to_string_pretty(&snapshot)?;
        info!("sending new state");
        let result = publish(&text);
        self.last = Some(snapshot);
        result?;
        Ok(Publish::Sent)
    }
}
