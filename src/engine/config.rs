use std::time::Duration;

use crate::dispatcher::{Period, PeriodError};
use crate::identity::DeviceIdentity;
use crate::utils::error::EngineError;

/// Google Cloud IoT Core MQTT bridge.
pub const DEFAULT_BROKER_URI: &str = "mqtts://mqtt.googleapis.com:8883";
pub const DEFAULT_STATE_PERIOD: Duration = Duration::from_millis(2000);
pub const DEFAULT_PULSE_PERIOD: Duration = Duration::from_secs(5 * 60);
/// Shortest state period accepted at construction or from remote config.
pub const DEFAULT_MIN_STATE_PERIOD: Duration = Duration::from_millis(2000);
pub const DEFAULT_LOG_TOPIC: &str = "logs";
pub const DEFAULT_PULSE_TOPIC: &str = "pulse";

/// Everything the engine needs besides its collaborators. Moved into the
/// engine at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub identity: DeviceIdentity,
    pub state_period: Period,
    pub pulse_period: Period,
    pub min_state_period: Duration,
    pub topic_path_log: Option<String>,
    pub topic_path_pulse: Option<String>,
    pub broker_uri: String,
    pub ota_root_cert: Option<String>,
}

impl EngineConfig {
    /// Defaults for everything but the identity.
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            state_period: Period::Every(DEFAULT_STATE_PERIOD),
            pulse_period: Period::Every(DEFAULT_PULSE_PERIOD),
            min_state_period: DEFAULT_MIN_STATE_PERIOD,
            topic_path_log: None,
            topic_path_pulse: None,
            broker_uri: DEFAULT_BROKER_URI.to_string(),
            ota_root_cert: None,
        }
    }

    pub fn with_state_period(mut self, period: Period) -> Self {
        self.state_period = period;
        self
    }

    pub fn with_pulse_period(mut self, period: Period) -> Self {
        self.pulse_period = period;
        self
    }

    pub fn with_min_state_period(mut self, minimum: Duration) -> Self {
        self.min_state_period = minimum;
        self
    }

    pub fn with_broker_uri(mut self, uri: impl Into<String>) -> Self {
        self.broker_uri = uri.into();
        self
    }

    /// Telemetry sub-folder for `log` messages.
    pub fn log_topic(&self) -> &str {
        self.topic_path_log.as_deref().unwrap_or(DEFAULT_LOG_TOPIC)
    }

    /// Telemetry sub-folder for heartbeats.
    pub fn pulse_topic(&self) -> &str {
        self.topic_path_pulse.as_deref().unwrap_or(DEFAULT_PULSE_TOPIC)
    }

    /// Checks the identity, the state period against the minimum and that
    /// an enabled pulse period is non-zero.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.identity.validate()?;
        self.state_period.at_least(self.min_state_period)?;
        if let Period::Every(d) = self.pulse_period {
            if d.is_zero() {
                return Err(PeriodError::Invalid(0).into());
            }
        }
        Ok(())
    }
}
