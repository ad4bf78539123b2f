use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::dispatcher::{Period, PeriodError};
use crate::engine::{DEFAULT_BROKER_URI, EngineConfig};
use crate::identity::DeviceIdentity;

/// Why settings could not be turned into an engine configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration could not be loaded: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid period in [engine]: {0}")]
    Period(#[from] PeriodError),

    #[error("OTA root certificate could not be read from {path}: {source}")]
    RootCert {
        path: String,
        source: std::io::Error,
    },
}

/// Top-level configuration for the device binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub device: DeviceSettings,
    pub engine: EngineSettings,
    pub broker: BrokerSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

/// Cloud identity of the device.
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceSettings {
    pub registry: String,
    pub region: String,
    pub project_id: String,
    pub device_id: String,
}

/// Timer periods and telemetry sub-folders. Periods use `-1` for disabled.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    pub state_period_ms: i64,
    pub pulse_period_ms: i64,
    pub min_state_period_ms: u64,
    pub topic_log: Option<String>,
    pub topic_pulse: Option<String>,
}

/// Where to connect and which key material to use.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub uri: String,
    pub private_key_path: PathBuf,
    pub ota_root_cert_path: Option<PathBuf>,
}

/// Location of the device data store.
///
/// The directory is created on first use.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: PathBuf,
}

/// Log verbosity: `error`, `warn`, `info`, `debug` or `trace`.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration loaded from files or environment; missing values
/// fall back to `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub device: Option<PartialDeviceSettings>,
    pub engine: Option<PartialEngineSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub storage: Option<PartialStorageSettings>,
    pub log: Option<PartialLogSettings>,
}

/// Partial device identity.
#[derive(Debug, Deserialize, Default)]
pub struct PartialDeviceSettings {
    pub registry: Option<String>,
    pub region: Option<String>,
    pub project_id: Option<String>,
    pub device_id: Option<String>,
}

/// Partial engine settings.
#[derive(Debug, Deserialize, Default)]
pub struct PartialEngineSettings {
    pub state_period_ms: Option<i64>,
    pub pulse_period_ms: Option<i64>,
    pub min_state_period_ms: Option<u64>,
    pub topic_log: Option<String>,
    pub topic_pulse: Option<String>,
}

/// Partial broker settings.
#[derive(Debug, Deserialize, Default)]
pub struct PartialBrokerSettings {
    pub uri: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub ota_root_cert_path: Option<PathBuf>,
}

/// Partial storage settings.
#[derive(Debug, Deserialize, Default)]
pub struct PartialStorageSettings {
    pub path: Option<PathBuf>,
}

/// Partial log settings.
#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// The identity is left empty, so it must come from a file or the
/// environment before `Engine::new` accepts it.
impl Default for Settings {
    fn default() -> Self {
        Self {
            device: DeviceSettings {
                registry: String::new(),
                region: String::new(),
                project_id: String::new(),
                device_id: String::new(),
            },
            engine: EngineSettings {
                state_period_ms: 2000,
                pulse_period_ms: 5 * 60 * 1000,
                min_state_period_ms: 2000,
                topic_log: None,
                topic_pulse: None,
            },
            broker: BrokerSettings {
                uri: DEFAULT_BROKER_URI.to_string(),
                private_key_path: PathBuf::from("certs/rsa_private.pem"),
                ota_root_cert_path: None,
            },
            storage: StorageSettings {
                path: PathBuf::from("device_data"),
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Fills every field `partial` leaves out from the defaults.
    pub fn merge(partial: PartialSettings) -> Self {
        let default = Settings::default();
        let device = partial.device.unwrap_or_default();
        let engine = partial.engine.unwrap_or_default();
        let broker = partial.broker.unwrap_or_default();
        let storage = partial.storage.unwrap_or_default();
        let log = partial.log.unwrap_or_default();

        Settings {
            device: DeviceSettings {
                registry: device.registry.unwrap_or(default.device.registry),
                region: device.region.unwrap_or(default.device.region),
                project_id: device.project_id.unwrap_or(default.device.project_id),
                device_id: device.device_id.unwrap_or(default.device.device_id),
            },
            engine: EngineSettings {
                state_period_ms: engine
                    .state_period_ms
                    .unwrap_or(default.engine.state_period_ms),
                pulse_period_ms: engine
                    .pulse_period_ms
                    .unwrap_or(default.engine.pulse_period_ms),
                min_state_period_ms: engine
                    .min_state_period_ms
                    .unwrap_or(default.engine.min_state_period_ms),
                topic_log: engine.topic_log.or(default.engine.topic_log),
                topic_pulse: engine.topic_pulse.or(default.engine.topic_pulse),
            },
            broker: BrokerSettings {
                uri: broker.uri.unwrap_or(default.broker.uri),
                private_key_path: broker
                    .private_key_path
                    .unwrap_or(default.broker.private_key_path),
                ota_root_cert_path: broker
                    .ota_root_cert_path
                    .or(default.broker.ota_root_cert_path),
            },
            storage: StorageSettings {
                path: storage.path.unwrap_or(default.storage.path),
            },
            log: LogSettings {
                level: log.level.unwrap_or(default.log.level),
            },
        }
    }

    /// The configured device identity, unvalidated.
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(
            &self.device.registry,
            &self.device.region,
            &self.device.project_id,
            &self.device.device_id,
        )
    }

    /// Builds the engine configuration, reading the OTA root certificate if
    /// one is configured. Identity and period limits are checked later by
    /// `Engine::new`.
    pub fn engine_config(&self) -> Result<EngineConfig, SettingsError> {
        let mut config = EngineConfig::new(self.identity())
            .with_state_period(Period::from_millis(self.engine.state_period_ms)?)
            .with_pulse_period(Period::from_millis(self.engine.pulse_period_ms)?)
            .with_min_state_period(Duration::from_millis(self.engine.min_state_period_ms))
            .with_broker_uri(&self.broker.uri);
        config.topic_path_log = self.engine.topic_log.clone();
        config.topic_path_pulse = self.engine.topic_pulse.clone();

        if let Some(path) = &self.broker.ota_root_cert_path {
            let pem = std::fs::read_to_string(path).map_err(|source| SettingsError::RootCert {
                path: path.display().to_string(),
                source,
            })?;
            config.ota_root_cert = Some(pem);
        }
        Ok(config)
    }
}
