use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::dispatcher::{Period, PeriodError, ScheduledTimer, TimerError};
use crate::platform::{Firmware, apply_timezone};

/// Target firmware from a config frame. Both fields must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareDirective {
    pub version: String,
    pub url: String,
}

/// A config delivery from the cloud, reduced to the fields the engine acts on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteConfigFrame {
    pub state_period_ms: Option<i64>,
    pub pulse_period_ms: Option<i64>,
    pub timezone: Option<String>,
    pub firmware: Option<FirmwareDirective>,
    pub app_config: Option<Value>,
}

impl RemoteConfigFrame {
    /// Parses a config payload. An empty payload means no config has been
    /// set for the device yet and yields an empty frame. Fields with the
    /// wrong type are skipped with a warning; only unparsable text or a
    /// non-object document is an error.
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let root = match serde_json::from_slice::<Value>(payload)? {
            Value::Object(map) => map,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "config must be a JSON object, got {other}"
                )));
            }
        };

        let mut frame = Self {
            app_config: root.get("app_config").cloned(),
            ..Self::default()
        };

        if let Some(device) = root.get("device_config").and_then(Value::as_object) {
            frame.state_period_ms = integer_field(device, "state_period_ms");
            frame.pulse_period_ms = integer_field(device, "pulse_period_ms");
            frame.timezone = device
                .get("tz")
                .or_else(|| device.get("timezone"))
                .and_then(Value::as_str)
                .map(str::to_string);
            frame.firmware = device.get("firmware").and_then(|fw| {
                let version = fw.get("version").and_then(Value::as_str)?;
                let url = fw.get("url").and_then(Value::as_str)?;
                Some(FirmwareDirective {
                    version: version.to_string(),
                    url: url.to_string(),
                })
            });
        }

        Ok(frame)
    }
}

fn integer_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = map.get(key)?;
    match value.as_i64() {
        Some(v) => Some(v),
        None => {
            warn!(field = key, %value, "ignoring non-integer period");
            None
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodRejection {
    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error(transparent)]
    Timer(#[from] TimerError),
}

/// What a config frame did to one timer.
#[derive(Debug, PartialEq, Eq)]
pub enum PeriodChange {
    Absent,
    Unchanged,
    Applied(Period),
    Rejected(PeriodRejection),
}

/// Summary of one applied frame, for logging and tests.
#[derive(Debug, PartialEq, Eq)]
pub struct ConfigOutcome {
    pub state: PeriodChange,
    pub pulse: PeriodChange,
    pub timezone_applied: bool,
    pub update_requested: bool,
}

/// Applies device-level config directives. Owned by the worker.
pub struct ConfigSynchronizer {
    min_state_period: Duration,
    ota_root_cert: Option<String>,
    firmware: Arc<dyn Firmware>,
}

impl ConfigSynchronizer {
    pub fn new(
        min_state_period: Duration,
        ota_root_cert: Option<String>,
        firmware: Arc<dyn Firmware>,
    ) -> Self {
        Self {
            min_state_period,
            ota_root_cert,
            firmware,
        }
    }

    /// Applies the device part of `frame`. The application part is left to
    /// the caller, which owns the hook and the handle passed to it.
    pub fn apply(
        &self,
        frame: &RemoteConfigFrame,
        state: &mut ScheduledTimer,
        pulse: &mut ScheduledTimer,
        online: bool,
    ) -> ConfigOutcome {
        let timezone_applied = match frame.timezone.as_deref() {
            Some(tz) => {
                apply_timezone(tz);
                true
            }
            None => false,
        };

        let state_change = match frame.state_period_ms {
            Some(ms) => apply_period(state, ms, self.min_state_period, online),
            None => PeriodChange::Absent,
        };
        let pulse_change = match frame.pulse_period_ms {
            Some(ms) => apply_period(pulse, ms, Duration::ZERO, online),
            None => PeriodChange::Absent,
        };

        let update_requested = match &frame.firmware {
            Some(directive) => self.check_firmware(directive),
            None => false,
        };

        ConfigOutcome {
            state: state_change,
            pulse: pulse_change,
            timezone_applied,
            update_requested,
        }
    }

    fn check_firmware(&self, directive: &FirmwareDirective) -> bool {
        let current = self.firmware.current_version();
        if directive.version == current {
            return false;
        }
        info!(
            current = %current,
            target = %directive.version,
            url = %directive.url,
            "firmware version differs, requesting update"
        );
        self.firmware
            .apply_update(&directive.url, self.ota_root_cert.as_deref());
        true
    }
}

/// One timer's share of a config frame.
///
/// - same value as stored: nothing happens
/// - `-1`: timer stopped, Disabled stored
/// - invalid or below `minimum`: rejected, stored value kept
/// - armed timer: re-armed with the new period
/// - stopped timer while online: armed
/// - offline: stored for the next connect
pub fn apply_period(
    slot: &mut ScheduledTimer,
    requested_ms: i64,
    minimum: Duration,
    online: bool,
) -> PeriodChange {
    let requested = match Period::from_millis(requested_ms).and_then(|p| p.at_least(minimum)) {
        Ok(p) => p,
        Err(e) => {
            error!(timer = slot.name(), "rejecting period from config: {e}");
            return PeriodChange::Rejected(e.into());
        }
    };

    if requested == slot.period() {
        return PeriodChange::Unchanged;
    }

    let result = match requested {
        Period::Disabled => {
            slot.disable();
            Ok(())
        }
        Period::Every(d) if slot.is_armed() => slot.change_period(d),
        Period::Every(d) if online => slot.arm(d),
        Period::Every(_) => {
            slot.store(requested);
            Ok(())
        }
    };

    match result {
        Ok(()) => {
            info!(
                timer = slot.name(),
                period_ms = requested.as_millis(),
                "period updated from config"
            );
            PeriodChange::Applied(requested)
        }
        Err(e) => {
            error!(timer = slot.name(), "timer refused new period: {e}");
            PeriodChange::Rejected(e.into())
        }
    }
}
