use std::sync::Mutex;

use tracing::info;

/// Access to the running image and the over-the-air update path.
pub trait Firmware: Send + Sync {
    fn current_version(&self) -> String;

    /// Starts an update from `url`. Fire-and-forget: a successful update
    /// restarts the device, which ends the session on its own.
    fn apply_update(&self, url: &str, root_cert: Option<&str>);

    /// Platform reset-reason code reported in the device state.
    fn reset_reason(&self) -> i32 {
        0
    }
}

/// Firmware collaborator for hosts that cannot flash themselves: reports a
/// fixed version and records update requests instead of acting on them.
#[derive(Debug)]
pub struct StaticFirmware {
    version: String,
    reset_reason: i32,
    requested: Mutex<Vec<String>>,
}

impl StaticFirmware {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            reset_reason: 0,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reset_reason(mut self, reason: i32) -> Self {
        self.reset_reason = reason;
        self
    }

    /// Urls passed to `apply_update`, oldest first.
    pub fn requested_updates(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Firmware for StaticFirmware {
    fn current_version(&self) -> String {
        self.version.clone()
    }

    fn apply_update(&self, url: &str, _root_cert: Option<&str>) {
        info!(current = %self.version, %url, "firmware update requested");
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }
    }

    fn reset_reason(&self) -> i32 {
        self.reset_reason
    }
}
