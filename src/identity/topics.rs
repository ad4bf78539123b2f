//! Topic resolution
//!
//! Formats are fixed by the cloud bridge:
//! - config: `/devices/{device_id}/config`
//! - commands: `/devices/{device_id}/commands/#`
//! - state: `/devices/{device_id}/state`
//! - telemetry: `/devices/{device_id}/events/{suffix}`
//! - client id: `projects/{project}/locations/{region}/registries/{registry}/devices/{device_id}`

use super::DeviceIdentity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub config: String,
    pub commands: String,
    pub state: String,
    pub telemetry_root: String,
    pub client_id: String,
}

impl Topics {
    pub fn resolve(identity: &DeviceIdentity) -> Self {
        let device_id = &identity.device_id;
        Self {
            config: format!("/devices/{device_id}/config"),
            commands: format!("/devices/{device_id}/commands/#"),
            state: format!("/devices/{device_id}/state"),
            telemetry_root: format!("/devices/{device_id}/events"),
            client_id: format!(
                "projects/{}/locations/{}/registries/{}/devices/{}",
                identity.project_id, identity.region, identity.registry, device_id
            ),
        }
    }

    /// Full telemetry topic for an event sub-folder such as `pulse` or `logs`.
    pub fn telemetry(&self, suffix: &str) -> String {
        format!("{}/{}", self.telemetry_root, suffix)
    }

    pub fn is_config(&self, topic: &str) -> bool {
        topic == self.config
    }
}
