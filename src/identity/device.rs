use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the length of each identity field, in bytes.
pub const MAX_IDENTITY_FIELD_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("device identity field `{0}` is empty")]
    Empty(&'static str),

    #[error("device identity field `{field}` is {len} bytes, limit is {MAX_IDENTITY_FIELD_LEN}")]
    TooLong { field: &'static str, len: usize },
}

/// The registry/region/project/device tuple naming a device in the cloud
/// control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub registry: String,
    pub region: String,
    pub project_id: String,
    pub device_id: String,
}

impl DeviceIdentity {
    pub fn new(
        registry: impl Into<String>,
        region: impl Into<String>,
        project_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            registry: registry.into(),
            region: region.into(),
            project_id: project_id.into(),
            device_id: device_id.into(),
        }
    }

    /// Checks that all four fields are non-empty and bounded.
    pub fn validate(&self) -> Result<(), IdentityError> {
        let fields = [
            ("registry", &self.registry),
            ("region", &self.region),
            ("project_id", &self.project_id),
            ("device_id", &self.device_id),
        ];
        for (field, value) in fields {
            if value.is_empty() {
                return Err(IdentityError::Empty(field));
            }
            if value.len() > MAX_IDENTITY_FIELD_LEN {
                return Err(IdentityError::TooLong {
                    field,
                    len: value.len(),
                });
            }
        }
        Ok(())
    }
}
