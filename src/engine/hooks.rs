use serde_json::{Map, Value};

use super::EngineHandle;
use crate::credential::CredentialError;

/// Application side of the engine.
///
/// Hooks run on engine tasks: `on_connected`, `on_disconnected` and
/// `on_command` on the session task, `on_config` and `fill_state` on the
/// worker. They should return quickly; anything slow belongs on a task of
/// the application's own.
pub trait DeviceApp: Send + Sync + 'static {
    /// Mints the connection password, normally a JWT for `project_id`
    /// (see `credential::JwtSigner`). Called once per connection attempt.
    fn credential(&self, project_id: &str) -> Result<String, CredentialError>;

    fn on_connected(&self, _engine: &EngineHandle) {}

    fn on_disconnected(&self, _engine: &EngineHandle) {}

    /// The `app_config` part of a remote config frame.
    fn on_config(&self, _engine: &EngineHandle, _config: &Value) {}

    /// A delivery on any subscribed topic other than config.
    fn on_command(&self, _engine: &EngineHandle, _topic: &str, _payload: &[u8]) {}

    /// Adds application fields to the next state snapshot.
    fn fill_state(&self, _engine: &EngineHandle, _state: &mut Map<String, Value>) {}
}
