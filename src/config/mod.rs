//! Settings for the device binary.
//!
//! Sources, later ones winning:
//! 1. `Settings::default()`
//! 2. `config/default.{toml,yaml,json}` (optional)
//! 3. `CLOUDSYNC_<SECTION>__<KEY>` environment variables,
//!    e.g. `CLOUDSYNC_DEVICE__PROJECT_ID`

mod settings;

use config::{Config, Environment, File};

pub use settings::{
    BrokerSettings, DeviceSettings, EngineSettings, LogSettings, PartialSettings, Settings,
    SettingsError, StorageSettings,
};

/// Prefix of environment variables read as settings.
pub const ENV_PREFIX: &str = "CLOUDSYNC";

/// Loads settings from `config/default` and the environment.
pub fn load_config() -> Result<Settings, SettingsError> {
    load_config_from("config/default")
}

/// Like `load_config` with a different base file name (extension optional).
pub fn load_config_from(file: &str) -> Result<Settings, SettingsError> {
    let builder = Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(Settings::merge(partial))
}

#[cfg(test)]
mod tests;
