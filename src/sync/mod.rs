//! Config and state synchronization
//!
//! Both halves run on the engine worker only:
//! - `config` parses remote config frames at ingress and applies them to the
//!   periodic timers, time zone and firmware once the worker drains
//!   `CONFIG_PENDING`
//! - `state` builds the device snapshot and publishes it when it differs from
//!   the one last sent

pub mod config;
pub mod state;

pub use config::{
    ConfigOutcome, ConfigSynchronizer, FirmwareDirective, PeriodChange, PeriodRejection,
    RemoteConfigFrame,
};
pub use state::{DeviceState, Publish, StatePublisher};

#[cfg(test)]
mod tests;
