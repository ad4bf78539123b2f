//! Engine facade
//!
//! Ties the pieces together:
//! - `Engine` owns the session and spawns two tasks on `start`: the session
//!   task draining transport events and the worker draining signals
//! - `EngineHandle` is what hooks and application code publish through
//! - `DeviceApp` is the application's side: credential minting plus hooks
//! - `EngineConfig` carries identity, periods and topic overrides

pub mod config;
mod handle;
pub mod hooks;
mod runtime;
mod worker;

pub use config::{
    DEFAULT_BROKER_URI, DEFAULT_LOG_TOPIC, DEFAULT_MIN_STATE_PERIOD, DEFAULT_PULSE_PERIOD,
    DEFAULT_PULSE_TOPIC, DEFAULT_STATE_PERIOD, EngineConfig,
};
pub use handle::EngineHandle;
pub use hooks::DeviceApp;
pub use runtime::Engine;
