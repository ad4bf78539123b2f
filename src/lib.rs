//! # cloudsync
//!
//! `cloudsync` keeps a device synchronized with a cloud IoT control plane
//! over a publish/subscribe link. It authenticates with a per-connection
//! JWT, publishes device state when it changes and a periodic heartbeat,
//! applies remote configuration (timer periods, time zone, firmware
//! version) and forwards commands to application code.
//!
//! ## Core Modules
//!
//! - `engine`: the `Engine` facade, its worker task and the `DeviceApp` hooks.
//! - `session`: connect, subscribe and publish over a `Transport`.
//! - `sync`: remote config application and change-only state publishing.
//! - `dispatcher`: periodic timers feeding a coalescing signal set.
//! - `credential`: RS256 device tokens.
//! - `identity`: device identity and the topic names derived from it.
//! - `transport`: the transport trait, a WebSocket bridge client and an in-memory transport.
//! - `platform`: firmware version/update and time zone.
//! - `persistence`: small key/value store for application data.
//! - `config`: settings for the binary.
//! - `utils`: error types and logging.

pub mod config;
pub mod credential;
pub mod dispatcher;
pub mod engine;
pub mod identity;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod sync;
pub mod transport;
pub mod utils;

pub use engine::{DeviceApp, Engine, EngineConfig, EngineHandle};
pub use utils::error::EngineError;
