//! The `persistence` module keeps small application values across restarts.
//!
//! Values live in a single `sled` tree and are stored as JSON, so any serde
//! type can be kept under a string name. Every write is flushed before it
//! returns.

pub mod device_store;

pub use device_store::{DeviceStore, StoreError};
