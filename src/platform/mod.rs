//! Device platform collaborators: the firmware applier and process-wide
//! time-zone state.
//!
//! How an image is downloaded, verified and flashed is the implementor's
//! business. The engine only decides whether to ask for it.

pub mod firmware;
pub mod timezone;

pub use firmware::{Firmware, StaticFirmware};
pub use timezone::{apply_timezone, clear_timezone, current_timezone};

#[cfg(test)]
mod tests;
