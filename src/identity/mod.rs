//! Device identity and the topic names derived from it.
//!
//! Every topic the engine touches, and the client id used when connecting,
//! is a pure function of the four identity fields. They are resolved once
//! per engine and cached for its lifetime.

pub mod device;
pub mod topics;

pub use device::{DeviceIdentity, IdentityError, MAX_IDENTITY_FIELD_LEN};
pub use topics::Topics;

#[cfg(test)]
mod tests;
