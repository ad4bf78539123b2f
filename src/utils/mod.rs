//! The `utils` module provides definitions shared across the `cloudsync`
//! crate: the error taxonomy and logging initialization.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::error::EngineError;
    use super::logging;
    use crate::credential::JwtSigner;
    use crate::transport::TransportError;

    #[test]
    fn logging_levels_parse() {
        assert_eq!(logging::parse_level("debug"), Level::DEBUG);
        assert_eq!(logging::parse_level(" WARNING "), Level::WARN);
        assert_eq!(logging::parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn logging_init_is_repeatable() {
        // Should not panic; at most the first call installs a subscriber
        logging::init("info");
        assert!(!logging::init("debug"));
    }

    #[test]
    fn only_credential_errors_are_fatal() {
        let err: EngineError = JwtSigner::from_pem(b"nope").unwrap_err().into();
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("credential: "));

        let err: EngineError = TransportError::NotConnected.into();
        assert!(!err.is_fatal());
        assert!(!EngineError::AlreadyStarted.is_fatal());
    }
}
