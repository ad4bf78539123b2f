//! Log output for the device binary.
//!
//! One compact `tracing-subscriber` fmt layer, filtered by a single level
//! taken from settings. Module targets stay on so session, worker and
//! transport lines can be told apart.

use tracing::Level;

/// Maps a settings string to a level. Unknown names fall back to `INFO`.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Installs the global subscriber. Returns false if one was already set,
/// which is normal in tests and when embedded in a larger application.
pub fn init(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(true)
        .compact()
        .try_init()
        .is_ok()
}
