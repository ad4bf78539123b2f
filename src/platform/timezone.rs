//! The remote config may carry a POSIX TZ string (`"GMT-3"`,
//! `"CET-1CEST,M3.5.0,M10.5.0/3"`). The latest one is kept for the whole
//! process; the environment is left alone, since other threads read it
//! through libc while the engine runs.

use std::sync::RwLock;

use tracing::info;

static ZONE: RwLock<Option<String>> = RwLock::new(None);

/// Records `tz` as the device time zone, replacing any earlier one.
pub fn apply_timezone(tz: &str) {
    let mut zone = ZONE.write().unwrap_or_else(|e| e.into_inner());
    *zone = Some(tz.to_string());
    info!(tz, "time zone applied");
}

/// The zone last applied from remote config, if any.
pub fn current_timezone() -> Option<String> {
    ZONE.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Forgets the applied zone.
pub fn clear_timezone() {
    *ZONE.write().unwrap_or_else(|e| e.into_inner()) = None;
}
