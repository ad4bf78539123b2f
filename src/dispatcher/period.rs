use std::time::Duration;

use thiserror::Error;

/// Wire value meaning "timer disabled" in config frames and state snapshots.
pub const DISABLED_PERIOD_MS: i64 = -1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period {0} ms is not a valid duration")]
    Invalid(i64),

    #[error("period {requested_ms} ms is below the minimum of {minimum_ms} ms")]
    BelowMinimum { requested_ms: u64, minimum_ms: u64 },
}

/// How often a periodic timer fires, or whether it fires at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Every(Duration),
    Disabled,
}

impl Period {
    pub fn from_millis(ms: i64) -> Result<Self, PeriodError> {
        match ms {
            DISABLED_PERIOD_MS => Ok(Period::Disabled),
            ms if ms > 0 => Ok(Period::Every(Duration::from_millis(ms as u64))),
            ms => Err(PeriodError::Invalid(ms)),
        }
    }

    pub fn as_millis(&self) -> i64 {
        match self {
            Period::Every(d) => d.as_millis() as i64,
            Period::Disabled => DISABLED_PERIOD_MS,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Period::Every(d) => Some(*d),
            Period::Disabled => None,
        }
    }

    /// Rejects enabled periods shorter than `minimum`. `Disabled` always passes.
    pub fn at_least(self, minimum: Duration) -> Result<Self, PeriodError> {
        match self {
            Period::Every(d) if d < minimum => Err(PeriodError::BelowMinimum {
                requested_ms: d.as_millis() as u64,
                minimum_ms: minimum.as_millis() as u64,
            }),
            other => Ok(other),
        }
    }
}

impl From<Duration> for Period {
    fn from(d: Duration) -> Self {
        Period::Every(d)
    }
}
