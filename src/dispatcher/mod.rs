//! Timer/event dispatcher
//!
//! Two periodic timers (state update and heartbeat) raise bits in a shared
//! coalescing signal set. A single worker waits on the set, takes every
//! pending bit at once and handles each kind at most once per pass, so a
//! burst of firings while the worker is busy collapses into one pass instead
//! of queueing up behind a slow publisher.
//!
//! The worker itself lives in `engine::worker`; this module only provides
//! the signal set, the timers and the period type they are configured with.

pub mod period;
pub mod schedule;
pub mod signals;
pub mod timer;

pub use period::{DISABLED_PERIOD_MS, Period, PeriodError};
pub use schedule::ScheduledTimer;
pub use signals::{EventSignals, Signals};
pub use timer::{PeriodicTimer, TimerError};
