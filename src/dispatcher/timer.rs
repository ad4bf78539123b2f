//! Periodic timers
//!
//! A timer is either Stopped or Armed. While Armed a background task raises
//! the timer's signal bit once per period, the first time one full period
//! after arming. Re-arming replaces the task; pending bits in the signal set
//! are left untouched.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use super::{EventSignals, Signals};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("{0} timer is stopped; arm it before changing its period")]
    NotArmed(&'static str),

    #[error("{0} timer cannot run with a zero period")]
    ZeroPeriod(&'static str),
}

/// A named timer that raises one signal bit per period while armed.
#[derive(Debug)]
pub struct PeriodicTimer {
    name: &'static str,
    signal: Signals,
    signals: Arc<EventSignals>,
    armed: Option<(Duration, JoinHandle<()>)>,
}

impl PeriodicTimer {
    pub fn new(name: &'static str, signal: Signals, signals: Arc<EventSignals>) -> Self {
        Self {
            name,
            signal,
            signals,
            armed: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Current period, `None` while stopped.
    pub fn period(&self) -> Option<Duration> {
        self.armed.as_ref().map(|(period, _)| *period)
    }

    /// Starts the timer, restarting it if it was already armed.
    pub fn arm(&mut self, period: Duration) -> Result<(), TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod(self.name));
        }
        self.stop();

        let signals = Arc::clone(&self.signals);
        let signal = self.signal;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                signals.raise(signal);
            }
        });

        debug!(timer = self.name, period_ms = period.as_millis() as u64, "timer armed");
        self.armed = Some((period, task));
        Ok(())
    }

    /// Re-arms an armed timer with a new period. A stopped timer is rejected.
    pub fn change_period(&mut self, period: Duration) -> Result<(), TimerError> {
        if !self.is_armed() {
            return Err(TimerError::NotArmed(self.name));
        }
        self.arm(period)
    }

    pub fn stop(&mut self) {
        if let Some((_, task)) = self.armed.take() {
            task.abort();
            debug!(timer = self.name, "timer stopped");
        }
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
