use std::sync::Arc;
use std::time::Duration;

use super::{EventSignals, Period, PeriodicTimer, Signals, TimerError};

/// A periodic timer together with the period it should run at.
///
/// The stored period survives disconnects: `pause` stops the timer but keeps
/// the period, `resume` re-arms with whatever is stored (or stays stopped
/// when the period is `Disabled`).
#[derive(Debug)]
pub struct ScheduledTimer {
    timer: PeriodicTimer,
    period: Period,
}

impl ScheduledTimer {
    pub fn new(
        name: &'static str,
        signal: Signals,
        signals: Arc<EventSignals>,
        period: Period,
    ) -> Self {
        Self {
            timer: PeriodicTimer::new(name, signal, signals),
            period,
        }
    }

    pub fn name(&self) -> &'static str {
        self.timer.name()
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        match self.period {
            Period::Every(d) => self.timer.arm(d),
            Period::Disabled => {
                self.timer.stop();
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) {
        self.timer.stop();
    }

    /// Arms a stopped timer with a new period and stores it.
    pub fn arm(&mut self, period: Duration) -> Result<(), TimerError> {
        self.timer.arm(period)?;
        self.period = Period::Every(period);
        Ok(())
    }

    /// Re-arms an armed timer. The stored period only changes on success.
    pub fn change_period(&mut self, period: Duration) -> Result<(), TimerError> {
        self.timer.change_period(period)?;
        self.period = Period::Every(period);
        Ok(())
    }

    pub fn disable(&mut self) {
        self.timer.stop();
        self.period = Period::Disabled;
    }

    /// Stores a period without touching the timer; picked up by `resume`.
    pub fn store(&mut self, period: Period) {
        self.period = period;
    }
}
