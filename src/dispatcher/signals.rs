//! Coalescing signal set
//!
//! An atomic bitset paired with a `Notify`. Raising a bit that is already
//! pending is a no-op beyond the wakeup, so the set never grows and never
//! allocates. `wait` takes and clears all pending bits in one atomic swap.

use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use tokio::sync::Notify;

bitflags! {
    /// Kinds of work pending for the worker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Signals: u8 {
        const STATE_DUE = 1 << 0;
        const HEARTBEAT_DUE = 1 << 1;
        const SHUTDOWN = 1 << 2;
        const CONFIG_PENDING = 1 << 3;
        const LINK_CHANGED = 1 << 4;
    }
}

#[derive(Debug, Default)]
pub struct EventSignals {
    bits: AtomicU8,
    notify: Notify,
}

impl EventSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, signals: Signals) {
        self.bits.fetch_or(signals.bits(), Ordering::AcqRel);
        // notify_one stores a permit when nobody is waiting, so a raise that
        // lands between the worker's take and its await is not lost
        self.notify.notify_one();
    }

    /// Takes and clears every pending bit without blocking.
    pub fn take(&self) -> Signals {
        Signals::from_bits_truncate(self.bits.swap(0, Ordering::AcqRel))
    }

    /// Bits currently pending, left in place.
    pub fn pending(&self) -> Signals {
        Signals::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Blocks until at least one bit is pending, then takes them all.
    pub async fn wait(&self) -> Signals {
        loop {
            let taken = self.take();
            if !taken.is_empty() {
                return taken;
            }
            self.notify.notified().await;
        }
    }
}
