use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::{DeviceApp, EngineConfig};
use crate::dispatcher::{EventSignals, Period, Signals};
use crate::identity::{DeviceIdentity, Topics};
use crate::platform::Firmware;
use crate::session::Session;
use crate::sync::RemoteConfigFrame;
use crate::utils::error::EngineError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// State shared between the engine facade, the session task and the worker.
///
/// Only the worker mutates timers and the published snapshot. The session
/// task writes `online` and `pending_config`, and both hand work to the
/// worker through `signals`.
pub(crate) struct Shared {
    pub config: EngineConfig,
    pub session: Session,
    pub app: Arc<dyn DeviceApp>,
    pub firmware: Arc<dyn Firmware>,
    pub signals: Arc<EventSignals>,
    online: AtomicBool,
    pending_config: Mutex<Option<RemoteConfigFrame>>,
    state_period_ms: AtomicI64,
    pulse_period_ms: AtomicI64,
}

impl Shared {
    pub fn new(
        config: EngineConfig,
        session: Session,
        app: Arc<dyn DeviceApp>,
        firmware: Arc<dyn Firmware>,
    ) -> Self {
        let state_period_ms = AtomicI64::new(config.state_period.as_millis());
        let pulse_period_ms = AtomicI64::new(config.pulse_period.as_millis());
        Self {
            config,
            session,
            app,
            firmware,
            signals: Arc::new(EventSignals::new()),
            online: AtomicBool::new(false),
            pending_config: Mutex::new(None),
            state_period_ms,
            pulse_period_ms,
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
        self.signals.raise(Signals::LINK_CHANGED);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Replaces any frame the worker has not picked up yet.
    pub fn queue_config(&self, frame: RemoteConfigFrame) {
        if lock(&self.pending_config).replace(frame).is_some() {
            debug!("unapplied config frame superseded");
        }
        self.signals.raise(Signals::CONFIG_PENDING);
    }

    pub fn take_config(&self) -> Option<RemoteConfigFrame> {
        lock(&self.pending_config).take()
    }

    /// Mirrors the worker's periods for readers on other tasks.
    pub fn publish_periods(&self, state: Period, pulse: Period) {
        self.state_period_ms.store(state.as_millis(), Ordering::Release);
        self.pulse_period_ms.store(pulse.as_millis(), Ordering::Release);
    }

    fn period(cell: &AtomicI64) -> Period {
        Period::from_millis(cell.load(Ordering::Acquire)).unwrap_or(Period::Disabled)
    }
}

/// Cheap, cloneable access to a running engine, handed to every hook.
#[derive(Clone)]
pub struct EngineHandle {
    pub(crate) shared: Arc<Shared>,
}

impl EngineHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.shared.config.identity
    }

    pub fn topics(&self) -> &Topics {
        self.shared.session.topics()
    }

    pub fn is_online(&self) -> bool {
        self.shared.is_online()
    }

    /// Period the state timer currently runs at (or would, once online).
    pub fn state_period(&self) -> Period {
        Shared::period(&self.shared.state_period_ms)
    }

    pub fn pulse_period(&self) -> Period {
        Shared::period(&self.shared.pulse_period_ms)
    }

    /// Publishes `message` on the log telemetry topic.
    pub fn log(&self, message: &str) -> Result<(), EngineError> {
        self.shared.session.log(message).map_err(Into::into)
    }

    /// Publishes `message` on `/devices/{id}/events/{suffix}`.
    pub fn send_telemetry(&self, suffix: &str, message: &str) -> Result<(), EngineError> {
        self.shared
            .session
            .publish_telemetry(suffix, message)
            .map_err(Into::into)
    }

    /// Asks the worker to build and publish a state snapshot now instead of
    /// waiting for the next tick. Still a no-op if nothing changed.
    pub fn request_state(&self) {
        self.shared.signals.raise(Signals::STATE_DUE);
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("client_id", &self.topics().client_id)
            .field("online", &self.is_online())
            .finish()
    }
}
