//! The single task that owns timers, periods and the published snapshot.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::EngineHandle;
use super::handle::Shared;
use crate::dispatcher::{ScheduledTimer, Signals};
use crate::sync::{ConfigSynchronizer, DeviceState, StatePublisher};

pub(crate) struct Worker {
    handle: EngineHandle,
    state: ScheduledTimer,
    pulse: ScheduledTimer,
    config_sync: ConfigSynchronizer,
    publisher: StatePublisher,
}

impl Worker {
    pub fn new(handle: EngineHandle) -> Self {
        let shared = &handle.shared;
        let state = ScheduledTimer::new(
            "state",
            Signals::STATE_DUE,
            Arc::clone(&shared.signals),
            shared.config.state_period,
        );
        let pulse = ScheduledTimer::new(
            "pulse",
            Signals::HEARTBEAT_DUE,
            Arc::clone(&shared.signals),
            shared.config.pulse_period,
        );
        let config_sync = ConfigSynchronizer::new(
            shared.config.min_state_period,
            shared.config.ota_root_cert.clone(),
            Arc::clone(&shared.firmware),
        );
        Self {
            handle,
            state,
            pulse,
            config_sync,
            publisher: StatePublisher::new(),
        }
    }

    fn shared(&self) -> &Shared {
        &self.handle.shared
    }

    pub async fn run(mut self) {
        info!("worker started");
        loop {
            let signals = self.shared().signals.wait().await;
            if signals.contains(Signals::SHUTDOWN) {
                break;
            }
            self.process(signals);
        }
        self.state.pause();
        self.pulse.pause();
        info!("worker stopped");
    }

    /// Handles one drained batch. Each kind runs at most once per batch.
    pub fn process(&mut self, mut signals: Signals) {
        let online = self.shared().is_online();

        if signals.contains(Signals::LINK_CHANGED) {
            self.apply_link(online);
            if !online {
                signals.remove(Signals::STATE_DUE | Signals::HEARTBEAT_DUE);
            }
        }
        if signals.contains(Signals::CONFIG_PENDING) {
            self.apply_config(online);
        }
        if signals.contains(Signals::STATE_DUE) {
            self.publish_state(online);
        }
        if signals.contains(Signals::HEARTBEAT_DUE) {
            self.send_pulse(online);
        }
    }

    fn apply_link(&mut self, online: bool) {
        if online {
            for slot in [&mut self.state, &mut self.pulse] {
                if let Err(e) = slot.resume() {
                    error!(timer = slot.name(), "could not arm timer: {e}");
                }
            }
            debug!("timers armed");
        } else {
            self.state.pause();
            self.pulse.pause();
            debug!("timers stopped");
        }
    }

    fn apply_config(&mut self, online: bool) {
        let Some(frame) = self.shared().take_config() else {
            return;
        };
        let outcome = self
            .config_sync
            .apply(&frame, &mut self.state, &mut self.pulse, online);
        debug!(?outcome, "config applied");
        self.shared()
            .publish_periods(self.state.period(), self.pulse.period());

        if let Some(app_config) = &frame.app_config {
            self.shared().app.on_config(&self.handle, app_config);
        }
    }

    fn publish_state(&mut self, online: bool) {
        if !online {
            debug!("offline, state update skipped");
            return;
        }
        let shared = &self.handle.shared;
        let device = DeviceState {
            firmware: shared.firmware.current_version(),
            state_period: self.state.period(),
            pulse_period: self.pulse.period(),
            reset_reason: shared.firmware.reset_reason(),
        };
        let snapshot = device.snapshot(|app_state| shared.app.fill_state(&self.handle, app_state));
        if let Err(e) = self
            .publisher
            .publish_if_changed(snapshot, |text| shared.session.publish_state(text))
        {
            error!("state publish failed: {e}");
        }
    }

    fn send_pulse(&self, online: bool) {
        if !online {
            debug!("offline, heartbeat skipped");
            return;
        }
        match self.shared().session.send_pulse() {
            Ok(()) => debug!("heartbeat sent"),
            Err(e) => warn!("heartbeat failed: {e}"),
        }
    }
}
