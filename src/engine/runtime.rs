use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::handle::Shared;
use super::worker::Worker;
use super::{DeviceApp, EngineConfig, EngineHandle};
use crate::dispatcher::Signals;
use crate::platform::Firmware;
use crate::session::{Session, events};
use crate::transport::Transport;
use crate::utils::error::EngineError;

/// A device-cloud synchronization engine.
///
/// Created stopped. `start` opens the first session and spawns the worker;
/// `destroy` shuts everything down and consumes the engine.
pub struct Engine {
    handle: EngineHandle,
    runtime: Handle,
    worker: Option<JoinHandle<()>>,
    session_task: Option<JoinHandle<()>>,
}

impl Engine {
    /// Must be called from within a tokio runtime, which the engine's tasks
    /// are spawned on.
    pub fn new(
        config: EngineConfig,
        transport: Arc<dyn Transport>,
        app: Arc<dyn DeviceApp>,
        firmware: Arc<dyn Firmware>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let session = Session::new(transport, &config);
        let shared = Arc::new(Shared::new(config, session, app, firmware));
        info!(client_id = %shared.session.topics().client_id, "engine created");

        Ok(Self {
            handle: EngineHandle::new(shared),
            runtime,
            worker: None,
            session_task: None,
        })
    }

    /// A cloneable handle for publishing and reading engine state.
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// True once `start` has succeeded; stays true until `destroy`.
    pub fn is_started(&self) -> bool {
        self.worker.is_some()
    }

    /// True while a session task is consuming transport notifications.
    /// Turns false when the transport ends its session for good, after which
    /// `start` may be called again.
    pub fn session_active(&self) -> bool {
        self.session_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Mints a credential and connects. A credential failure is fatal and
    /// leaves the engine as it was.
    ///
    /// Callable again once the previous session has ended: a new credential
    /// is minted, a new session task is spawned and the running worker is
    /// kept, so stored periods and the last published state carry over.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.session_active() {
            return Err(EngineError::AlreadyStarted);
        }
        let shared = &self.handle.shared;

        let (tx, rx) = mpsc::unbounded_channel();
        shared.session.start(shared.app.as_ref(), tx)?;

        self.session_task = Some(self.runtime.spawn(events::run(self.handle.clone(), rx)));
        if self.worker.is_none() {
            self.worker = Some(self.runtime.spawn(Worker::new(self.handle.clone()).run()));
        } else {
            info!("session restarted");
        }
        Ok(())
    }

    /// Publishes `message` on the log telemetry topic.
    pub fn log(&self, message: &str) -> Result<(), EngineError> {
        self.handle.log(message)
    }

    /// Publishes `message` on `/devices/{id}/events/{suffix}`.
    pub fn send_telemetry(&self, suffix: &str, message: &str) -> Result<(), EngineError> {
        self.handle.send_telemetry(suffix, message)
    }

    /// Stops the worker, waits for it to finish, then closes the session.
    pub async fn destroy(mut self) {
        let shared = Arc::clone(&self.handle.shared);
        shared.signals.raise(Signals::SHUTDOWN);

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!("worker ended abnormally: {e}");
            }
        }
        if let Some(task) = self.session_task.take() {
            task.abort();
            let _ = task.await;
            shared.session.close();
        }
        info!(client_id = %shared.session.topics().client_id, "engine destroyed");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.worker.take().is_some() {
            self.handle.shared.signals.raise(Signals::SHUTDOWN);
        }
        if let Some(task) = self.session_task.take() {
            task.abort();
            self.handle.shared.session.close();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("handle", &self.handle)
            .field("started", &self.is_started())
            .finish()
    }
}
