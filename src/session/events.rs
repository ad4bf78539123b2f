use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use crate::engine::EngineHandle;
use crate::sync::RemoteConfigFrame;
use crate::transport::TransportEvent;

/// Consumes transport notifications until the transport drops its sender.
pub(crate) async fn run(handle: EngineHandle, mut events: UnboundedReceiver<TransportEvent>) {
    while let Some(event) = events.recv().await {
        handle_event(&handle, event);
    }
    debug!("transport event stream ended");
}

pub(crate) fn handle_event(handle: &EngineHandle, event: TransportEvent) {
    let shared = &handle.shared;
    match event {
        TransportEvent::Connected => {
            info!(client_id = %shared.session.topics().client_id, "connected");
            if let Err(e) = shared.session.subscribe_all() {
                error!("subscribe failed: {e}");
            }
            shared.set_online(true);
            shared.app.on_connected(handle);
        }
        TransportEvent::Disconnected => {
            warn!("disconnected");
            shared.set_online(false);
            shared.app.on_disconnected(handle);
        }
        TransportEvent::Message { topic, payload } => {
            if shared.session.topics().is_config(&topic) {
                match RemoteConfigFrame::parse(&payload) {
                    Ok(frame) => {
                        debug!(bytes = payload.len(), "config received");
                        shared.queue_config(frame);
                    }
                    Err(e) => error!("dropping malformed config: {e}"),
                }
            } else {
                debug!(%topic, bytes = payload.len(), "command received");
                shared.app.on_command(handle, &topic, &payload);
            }
        }
    }
}
