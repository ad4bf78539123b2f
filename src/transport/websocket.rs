//! WebSocket transport
//!
//! Connects to a pub/sub bridge over WebSocket and speaks the JSON frames in
//! `message.rs`. Responsibilities:
//! - Open the socket and authenticate with the client id and device token
//! - Report `Connected` once the bridge confirms authentication, and
//!   `Disconnected` whenever the socket closes
//! - Forward subscribe/publish requests as frames through a per-connection
//!   outbound channel, so `Transport` calls never block on network I/O
//! - Acknowledge at-least-once deliveries and forward them as `Message` events
//!
//! There is no reconnect loop here. A new session is opened only when the
//! engine calls `connect` again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use super::message::{ClientMessage, ServerMessage};
use super::{ConnectOptions, QoS, Transport, TransportError, TransportEvent, TransportEvents};

#[derive(Debug, Default)]
struct Shared {
    outbound: Mutex<Option<UnboundedSender<WsMessage>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    online: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Shared {
    fn enqueue(&self, frame: &ClientMessage) -> Result<(), TransportError> {
        let text = serde_json::to_string(frame).map_err(|e| TransportError::Rejected {
            topic: String::new(),
            reason: e.to_string(),
        })?;
        match lock(&self.outbound).as_ref() {
            Some(tx) => tx
                .send(WsMessage::text(text))
                .map_err(|_| TransportError::NotConnected),
            None => Err(TransportError::NotConnected),
        }
    }
}

/// Transport over a WebSocket pub/sub bridge. Clones share one connection.
#[derive(Debug, Default, Clone)]
pub struct WsTransport {
    shared: Arc<Shared>,
}

impl WsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between the bridge's `authenticated` frame and socket close.
    pub fn is_online(&self) -> bool {
        self.shared.online.load(Ordering::Acquire)
    }
}

impl Transport for WsTransport {
    fn connect(&self, options: ConnectOptions, events: TransportEvents) -> Result<(), TransportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        self.disconnect();

        let (tx, rx) = mpsc::unbounded_channel::<WsMessage>();
        *lock(&self.shared.outbound) = Some(tx);

        let shared = Arc::clone(&self.shared);
        let task = runtime.spawn(run_connection(shared, options, events, rx));
        *lock(&self.shared.task) = Some(task);
        Ok(())
    }

    fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), TransportError> {
        if !self.is_online() {
            return Err(TransportError::NotConnected);
        }
        self.shared.enqueue(&ClientMessage::Subscribe {
            topic: topic.to_string(),
            qos: qos.as_u8(),
        })
    }

    fn publish(&self, topic: &str, payload: &[u8], qos: QoS, retain: bool) -> Result<(), TransportError> {
        if !self.is_online() {
            return Err(TransportError::NotConnected);
        }
        let payload = std::str::from_utf8(payload).map_err(|e| TransportError::Rejected {
            topic: topic.to_string(),
            reason: format!("payload is not UTF-8: {e}"),
        })?;
        self.shared.enqueue(&ClientMessage::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
            message_id: uuid::Uuid::new_v4().to_string(),
            qos: qos.as_u8(),
            retain,
        })
    }

    fn disconnect(&self) {
        self.shared.online.store(false, Ordering::Release);
        lock(&self.shared.outbound).take();
        if let Some(task) = lock(&self.shared.task).take() {
            task.abort();
        }
    }
}

async fn run_connection(
    shared: Arc<Shared>,
    options: ConnectOptions,
    events: TransportEvents,
    mut rx: UnboundedReceiver<WsMessage>,
) {
    let ws_stream = match connect_async(options.broker_uri.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            error!(uri = %options.broker_uri, "WebSocket connect error: {e}");
            let _ = events.send(TransportEvent::Disconnected);
            return;
        }
    };
    info!(uri = %options.broker_uri, client_id = %options.client_id, "socket open, authenticating");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let auth = ClientMessage::Auth {
        client_id: options.client_id.clone(),
        username: options.username.clone(),
        token: options.password.clone(),
    };
    let sent = match serde_json::to_string(&auth) {
        Ok(text) => ws_sender.send(WsMessage::text(text)).await.is_ok(),
        Err(_) => false,
    };

    if sent {
        loop {
            tokio::select! {
                outgoing = rx.recv() => match outgoing {
                    Some(msg) => {
                        if let Err(e) = ws_sender.send(msg).await {
                            error!("Failed to send frame: {e}");
                            break;
                        }
                    }
                    None => break,
                },
                incoming = ws_receiver.next() => match incoming {
                    Some(Ok(msg)) if msg.is_text() => {
                        if let Ok(text) = msg.to_text() {
                            handle_frame(&shared, &events, text);
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket read error: {e}");
                        break;
                    }
                },
            }
        }
    } else {
        error!("failed to send auth frame");
    }

    shared.online.store(false, Ordering::Release);
    let _ = ws_sender.close().await;
    info!(client_id = %options.client_id, "socket closed");
    let _ = events.send(TransportEvent::Disconnected);
}

fn handle_frame(shared: &Shared, events: &TransportEvents, text: &str) {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::Authenticated {}) => {
            shared.online.store(true, Ordering::Release);
            let _ = events.send(TransportEvent::Connected);
        }
        Ok(ServerMessage::Message {
            topic,
            payload,
            message_id,
            qos,
            ..
        }) => {
            debug!(%topic, qos, "frame received");
            match QoS::from_u8(qos) {
                Some(QoS::AtLeastOnce) if !message_id.is_empty() => {
                    if let Err(e) = shared.enqueue(&ClientMessage::Ack { message_id }) {
                        warn!("could not acknowledge delivery on {topic}: {e}");
                    }
                }
                Some(_) => {}
                None => warn!(%topic, qos, "unsupported QoS, delivering without ack"),
            }
            let _ = events.send(TransportEvent::Message {
                topic,
                payload: payload.into_bytes(),
            });
        }
        Ok(ServerMessage::Error { message }) => {
            warn!("bridge reported error: {message}");
        }
        Err(err) => {
            warn!(
                "Invalid bridge frame: {err} | {}",
                text.chars().take(100).collect::<String>()
            );
        }
    }
}
