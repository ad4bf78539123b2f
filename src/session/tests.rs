use std::sync::Arc;

use tokio::sync::mpsc;

use super::{CONNECT_USERNAME, HEARTBEAT_PAYLOAD, Session};
use crate::credential::{CredentialError, JwtSigner};
use crate::engine::{DeviceApp, EngineConfig};
use crate::identity::DeviceIdentity;
use crate::transport::{MemoryTransport, QoS, TransportError};
use crate::utils::error::EngineError;

struct FixedToken(&'static str);

impl DeviceApp for FixedToken {
    fn credential(&self, project_id: &str) -> Result<String, CredentialError> {
        Ok(format!("{}-{project_id}", self.0))
    }
}

struct BrokenKey;

impl DeviceApp for BrokenKey {
    fn credential(&self, _project_id: &str) -> Result<String, CredentialError> {
        JwtSigner::from_pem(b"not a key").map(|_| String::new())
    }
}

fn config() -> EngineConfig {
    let mut config = EngineConfig::new(DeviceIdentity::new("reg1", "europe-west1", "proj1", "dev1"))
        .with_broker_uri("memory://bridge");
    config.topic_path_log = Some("tlogs".to_string());
    config
}

fn session() -> (Arc<MemoryTransport>, Session) {
    let transport = Arc::new(MemoryTransport::new());
    let session = Session::new(transport.clone(), &config());
    (transport, session)
}

#[test]
fn test_start_connects_with_fresh_token() {
    let (transport, session) = session();
    let (tx, _rx) = mpsc::unbounded_channel();

    session.start(&FixedToken("tok"), tx).unwrap();

    let attempts = transport.connect_attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].broker_uri, "memory://bridge");
    assert_eq!(
        attempts[0].client_id,
        "projects/proj1/locations/europe-west1/registries/reg1/devices/dev1"
    );
    assert_eq!(attempts[0].username, CONNECT_USERNAME);
    assert_eq!(attempts[0].password, "tok-proj1");
}

#[test]
fn test_start_fails_fatally_on_bad_key() {
    let (transport, session) = session();
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = session.start(&BrokenKey, tx).unwrap_err();
    assert!(matches!(err, EngineError::Credential(CredentialError::InvalidKey(_))));
    assert!(err.is_fatal());
    assert!(transport.connect_attempts().is_empty());
}

#[test]
fn test_publish_requires_connection() {
    let (_transport, session) = session();
    assert_eq!(session.publish_state("{}"), Err(TransportError::NotConnected));
    assert_eq!(session.send_pulse(), Err(TransportError::NotConnected));
}

#[tokio::test]
async fn test_subscriptions_and_publish_topics() {
    let (transport, session) = session();
    let (tx, _rx) = mpsc::unbounded_channel();
    session.start(&FixedToken("tok"), tx).unwrap();
    transport.bring_up();

    session.subscribe_all().unwrap();
    assert_eq!(
        transport.subscriptions(),
        vec![
            ("/devices/dev1/config".to_string(), QoS::AtLeastOnce),
            ("/devices/dev1/commands/#".to_string(), QoS::AtLeastOnce),
        ]
    );

    session.publish_state("{\"a\":1}").unwrap();
    session.send_pulse().unwrap();
    session.log("booted").unwrap();
    session.publish_telemetry("metrics", "42").unwrap();

    let published = transport.published();
    let topics: Vec<&str> = published.iter().map(|p| p.topic.as_str()).collect();
    assert_eq!(
        topics,
        vec![
            "/devices/dev1/state",
            "/devices/dev1/events/pulse",
            "/devices/dev1/events/tlogs",
            "/devices/dev1/events/metrics",
        ]
    );
    assert_eq!(published[1].payload_str(), HEARTBEAT_PAYLOAD);
    assert!(published.iter().all(|p| p.retain && p.qos == QoS::AtLeastOnce));
}

#[test]
fn test_close_disconnects_transport() {
    let (transport, session) = session();
    let (tx, _rx) = mpsc::unbounded_channel();
    session.start(&FixedToken("tok"), tx).unwrap();
    session.close();
    assert!(transport.is_disconnected());
}
