use super::{DeviceIdentity, IdentityError, MAX_IDENTITY_FIELD_LEN, Topics};

fn identity() -> DeviceIdentity {
    DeviceIdentity::new("reg1", "us-central1", "proj1", "dev1")
}

#[test]
fn test_client_id_format() {
    let topics = Topics::resolve(&identity());
    assert_eq!(
        topics.client_id,
        "projects/proj1/locations/us-central1/registries/reg1/devices/dev1"
    );
}

#[test]
fn test_topic_formats() {
    let topics = Topics::resolve(&identity());
    assert_eq!(topics.config, "/devices/dev1/config");
    assert_eq!(topics.commands, "/devices/dev1/commands/#");
    assert_eq!(topics.state, "/devices/dev1/state");
    assert_eq!(topics.telemetry_root, "/devices/dev1/events");
}

#[test]
fn test_telemetry_suffix() {
    let topics = Topics::resolve(&identity());
    assert_eq!(topics.telemetry("pulse"), "/devices/dev1/events/pulse");
    assert_eq!(topics.telemetry("logs"), "/devices/dev1/events/logs");
}

#[test]
fn test_is_config_matches_exactly() {
    let topics = Topics::resolve(&identity());
    assert!(topics.is_config("/devices/dev1/config"));
    assert!(!topics.is_config("/devices/dev1/commands/reboot"));
    assert!(!topics.is_config("/devices/dev1/config/extra"));
}

#[test]
fn test_validate_accepts_complete_identity() {
    assert_eq!(identity().validate(), Ok(()));
}

#[test]
fn test_validate_rejects_empty_field() {
    let mut id = identity();
    id.region.clear();
    assert_eq!(id.validate(), Err(IdentityError::Empty("region")));
}

#[test]
fn test_validate_rejects_long_field() {
    let mut id = identity();
    id.device_id = "d".repeat(MAX_IDENTITY_FIELD_LEN + 1);
    assert_eq!(
        id.validate(),
        Err(IdentityError::TooLong {
            field: "device_id",
            len: MAX_IDENTITY_FIELD_LEN + 1
        })
    );
}
