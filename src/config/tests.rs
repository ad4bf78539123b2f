use std::fs;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use super::{Settings, SettingsError, load_config_from};
use crate::dispatcher::{Period, PeriodError};

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.engine.state_period_ms, 2000);
    assert_eq!(settings.engine.pulse_period_ms, 300_000);
    assert_eq!(settings.engine.min_state_period_ms, 2000);
    assert_eq!(settings.broker.uri, "mqtts://mqtt.googleapis.com:8883");
    assert_eq!(settings.log.level, "info");
    assert!(settings.device.device_id.is_empty());
}

#[test]
#[serial(env)]
fn test_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let base = tmp.path().join("default");
    let toml = r#"
        [device]
        registry = "reg1"
        region = "us-central1"
        project_id = "proj1"
        device_id = "dev1"

        [engine]
        state_period_ms = 5000
        pulse_period_ms = -1
        topic_pulse = "heartbeat"

        [log]
        level = "debug"
    "#;
    fs::write(tmp.path().join("default.toml"), toml).expect("write config file");

    let settings = load_config_from(base.to_str().unwrap()).expect("load_config failed");
    assert_eq!(settings.device.project_id, "proj1");
    assert_eq!(settings.engine.state_period_ms, 5000);
    assert_eq!(settings.engine.pulse_period_ms, -1);
    assert_eq!(settings.engine.min_state_period_ms, 2000);
    assert_eq!(settings.log.level, "debug");

    let config = settings.engine_config().unwrap();
    assert_eq!(config.identity.device_id, "dev1");
    assert_eq!(config.state_period, Period::Every(Duration::from_secs(5)));
    assert_eq!(config.pulse_period, Period::Disabled);
    assert_eq!(config.pulse_topic(), "heartbeat");
    assert_eq!(config.log_topic(), "logs");
    assert!(config.validate().is_ok());
}

#[test]
#[serial(env)]
fn test_environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    fs::write(
        tmp.path().join("default.toml"),
        "[device]\ndevice_id = \"from-file\"\n",
    )
    .unwrap();
    let base = tmp.path().join("default");

    temp_env::with_vars(
        [
            ("CLOUDSYNC_DEVICE__DEVICE_ID", Some("from-env")),
            ("CLOUDSYNC_ENGINE__STATE_PERIOD_MS", Some("7000")),
        ],
        || {
            let settings = load_config_from(base.to_str().unwrap()).unwrap();
            assert_eq!(settings.device.device_id, "from-env");
            assert_eq!(settings.engine.state_period_ms, 7000);
        },
    );
}

#[test]
fn test_invalid_period_is_reported() {
    let mut settings = Settings::default();
    settings.engine.state_period_ms = 0;
    assert!(matches!(
        settings.engine_config(),
        Err(SettingsError::Period(PeriodError::Invalid(0)))
    ));
}

#[test]
fn test_root_certificate_is_loaded() {
    let tmp = TempDir::new().unwrap();
    let cert = tmp.path().join("ota_root.pem");
    fs::write(&cert, "-----BEGIN CERTIFICATE-----\n").unwrap();

    let mut settings = Settings::default();
    settings.broker.ota_root_cert_path = Some(cert);
    let config = settings.engine_config().unwrap();
    assert_eq!(
        config.ota_root_cert.as_deref(),
        Some("-----BEGIN CERTIFICATE-----\n")
    );

    settings.broker.ota_root_cert_path = Some(tmp.path().join("missing.pem"));
    assert!(matches!(
        settings.engine_config(),
        Err(SettingsError::RootCert { .. })
    ));
}
