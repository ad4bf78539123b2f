use serial_test::serial;

use super::{Firmware, StaticFirmware, apply_timezone, clear_timezone, current_timezone};

#[test]
fn test_static_firmware_reports_version() {
    let fw = StaticFirmware::new("1.2.3").with_reset_reason(4);
    assert_eq!(fw.current_version(), "1.2.3");
    assert_eq!(fw.reset_reason(), 4);
    assert!(fw.requested_updates().is_empty());
}

#[test]
fn test_static_firmware_records_requests() {
    let fw = StaticFirmware::new("1.2.3");
    fw.apply_update("https://example.com/fw-1.2.4.bin", Some("CERT"));
    assert_eq!(
        fw.requested_updates(),
        vec!["https://example.com/fw-1.2.4.bin".to_string()]
    );
}

#[test]
#[serial(tz)]
fn test_apply_timezone_replaces_zone() {
    clear_timezone();
    assert_eq!(current_timezone(), None);

    apply_timezone("GMT-3");
    assert_eq!(current_timezone().as_deref(), Some("GMT-3"));
    apply_timezone("CET-1CEST,M3.5.0,M10.5.0/3");
    assert_eq!(
        current_timezone().as_deref(),
        Some("CET-1CEST,M3.5.0,M10.5.0/3")
    );
    clear_timezone();
}

#[test]
#[serial(tz)]
fn test_apply_timezone_leaves_environment_alone() {
    temp_env::with_var("TZ", Some("UTC0"), || {
        apply_timezone("GMT-3");
        assert_eq!(std::env::var("TZ").as_deref(), Ok("UTC0"));
    });
    clear_timezone();
}
