use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use serial_test::serial;

use super::config::apply_period;
use super::{
    ConfigSynchronizer, DeviceState, FirmwareDirective, PeriodChange, PeriodRejection, Publish,
    RemoteConfigFrame, StatePublisher,
};
use crate::dispatcher::{EventSignals, Period, PeriodError, ScheduledTimer, Signals, TimerError};
use crate::platform::{StaticFirmware, clear_timezone, current_timezone};
use crate::transport::TransportError;
use crate::utils::error::EngineError;

fn ms(v: u64) -> Period {
    Period::Every(Duration::from_millis(v))
}

fn slot(period: Period) -> ScheduledTimer {
    ScheduledTimer::new(
        "state",
        Signals::STATE_DUE,
        Arc::new(EventSignals::new()),
        period,
    )
}

#[test]
fn test_parse_full_frame() {
    let frame = RemoteConfigFrame::parse(
        br#"{
            "device_config": {
                "state_period_ms": 5000,
                "pulse_period_ms": -1,
                "tz": "GMT-3",
                "firmware": {"version": "1.2.0", "url": "https://fw.example/1.2.0.bin"}
            },
            "app_config": {"led": true}
        }"#,
    )
    .unwrap();

    assert_eq!(frame.state_period_ms, Some(5000));
    assert_eq!(frame.pulse_period_ms, Some(-1));
    assert_eq!(frame.timezone.as_deref(), Some("GMT-3"));
    assert_eq!(
        frame.firmware,
        Some(FirmwareDirective {
            version: "1.2.0".to_string(),
            url: "https://fw.example/1.2.0.bin".to_string(),
        })
    );
    assert_eq!(frame.app_config, Some(json!({"led": true})));
}

#[test]
fn test_parse_timezone_alias_and_partial_firmware() {
    let frame = RemoteConfigFrame::parse(
        br#"{"device_config": {"timezone": "CET-1", "firmware": {"version": "2.0"}}}"#,
    )
    .unwrap();
    assert_eq!(frame.timezone.as_deref(), Some("CET-1"));
    assert_eq!(frame.firmware, None);
    assert_eq!(frame.app_config, None);
}

#[test]
fn test_parse_skips_wrongly_typed_periods() {
    let frame = RemoteConfigFrame::parse(
        br#"{"device_config": {"state_period_ms": "fast", "pulse_period_ms": 60000}}"#,
    )
    .unwrap();
    assert_eq!(frame.state_period_ms, None);
    assert_eq!(frame.pulse_period_ms, Some(60000));
}

#[test]
fn test_parse_empty_payload_is_empty_frame() {
    assert_eq!(
        RemoteConfigFrame::parse(b"").unwrap(),
        RemoteConfigFrame::default()
    );
    assert_eq!(
        RemoteConfigFrame::parse(b"  \n").unwrap(),
        RemoteConfigFrame::default()
    );
}

#[test]
fn test_parse_rejects_malformed_payloads() {
    assert!(RemoteConfigFrame::parse(b"{not json").is_err());
    assert!(RemoteConfigFrame::parse(b"[1, 2]").is_err());
    assert!(RemoteConfigFrame::parse(b"42").is_err());
}

#[tokio::test]
async fn test_apply_period_same_value_is_noop() {
    let mut s = slot(ms(2000));
    assert_eq!(
        apply_period(&mut s, 2000, Duration::from_millis(2000), true),
        PeriodChange::Unchanged
    );
    assert!(!s.is_armed());
}

#[tokio::test]
async fn test_apply_period_rearms_armed_timer() {
    let mut s = slot(ms(100));
    s.resume().unwrap();
    assert_eq!(
        apply_period(&mut s, 200, Duration::from_millis(50), true),
        PeriodChange::Applied(ms(200))
    );
    assert!(s.is_armed());
    assert_eq!(s.period(), ms(200));
}

#[tokio::test]
async fn test_apply_period_disable_stops_timer() {
    let mut s = slot(ms(100));
    s.resume().unwrap();
    assert_eq!(
        apply_period(&mut s, -1, Duration::ZERO, true),
        PeriodChange::Applied(Period::Disabled)
    );
    assert!(!s.is_armed());
    assert_eq!(s.period(), Period::Disabled);
}

#[tokio::test]
async fn test_apply_period_reenables_when_online() {
    let mut s = slot(Period::Disabled);
    assert_eq!(
        apply_period(&mut s, 3000, Duration::from_millis(2000), true),
        PeriodChange::Applied(ms(3000))
    );
    assert!(s.is_armed());
}

#[tokio::test]
async fn test_apply_period_offline_only_stores() {
    let mut s = slot(Period::Disabled);
    assert_eq!(
        apply_period(&mut s, 3000, Duration::from_millis(2000), false),
        PeriodChange::Applied(ms(3000))
    );
    assert!(!s.is_armed());
    assert_eq!(s.period(), ms(3000));
}

#[tokio::test]
async fn test_apply_period_rejects_below_minimum_and_invalid() {
    let mut s = slot(ms(5000));
    assert_eq!(
        apply_period(&mut s, 500, Duration::from_millis(2000), true),
        PeriodChange::Rejected(PeriodRejection::Period(PeriodError::BelowMinimum {
            requested_ms: 500,
            minimum_ms: 2000,
        }))
    );
    assert_eq!(
        apply_period(&mut s, 0, Duration::ZERO, true),
        PeriodChange::Rejected(PeriodRejection::Period(PeriodError::Invalid(0)))
    );
    assert_eq!(
        apply_period(&mut s, -7, Duration::ZERO, true),
        PeriodChange::Rejected(PeriodRejection::Period(PeriodError::Invalid(-7)))
    );
    assert_eq!(s.period(), ms(5000));
}

#[tokio::test]
async fn test_synchronizer_requests_update_only_on_version_change() {
    let firmware = Arc::new(StaticFirmware::new("1.0.0"));
    let sync = ConfigSynchronizer::new(
        Duration::from_millis(2000),
        Some("ROOT".to_string()),
        firmware.clone(),
    );
    let mut state = slot(ms(2000));
    let mut pulse = slot(ms(60_000));

    let same = RemoteConfigFrame::parse(
        br#"{"device_config": {"firmware": {"version": "1.0.0", "url": "https://fw/a"}}}"#,
    )
    .unwrap();
    let outcome = sync.apply(&same, &mut state, &mut pulse, true);
    assert!(!outcome.update_requested);
    assert!(firmware.requested_updates().is_empty());

    let newer = RemoteConfigFrame::parse(
        br#"{"device_config": {"firmware": {"version": "1.1.0", "url": "https://fw/b"}}}"#,
    )
    .unwrap();
    let outcome = sync.apply(&newer, &mut state, &mut pulse, true);
    assert!(outcome.update_requested);
    assert_eq!(outcome.state, PeriodChange::Absent);
    assert_eq!(outcome.pulse, PeriodChange::Absent);
    assert_eq!(firmware.requested_updates(), vec!["https://fw/b".to_string()]);
}

#[tokio::test]
#[serial(tz)]
async fn test_synchronizer_applies_timezone_and_periods() {
    let firmware = Arc::new(StaticFirmware::new("1.0.0"));
    let sync = ConfigSynchronizer::new(Duration::from_millis(2000), None, firmware);
    let mut state = slot(ms(2000));
    let mut pulse = slot(ms(60_000));

    let frame = RemoteConfigFrame::parse(
        br#"{"device_config": {"tz": "UTC0", "state_period_ms": 1000, "pulse_period_ms": 30000}}"#,
    )
    .unwrap();

    clear_timezone();
    let outcome = sync.apply(&frame, &mut state, &mut pulse, false);
    assert!(outcome.timezone_applied);
    assert_eq!(current_timezone().as_deref(), Some("UTC0"));
    assert!(matches!(outcome.state, PeriodChange::Rejected(_)));
    assert_eq!(outcome.pulse, PeriodChange::Applied(ms(30_000)));
    clear_timezone();
    assert_eq!(state.period(), ms(2000));
    assert_eq!(pulse.period(), ms(30_000));
}

#[test]
fn test_rejection_wraps_timer_errors() {
    let rejection: PeriodRejection = TimerError::NotArmed("pulse").into();
    assert_eq!(rejection.to_string(), "pulse timer is stopped; arm it before changing its period");
}

fn device() -> DeviceState {
    DeviceState {
        firmware: "1.0.0".to_string(),
        state_period: ms(2000),
        pulse_period: Period::Disabled,
        reset_reason: 3,
    }
}

#[test]
fn test_snapshot_layout() {
    let snapshot = device().snapshot(|app| {
        app.insert("temp".to_string(), json!(21.5));
    });
    assert_eq!(
        snapshot,
        json!({
            "device_state": {
                "firmware": "1.0.0",
                "state_period_ms": 2000,
                "pulse_period_ms": -1,
                "reset_reason": 3,
            },
            "app_state": {"temp": 21.5},
        })
    );
}

#[test]
fn test_publish_if_changed_skips_equal_snapshots() {
    let mut publisher = StatePublisher::new();
    let mut sent = Vec::new();

    let first = device().snapshot(|app| {
        app.insert("a".to_string(), json!(1));
        app.insert("b".to_string(), json!(2));
    });
    let res = publisher.publish_if_changed(first, |text| {
        sent.push(text.to_string());
        Ok(())
    });
    assert_eq!(res.unwrap(), Publish::Sent);

    // same content, different insertion order
    let second = device().snapshot(|app| {
        app.insert("b".to_string(), json!(2));
        app.insert("a".to_string(), json!(1));
    });
    let res = publisher.publish_if_changed(second, |text| {
        sent.push(text.to_string());
        Ok(())
    });
    assert_eq!(res.unwrap(), Publish::Unchanged);
    assert_eq!(sent.len(), 1);

    let parsed: Value = serde_json::from_str(&sent[0]).unwrap();
    assert_eq!(parsed["app_state"]["a"], json!(1));
}

#[test]
fn test_failed_publish_still_becomes_baseline() {
    let mut publisher = StatePublisher::new();
    let snapshot = device().snapshot(|_| {});

    let res = publisher.publish_if_changed(snapshot.clone(), |_| Err(TransportError::NotConnected));
    assert!(matches!(
        res,
        Err(EngineError::Transport(TransportError::NotConnected))
    ));
    assert_eq!(publisher.last(), Some(&snapshot));

    let res = publisher.publish_if_changed(snapshot, |_| panic!("must not publish"));
    assert_eq!(res.unwrap(), Publish::Unchanged);
}
