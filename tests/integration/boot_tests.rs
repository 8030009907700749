//! Boot sequence: registration, initial values, advertising, fatal link errors.

use super::mock_link::{LogSink, ManualClock, MockLink, RecordingDelay, Rig};

use lmtherapy::app::events::AppEvent;
use lmtherapy::app::service::AppService;
use lmtherapy::config::SystemConfig;
use lmtherapy::error::{Error, LinkError};
use lmtherapy::fsm::StateId;
use lmtherapy::gatt::attributes::{AttributeId, Group};

#[test]
fn boot_registers_both_groups_and_advertises() {
    let mut app = AppService::new(SystemConfig::default());
    let mut link = MockLink::new();
    let clock = ManualClock::default();
    let mut sink = LogSink::default();

    app.boot(&mut link, &clock, &mut sink).unwrap();

    assert_eq!(link.begun_groups, Group::ALL.to_vec());
    assert_eq!(link.advertise_calls, 1);
    assert!(app.is_booted());
    assert_eq!(app.state(), StateId::Inactive);
    assert!(matches!(sink.events.last(), Some(AppEvent::Started(StateId::Inactive))));
}

#[test]
fn boot_mirrors_every_initial_value_to_the_link() {
    let mut app = AppService::new(SystemConfig::default());
    let mut link = MockLink::new();
    app.boot(&mut link, &ManualClock::default(), &mut LogSink::default())
        .unwrap();

    for attr in AttributeId::ALL {
        assert!(
            link.published.iter().any(|p| p.attr == attr),
            "{attr:?} never published"
        );
    }
}

#[test]
fn boot_values_match_configured_defaults() {
    let rig = Rig::booted();
    assert_eq!(rig.value(AttributeId::Intensity), "50");
    assert_eq!(rig.value(AttributeId::TargetTime), "300");
    assert_eq!(rig.value(AttributeId::ElapsedTime), "0");
    assert_eq!(rig.value(AttributeId::Status), "Inactive");
    assert_eq!(rig.value(AttributeId::ClientTimestamp), "03-05-2025T00:00:00");
    assert_eq!(rig.value(AttributeId::UserId), "CJ_02");
    assert_eq!(rig.value(AttributeId::DeviceId), "TMP-001");
    assert_eq!(rig.value(AttributeId::LocationId), "1");
    assert_eq!(rig.value(AttributeId::Battery), "100");
    assert_eq!(rig.value(AttributeId::FirmwareVersion), "1.0.0");

    // Session start fields begin unset regardless of the advertised defaults.
    assert_eq!(rig.app.session().intensity_percent, 0);
    assert_eq!(rig.app.session().target_time_secs, 0);
}

#[test]
fn link_failure_is_fatal_and_skips_advertising() {
    let mut app = AppService::new(SystemConfig::default());
    let mut link = MockLink {
        fail_begin: Some(LinkError::StackInitFailed),
        ..MockLink::new()
    };
    let clock = ManualClock::default();
    let mut sink = LogSink::default();

    let err = app.boot(&mut link, &clock, &mut sink).unwrap_err();
    assert_eq!(err, Error::Link(LinkError::StackInitFailed));
    assert_eq!(link.advertise_calls, 0);
    assert!(!app.is_booted());

    // A service that never booted ignores the loop.
    link.write(AttributeId::Intensity, b"40");
    clock.advance(5_000);
    app.poll(&mut link, &clock, &mut RecordingDelay::default(), &mut sink);
    assert_eq!(link.inbound.len(), 1);
    assert!(link.published.is_empty());
}

#[test]
fn invalid_config_is_rejected_before_touching_the_link() {
    let mut config = SystemConfig::default();
    config.battery_interval_ms = 0;
    let mut app = AppService::new(config);
    let mut link = MockLink::new();

    let err = app
        .boot(&mut link, &ManualClock::default(), &mut LogSink::default())
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(link.begin_calls, 0);
}
