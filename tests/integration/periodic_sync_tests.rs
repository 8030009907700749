//! Periodic work: therapy re-sync, telemetry, battery simulation.

use super::mock_link::Rig;

use lmtherapy::app::events::AppEvent;
use lmtherapy::fsm::StateId;
use lmtherapy::gatt::attributes::AttributeId;

fn telemetry_count(rig: &Rig) -> usize {
    rig.sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Telemetry(_)))
        .count()
}

#[test]
fn first_sync_replaces_advertised_defaults() {
    let mut rig = Rig::booted();
    rig.step(999);
    assert_eq!(rig.value(AttributeId::TargetTime), "300");

    rig.step(1);
    assert_eq!(rig.value(AttributeId::TargetTime), "0");
    assert_eq!(rig.value(AttributeId::Intensity), "0");
    assert_eq!(rig.link.notified(AttributeId::TargetTime), vec!["0"]);
}

#[test]
fn repeated_sync_without_changes_is_silent() {
    let mut rig = Rig::booted();
    rig.run_secs(1);
    let after_first = rig.link.notification_count();

    rig.run_secs(3);
    assert_eq!(rig.link.notification_count(), after_first);
    assert_eq!(telemetry_count(&rig), 4);
}

#[test]
fn telemetry_carries_session_snapshot() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"120");
    rig.run_secs(2);

    let last = rig.sink.events.iter().rev().find_map(|e| match e {
        AppEvent::Telemetry(t) => Some(t.clone()),
        _ => None,
    });
    let t = last.expect("telemetry emitted");
    assert_eq!(t.state, StateId::Active);
    assert_eq!(t.elapsed_secs, 2);
    assert_eq!(t.intensity_percent, 40);
    assert_eq!(t.target_time_secs, 120);
}

#[test]
fn battery_steps_every_five_seconds() {
    let mut rig = Rig::booted();
    rig.run_secs(4);
    assert_eq!(rig.value(AttributeId::Battery), "100");

    rig.run_secs(1);
    assert_eq!(rig.value(AttributeId::Battery), "99");
    rig.run_secs(5);
    assert_eq!(rig.value(AttributeId::Battery), "98");
    assert_eq!(rig.link.notified(AttributeId::Battery), vec!["99", "98"]);
}

#[test]
fn battery_wraps_from_empty_to_full() {
    let mut config = lmtherapy::config::SystemConfig::default();
    config.initial_battery_percent = 0;
    let mut rig = Rig::booted_with(config, super::mock_link::MockLink::new());

    rig.step(5_000);
    assert_eq!(rig.app.battery_percent(), 100);
    assert_eq!(rig.value(AttributeId::Battery), "100");
}

#[test]
fn late_iteration_runs_each_job_once() {
    let mut rig = Rig::booted();
    rig.step(12_000);
    assert_eq!(telemetry_count(&rig), 1);
    assert_eq!(rig.app.battery_percent(), 99);
}

#[test]
fn status_stays_in_sync_across_ticks() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"60");
    assert_eq!(rig.value(AttributeId::Status), "Active");

    // Nothing but the session tick runs here; it must leave status in sync.
    rig.step(1);
    assert_eq!(rig.value(AttributeId::Status), "Active");
    assert_eq!(rig.link.notified(AttributeId::Status), vec!["Active"]);
}
