//! Session lifecycle: start on write, elapsed tracking, stop on target or
//! command, and the published stop sequence.

use super::mock_link::{MockLink, Rig};

use lmtherapy::app::commands::AppCommand;
use lmtherapy::app::events::AppEvent;
use lmtherapy::config::SystemConfig;
use lmtherapy::fsm::StateId;
use lmtherapy::fsm::context::StopReason;
use lmtherapy::gatt::attributes::AttributeId;

fn started_events(rig: &Rig) -> usize {
    rig.sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::SessionStarted { .. }))
        .count()
}

fn stop_event(rig: &Rig) -> Option<(StopReason, u32)> {
    rig.sink.events.iter().find_map(|e| match e {
        AppEvent::SessionStopped {
            reason,
            elapsed_secs,
        } => Some((*reason, *elapsed_secs)),
        _ => None,
    })
}

#[test]
fn writing_intensity_then_target_starts_exactly_once() {
    let mut rig = Rig::booted();

    rig.link.write(AttributeId::Intensity, b"40");
    rig.poll();
    assert_eq!(rig.app.state(), StateId::Inactive);

    rig.link.write(AttributeId::TargetTime, b"120");
    rig.poll();
    assert_eq!(rig.app.state(), StateId::Active);
    assert_eq!(started_events(&rig), 1);
    assert_eq!(rig.link.notified(AttributeId::Status), vec!["Active"]);

    rig.run_secs(3);
    assert_eq!(started_events(&rig), 1);
}

#[test]
fn target_then_intensity_also_starts() {
    let mut rig = Rig::booted();
    rig.start_session(b"0", b"60");
    assert_eq!(rig.app.state(), StateId::Inactive);

    rig.link.write(AttributeId::Intensity, b"25");
    rig.poll();
    assert_eq!(rig.app.state(), StateId::Active);
    assert_eq!(rig.app.session().intensity_percent, 25);
}

#[test]
fn elapsed_time_counts_whole_seconds() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"120");

    rig.step(999);
    assert_eq!(rig.app.session().elapsed_secs, 0);
    rig.step(1);
    assert_eq!(rig.app.session().elapsed_secs, 1);
    rig.run_secs(2);
    assert_eq!(rig.app.session().elapsed_secs, 3);
    assert_eq!(rig.value(AttributeId::ElapsedTime), "3");
    assert_eq!(rig.link.notified(AttributeId::ElapsedTime), vec!["1", "2", "3"]);
}

#[test]
fn session_ends_when_target_reached() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"3");
    rig.run_secs(3);

    assert_eq!(rig.app.state(), StateId::Inactive);
    let session = rig.app.session();
    assert_eq!(session.intensity_percent, 0);
    assert_eq!(session.target_time_secs, 0);
    assert_eq!(session.elapsed_secs, 0);
    assert_eq!(stop_event(&rig), Some((StopReason::TargetReached, 3)));
}

#[test]
fn stop_sequence_bumps_then_settles_on_zero() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"2");
    rig.run_secs(2);

    assert_eq!(rig.link.notified(AttributeId::Intensity), vec!["1", "0"]);
    assert_eq!(rig.link.notified(AttributeId::TargetTime), vec!["1", "0"]);
    assert_eq!(rig.value(AttributeId::Intensity), "0");
    assert_eq!(rig.value(AttributeId::TargetTime), "0");
    assert_eq!(rig.value(AttributeId::ElapsedTime), "0");
    assert_eq!(rig.link.notified(AttributeId::Status), vec!["Active", "Inactive"]);
    assert_eq!(rig.delay.total_ms(), 10);
}

#[test]
fn stop_after_zero_target_write_still_notifies_zero() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"60");
    rig.run_secs(1);

    // Writing 0 leaves the stored value at "0" before the stop runs.
    rig.link.write(AttributeId::TargetTime, b"0");
    rig.step(1);

    assert_eq!(rig.app.state(), StateId::Inactive);
    assert_eq!(rig.link.notified(AttributeId::TargetTime), vec!["1", "0"]);
}

#[test]
fn forced_notify_link_skips_the_bump() {
    let link = MockLink {
        forced: true,
        ..MockLink::new()
    };
    let mut rig = Rig::booted_with(SystemConfig::default(), link);
    rig.start_session(b"40", b"1");
    rig.run_secs(1);

    assert_eq!(rig.link.notified(AttributeId::Intensity), vec!["0"]);
    assert_eq!(rig.link.notified(AttributeId::TargetTime), vec!["0"]);
    assert_eq!(rig.delay.total_ns, 0);
}

#[test]
fn stop_command_ends_active_session() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"60");
    rig.run_secs(5);

    let now = rig.clock.now();
    rig.app.handle_command(
        AppCommand::StopSession,
        now,
        &mut rig.link,
        &mut rig.delay,
        &mut rig.sink,
    );

    assert_eq!(rig.app.state(), StateId::Inactive);
    assert_eq!(stop_event(&rig), Some((StopReason::Requested, 5)));
    assert_eq!(rig.value(AttributeId::Status), "Inactive");
}

#[test]
fn stop_command_while_inactive_is_ignored() {
    let mut rig = Rig::booted();
    let now = rig.clock.now();
    rig.app
        .stop_session(now, &mut rig.link, &mut rig.delay, &mut rig.sink);

    assert!(stop_event(&rig).is_none());
    assert_eq!(rig.link.notification_count(), 0);
    assert_eq!(rig.delay.total_ns, 0);
}

#[test]
fn lowering_target_below_elapsed_ends_session() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"60");
    rig.run_secs(10);

    rig.link.write(AttributeId::TargetTime, b"5");
    rig.step(1);

    assert_eq!(rig.app.state(), StateId::Inactive);
    assert_eq!(stop_event(&rig), Some((StopReason::TargetReached, 10)));
}

#[test]
fn stop_bump_notifies_twice_when_values_were_one() {
    let mut rig = Rig::booted();
    rig.start_session(b"1", b"1");
    rig.run_secs(1);

    assert_eq!(rig.app.state(), StateId::Inactive);
    assert_eq!(rig.link.notified(AttributeId::Intensity), vec!["2", "0"]);
    assert_eq!(rig.link.notified(AttributeId::TargetTime), vec!["2", "0"]);
}

#[test]
fn session_can_restart_after_stop() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"1");
    rig.run_secs(1);
    assert_eq!(rig.app.state(), StateId::Inactive);

    rig.start_session(b"70", b"30");
    assert_eq!(rig.app.state(), StateId::Active);
    assert_eq!(started_events(&rig), 2);
    assert_eq!(rig.app.session().elapsed_secs, 0);
}
