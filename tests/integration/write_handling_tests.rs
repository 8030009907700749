//! Remote write handling: lenient numeric decode, passthrough fields,
//! rejected writes.

use super::mock_link::{LogSink, ManualClock, RecordingDelay, Rig};

use lmtherapy::adapters::ble::BleLink;
use lmtherapy::app::events::AppEvent;
use lmtherapy::app::service::AppService;
use lmtherapy::config::SystemConfig;
use lmtherapy::error::AttributeError;
use lmtherapy::fsm::StateId;
use lmtherapy::gatt::attributes::{AttributeId, CHAR_INTENSITY, CHAR_USER_ID};

fn rejections(rig: &Rig) -> Vec<(AttributeId, AttributeError)> {
    rig.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::WriteRejected { attr, error } => Some((*attr, *error)),
            _ => None,
        })
        .collect()
}

#[test]
fn non_numeric_intensity_decodes_to_zero_and_does_not_start() {
    let mut rig = Rig::booted();
    rig.start_session(b"abc", b"120");

    assert_eq!(rig.app.session().intensity_percent, 0);
    assert_eq!(rig.app.state(), StateId::Inactive);
    assert!(rejections(&rig).is_empty());
}

#[test]
fn leading_digits_are_used() {
    let mut rig = Rig::booted();
    rig.start_session(b"40%", b"90s");

    assert_eq!(rig.app.session().intensity_percent, 40);
    assert_eq!(rig.app.session().target_time_secs, 90);
    assert_eq!(rig.app.state(), StateId::Active);
}

#[test]
fn intensity_above_hundred_is_clamped() {
    let mut rig = Rig::booted();
    rig.link.write(AttributeId::Intensity, b"250");
    rig.poll();
    assert_eq!(rig.app.session().intensity_percent, 100);
}

#[test]
fn padded_write_is_normalised_on_next_sync() {
    let mut rig = Rig::booted();
    rig.start_session(b"040", b"0300");
    assert_eq!(rig.value(AttributeId::TargetTime), "0300");

    rig.step(1_000);
    assert_eq!(rig.value(AttributeId::TargetTime), "300");
    assert_eq!(rig.value(AttributeId::Intensity), "40");
}

#[test]
fn user_id_write_triggers_immediate_resync() {
    let mut rig = Rig::booted();
    rig.link.write(AttributeId::UserId, b"patient-7");
    rig.poll();

    assert_eq!(rig.app.session().user_id.as_str(), "patient-7");
    assert_eq!(rig.value(AttributeId::UserId), "patient-7");
    // The boot defaults are replaced by the session values right away.
    assert_eq!(rig.value(AttributeId::TargetTime), "0");
    assert_eq!(rig.value(AttributeId::Intensity), "0");
    assert_eq!(rig.app.state(), StateId::Inactive);
}

#[test]
fn client_timestamp_write_is_stored_without_starting() {
    let mut rig = Rig::booted();
    rig.link
        .write(AttributeId::ClientTimestamp, b"2025-03-05T10:00:00");
    rig.poll();

    assert_eq!(
        rig.app.session().client_timestamp.as_str(),
        "2025-03-05T10:00:00"
    );
    assert_eq!(rig.app.state(), StateId::Inactive);
}

#[test]
fn passthrough_write_during_session_keeps_it_running() {
    let mut rig = Rig::booted();
    rig.start_session(b"40", b"60");
    rig.run_secs(2);

    rig.link.write(AttributeId::UserId, b"someone-else");
    rig.poll();

    assert_eq!(rig.app.state(), StateId::Active);
    assert_eq!(rig.app.session().elapsed_secs, 2);
}

#[test]
fn oversize_text_is_rejected_and_leaves_value() {
    let mut rig = Rig::booted();
    rig.link
        .write(AttributeId::ClientTimestamp, b"2025-03-05T10:00:00.000Z");
    rig.poll();

    assert_eq!(
        rejections(&rig),
        vec![(AttributeId::ClientTimestamp, AttributeError::PayloadTooLong)]
    );
    assert_eq!(rig.value(AttributeId::ClientTimestamp), "03-05-2025T00:00:00");
}

#[test]
fn invalid_utf8_user_id_is_rejected() {
    let mut rig = Rig::booted();
    rig.link.write(AttributeId::UserId, &[0xff, 0xfe, 0xfd]);
    rig.poll();

    assert_eq!(
        rejections(&rig),
        vec![(AttributeId::UserId, AttributeError::InvalidUtf8)]
    );
    assert_eq!(rig.app.session().user_id.as_str(), "CJ_02");
}

#[test]
fn writes_to_read_only_attributes_are_rejected() {
    let mut rig = Rig::booted();
    rig.link.write(AttributeId::Status, b"Active");
    rig.link.write(AttributeId::Battery, b"5");
    rig.poll();

    assert_eq!(
        rejections(&rig),
        vec![
            (AttributeId::Status, AttributeError::NotWritable),
            (AttributeId::Battery, AttributeError::NotWritable),
        ]
    );
    assert_eq!(rig.app.state(), StateId::Inactive);
    assert_eq!(rig.value(AttributeId::Battery), "100");
}

/// Service booted on the simulated BLE link, so assertions can check what a
/// central would actually read.
struct SimRig {
    app: AppService,
    link: BleLink,
    clock: ManualClock,
    delay: RecordingDelay,
    sink: LogSink,
}

impl SimRig {
    fn booted() -> Self {
        let mut rig = Self {
            app: AppService::new(SystemConfig::default()),
            link: BleLink::new(),
            clock: ManualClock::default(),
            delay: RecordingDelay::default(),
            sink: LogSink::default(),
        };
        rig.app
            .boot(&mut rig.link, &rig.clock, &mut rig.sink)
            .expect("boot");
        rig.link.on_central_connected();
        rig
    }

    fn step(&mut self, ms: u64) {
        self.clock.advance(ms);
        self.app
            .poll(&mut self.link, &self.clock, &mut self.delay, &mut self.sink);
    }

    fn read(&self, attr: AttributeId) -> String {
        String::from_utf8_lossy(self.link.read_value(attr)).into_owned()
    }
}

#[test]
fn accepted_user_id_is_readable_over_the_link() {
    let mut rig = SimRig::booted();
    assert!(rig.link.inject_write(CHAR_USER_ID, b"patient-7"));
    rig.step(0);
    rig.step(2_000);

    assert_eq!(rig.app.registry().value(AttributeId::UserId), b"patient-7");
    assert_eq!(rig.read(AttributeId::UserId), "patient-7");
}

#[test]
fn accepted_writes_are_mirrored_before_normalising() {
    let mut rig = Rig::booted();
    rig.link.write(AttributeId::ClientTimestamp, b"2025-03-05T10:00");
    rig.poll();

    let mirrored: Vec<_> = rig
        .link
        .published
        .iter()
        .filter(|p| p.attr == AttributeId::ClientTimestamp)
        .map(|p| (p.value.clone(), p.notify))
        .collect();
    assert_eq!(mirrored, vec![(b"2025-03-05T10:00".to_vec(), false)]);
}

#[test]
fn rejected_utf8_is_not_left_readable_on_the_link() {
    let mut rig = SimRig::booted();
    assert!(rig.link.inject_write(CHAR_USER_ID, &[0xc3, 0x28]));
    rig.step(0);

    assert_eq!(rig.read(AttributeId::UserId), "CJ_02");
    rig.step(2_000);
    assert_eq!(rig.read(AttributeId::UserId), "CJ_02");
}

#[test]
fn intensity_write_is_readable_over_the_link() {
    let mut rig = SimRig::booted();
    assert!(rig.link.inject_write(CHAR_INTENSITY, b"40"));
    rig.step(0);
    rig.step(1_000);

    assert_eq!(rig.read(AttributeId::Intensity), "40");
}
