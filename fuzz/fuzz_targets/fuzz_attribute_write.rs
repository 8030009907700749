//! Fuzz target: `AppService::handle_write`
//!
//! Input is a sequence of `[selector, len, payload...]` records, each one a
//! remote write applied to a booted service while the clock advances.
//! Asserts that writes never panic, that the link always mirrors the
//! registry after a write, and that an active session respects its target.
//!
//! cargo fuzz run fuzz_attribute_write

#![no_main]

use embedded_hal::delay::DelayNs;
use libfuzzer_sys::fuzz_target;
use lmtherapy::app::events::AppEvent;
use lmtherapy::app::ports::{ClockPort, EventSink, InboundWrite, LinkPort, NotifyPort};
use lmtherapy::app::service::AppService;
use lmtherapy::config::SystemConfig;
use lmtherapy::error::LinkError;
use lmtherapy::gatt::attributes::{AttributeId, Group, Payload};

struct MirrorLink {
    values: [Payload; AttributeId::COUNT],
}

impl NotifyPort for MirrorLink {
    fn publish(&mut self, attr: AttributeId, value: &[u8], _notify: bool) {
        let slot = &mut self.values[attr.index()];
        slot.clear();
        let _ = slot.extend_from_slice(value);
    }
}

impl LinkPort for MirrorLink {
    fn begin(&mut self, _config: &SystemConfig, _groups: &[Group]) -> Result<(), LinkError> {
        Ok(())
    }

    fn advertise(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn poll_write(&mut self) -> Option<InboundWrite> {
        None
    }

    fn is_connected(&self) -> bool {
        true
    }
}

struct BootClock;

impl ClockPort for BootClock {
    fn now_ms(&self) -> u64 {
        0
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut app = AppService::new(SystemConfig::default());
    let mut link = MirrorLink {
        values: core::array::from_fn(|_| Payload::new()),
    };
    if app.boot(&mut link, &BootClock, &mut Discard).is_err() {
        return;
    }

    let mut now_ms = 0u64;
    let mut rest = data;
    while let [selector, len, tail @ ..] = rest {
        let id = AttributeId::ALL[usize::from(*selector) % AttributeId::COUNT];
        let take = usize::from(*len).min(tail.len());
        let (payload, next) = tail.split_at(take);
        rest = next;

        now_ms += u64::from(*selector) * 37;
        app.handle_write(id, payload, now_ms, &mut link, &mut NoDelay, &mut Discard);

        assert_eq!(link.values[id.index()].as_slice(), app.registry().value(id));
        let session = app.session();
        if app.is_session_active() {
            assert!(session.elapsed_secs < session.target_time_secs);
        } else {
            assert_eq!(session.elapsed_secs, 0);
        }
    }
});
