//! Mock adapters for integration tests.
//!
//! Records every publish so tests can assert on the full notification
//! history without a radio, and drives time by hand.

use std::cell::Cell;
use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use lmtherapy::app::events::AppEvent;
use lmtherapy::app::ports::{ClockPort, EventSink, InboundWrite, LinkPort, NotifyPort};
use lmtherapy::app::service::AppService;
use lmtherapy::config::SystemConfig;
use lmtherapy::error::LinkError;
use lmtherapy::gatt::attributes::{AttributeId, Group};

// ── Publish record ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub attr: AttributeId,
    pub value: Vec<u8>,
    pub notify: bool,
}

// ── MockLink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLink {
    pub begun_groups: Vec<Group>,
    pub begin_calls: u32,
    pub advertise_calls: u32,
    pub fail_begin: Option<LinkError>,
    pub forced: bool,
    pub connected: bool,
    pub inbound: VecDeque<InboundWrite>,
    pub published: Vec<Published>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Queue a remote write.
    pub fn write(&mut self, attr: AttributeId, data: &[u8]) {
        self.inbound.push_back(InboundWrite::new(attr, data));
    }

    /// Values notified on `attr`, oldest first.
    pub fn notified(&self, attr: AttributeId) -> Vec<String> {
        self.published
            .iter()
            .filter(|p| p.attr == attr && p.notify)
            .map(|p| String::from_utf8_lossy(&p.value).into_owned())
            .collect()
    }

    pub fn notification_count(&self) -> usize {
        self.published.iter().filter(|p| p.notify).count()
    }

    pub fn clear(&mut self) {
        self.published.clear();
    }
}

impl NotifyPort for MockLink {
    fn publish(&mut self, attr: AttributeId, value: &[u8], notify: bool) {
        self.published.push(Published {
            attr,
            value: value.to_vec(),
            notify,
        });
    }

    fn supports_forced_notify(&self) -> bool {
        self.forced
    }
}

impl LinkPort for MockLink {
    fn begin(&mut self, _config: &SystemConfig, groups: &[Group]) -> Result<(), LinkError> {
        self.begin_calls += 1;
        if let Some(e) = self.fail_begin {
            return Err(e);
        }
        self.begun_groups = groups.to_vec();
        Ok(())
    }

    fn advertise(&mut self) -> Result<(), LinkError> {
        self.advertise_calls += 1;
        Ok(())
    }

    fn poll_write(&mut self) -> Option<InboundWrite> {
        self.inbound.pop_front()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── RecordingDelay ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

#[allow(dead_code)]
impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// ── LogSink ───────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A booted service wired to mock adapters.
pub struct Rig {
    pub app: AppService,
    pub link: MockLink,
    pub clock: ManualClock,
    pub delay: RecordingDelay,
    pub sink: LogSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn booted() -> Self {
        Self::booted_with(SystemConfig::default(), MockLink::new())
    }

    pub fn booted_with(config: SystemConfig, link: MockLink) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            link,
            clock: ManualClock::default(),
            delay: RecordingDelay::default(),
            sink: LogSink::default(),
        };
        rig.app
            .boot(&mut rig.link, &rig.clock, &mut rig.sink)
            .expect("boot");
        rig.link.clear();
        rig.sink.events.clear();
        rig
    }

    pub fn poll(&mut self) {
        self.app
            .poll(&mut self.link, &self.clock, &mut self.delay, &mut self.sink);
    }

    /// Advance the clock and poll once.
    pub fn step(&mut self, ms: u64) {
        self.clock.advance(ms);
        self.poll();
    }

    /// Advance in whole seconds, polling after each.
    pub fn run_secs(&mut self, secs: u64) {
        for _ in 0..secs {
            self.step(1_000);
        }
    }

    /// Write intensity and target, then poll to apply.
    pub fn start_session(&mut self, intensity: &[u8], target: &[u8]) {
        self.link.write(AttributeId::Intensity, intensity);
        self.link.write(AttributeId::TargetTime, target);
        self.poll();
    }

    pub fn value(&self, attr: AttributeId) -> String {
        String::from_utf8_lossy(self.app.registry().value(attr)).into_owned()
    }
}
