//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the session FSM, the attribute registry and the
//! device info state.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!   LinkPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │          AppService          │
//!  ClockPort ──▶ │  FSM · Registry · DeviceInfo │ ──▶ NotifyPort
//!                └──────────────────────────────┘
//! ```
//!
//! One call to [`AppService::poll`] is one iteration of the cooperative
//! main loop:
//!
//! 1. drain queued remote writes (each applied synchronously)
//! 2. session tick (elapsed / target check, status resync)
//! 3. battery step, if due
//! 4. full Therapy Control re-sync plus telemetry, if due

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::device_info::DeviceInfo;
use crate::error::Result;
use crate::fsm::context::{FsmContext, StopReason, TherapySession};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::gatt::attributes::{AttributeId, Group};
use crate::gatt::codec;
use crate::gatt::registry::AttributeRegistry;
use crate::sync::SyncDriver;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ClockPort, EventSink, LinkPort, NotifyPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    fsm: Fsm,
    ctx: FsmContext,
    registry: AttributeRegistry,
    device: DeviceInfo,
    sync: SyncDriver,
    booted: bool,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the link; call [`boot`](Self::boot) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(&config);
        let registry = AttributeRegistry::new(&config);
        let device = DeviceInfo::from_config(&config);
        let sync = SyncDriver::new(&config);
        let fsm = Fsm::new(build_state_table(), StateId::Inactive);

        Self {
            config,
            fsm,
            ctx,
            registry,
            device,
            sync,
            booted: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the device up: register both attribute groups, install write
    /// handlers, publish identity, then start advertising.
    ///
    /// A link error here is fatal; the caller is expected to halt.
    pub fn boot(
        &mut self,
        link: &mut impl LinkPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.config.validate()?;

        link.begin(&self.config, &Group::ALL)?;
        self.registry.publish_all(link);
        self.subscribe_writes()?;
        self.device.publish_identity(&mut self.registry, link);

        let now = clock.now_ms();
        self.ctx.now_ms = now;
        self.fsm.start(&mut self.ctx);
        self.sync.start(now);

        link.advertise()?;
        self.booted = true;

        info!(
            "START | {} advertising, state={:?}",
            self.config.device_name,
            self.fsm.current_state()
        );
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        Ok(())
    }

    fn subscribe_writes(&mut self) -> Result<()> {
        self.registry.subscribe(AttributeId::Intensity, |raw| {
            Some(AppCommand::SetIntensity(codec::decode_percent(raw)))
        })?;
        self.registry.subscribe(AttributeId::TargetTime, |raw| {
            Some(AppCommand::SetTargetTime(codec::decode_uint(raw)))
        })?;
        self.registry.subscribe(AttributeId::ClientTimestamp, |raw| {
            codec::decode_text(raw).ok().map(AppCommand::SetClientTimestamp)
        })?;
        self.registry.subscribe(AttributeId::UserId, |raw| {
            codec::decode_text(raw).ok().map(AppCommand::SetUserId)
        })?;
        Ok(())
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one iteration of the main loop.  No-op before [`boot`](Self::boot).
    pub fn poll(
        &mut self,
        link: &mut impl LinkPort,
        clock: &impl ClockPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        if !self.booted {
            return;
        }

        while let Some(write) = link.poll_write() {
            self.handle_write(write.attr, &write.payload, clock.now_ms(), link, delay, sink);
        }

        let now = clock.now_ms();
        let due = self.sync.due(now);

        self.tick_session(now, link, delay, sink);

        if due.battery {
            let level = self.device.tick_battery();
            self.device.publish_battery(&mut self.registry, link);
            sink.emit(&AppEvent::BatteryLevel(level));
        }

        if due.therapy_sync {
            self.sync_therapy(link);
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    /// Session self-transition: advance elapsed time, end the session on
    /// target, and resync status if the stored value drifted.
    fn tick_session(
        &mut self,
        now_ms: u64,
        link: &mut impl NotifyPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        self.fsm.evaluate(&mut self.ctx);
        self.apply_requests(link, delay, sink);

        self.registry.push(
            AttributeId::ElapsedTime,
            &codec::encode_uint(self.ctx.session.elapsed_secs),
            link,
        );
        self.registry.push(
            AttributeId::Status,
            self.fsm.current_state().status_text().as_bytes(),
            link,
        );
    }

    // ── Inbound writes & commands ─────────────────────────────

    /// Apply one remote write.  Rejected writes are reported and dropped.
    pub fn handle_write(
        &mut self,
        attr: AttributeId,
        raw: &[u8],
        now_ms: u64,
        link: &mut impl NotifyPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        match self.registry.handle_write(attr, raw, link) {
            Ok(Some(cmd)) => self.handle_command(cmd, now_ms, link, delay, sink),
            Ok(None) => {}
            Err(error) => {
                warn!("WRITE | {:?} rejected: {}", attr, error);
                sink.emit(&AppEvent::WriteRejected { attr, error });
            }
        }
    }

    /// Process a single inbound command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        link: &mut impl NotifyPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetIntensity(percent) => {
                info!("WRITE | intensity={}%", percent);
                self.ctx.session.intensity_percent = percent;
                self.evaluate(now_ms, link, delay, sink);
            }
            AppCommand::SetTargetTime(secs) => {
                info!("WRITE | target_time={}s", secs);
                self.ctx.session.target_time_secs = secs;
                self.evaluate(now_ms, link, delay, sink);
            }
            AppCommand::SetClientTimestamp(ts) => {
                info!("WRITE | client_timestamp={}", ts);
                self.ctx.session.client_timestamp = ts;
                self.sync_therapy(link);
            }
            AppCommand::SetUserId(id) => {
                info!("WRITE | user_id={}", id);
                self.ctx.session.user_id = id;
                self.sync_therapy(link);
            }
            AppCommand::StopSession => self.stop_session(now_ms, link, delay, sink),
        }
    }

    /// End the active session immediately.  Ignored while inactive.
    pub fn stop_session(
        &mut self,
        now_ms: u64,
        link: &mut impl NotifyPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        if self.fsm.current_state() != StateId::Active {
            return;
        }
        self.ctx.now_ms = now_ms;
        self.ctx.stop_reason = Some(StopReason::Requested);
        self.fsm.force_transition(StateId::Inactive, &mut self.ctx);
        self.apply_requests(link, delay, sink);
    }

    /// Check the start condition right away instead of on the next tick.
    fn evaluate(
        &mut self,
        now_ms: u64,
        link: &mut impl NotifyPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        self.fsm.evaluate(&mut self.ctx);
        self.apply_requests(link, delay, sink);
    }

    // ── Publishing ────────────────────────────────────────────

    fn apply_requests(
        &mut self,
        link: &mut impl NotifyPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        let req = self.ctx.take_requests();

        if let Some(reason) = req.stopped {
            self.publish_stop(link, delay);
            sink.emit(&AppEvent::SessionStopped {
                reason,
                elapsed_secs: req.final_elapsed_secs,
            });
        }

        if req.started {
            self.registry
                .push(AttributeId::ElapsedTime, &codec::encode_uint(0), link);
            self.registry.push(
                AttributeId::Status,
                StateId::Active.status_text().as_bytes(),
                link,
            );
            sink.emit(&AppEvent::SessionStarted {
                intensity_percent: self.ctx.session.intensity_percent,
                target_time_secs: self.ctx.session.target_time_secs,
            });
        }
    }

    /// Stop sequence: re-announce zero intensity and target (bumped so the
    /// observer is notified even if they already read 0), then elapsed and
    /// status.
    fn publish_stop(&mut self, link: &mut impl NotifyPort, delay: &mut impl DelayNs) {
        let zero_percent = codec::encode_u8(0);
        let zero = codec::encode_uint(0);

        self.registry.bump_then_set(
            &[
                (AttributeId::Intensity, zero_percent.as_slice()),
                (AttributeId::TargetTime, zero.as_slice()),
            ],
            self.config.bump_pause_ms,
            link,
            delay,
        );
        self.registry.push(AttributeId::ElapsedTime, &zero, link);
        self.registry.push(
            AttributeId::Status,
            StateId::Inactive.status_text().as_bytes(),
            link,
        );
    }

    /// Push every Therapy Control attribute from the session.  Idempotent:
    /// unchanged values produce no notifications.
    fn sync_therapy(&mut self, link: &mut impl NotifyPort) {
        let session = &self.ctx.session;
        let registry = &mut self.registry;

        registry.push(
            AttributeId::ElapsedTime,
            &codec::encode_uint(session.elapsed_secs),
            link,
        );
        registry.push(
            AttributeId::TargetTime,
            &codec::encode_uint(session.target_time_secs),
            link,
        );
        registry.push(
            AttributeId::Intensity,
            &codec::encode_u8(session.intensity_percent),
            link,
        );
        registry.push(
            AttributeId::ClientTimestamp,
            session.client_timestamp.as_bytes(),
            link,
        );
        registry.push(AttributeId::UserId, session.user_id.as_bytes(), link);
        registry.push(
            AttributeId::Status,
            self.fsm.current_state().status_text().as_bytes(),
            link,
        );
    }

    fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            elapsed_secs: self.ctx.session.elapsed_secs,
            target_time_secs: self.ctx.session.target_time_secs,
            intensity_percent: self.ctx.session.intensity_percent,
            battery_percent: self.device.battery_percent(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_session_active(&self) -> bool {
        self.fsm.current_state() == StateId::Active
    }

    pub fn session(&self) -> &TherapySession {
        &self.ctx.session
    }

    pub fn battery_percent(&self) -> u8 {
        self.device.battery_percent()
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }
}
