//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, forward over a
//! debug channel, etc.

use serde::Serialize;

use crate::error::AttributeError;
use crate::fsm::StateId;
use crate::fsm::context::StopReason;
use crate::gatt::attributes::AttributeId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot (one per therapy sync).
    Telemetry(TelemetryData),

    /// A session started.
    SessionStarted { intensity_percent: u8, target_time_secs: u32 },

    /// A session ended and the stop sequence was published.
    SessionStopped { reason: StopReason, elapsed_secs: u32 },

    /// An inbound write was refused and left no trace on the session.
    WriteRejected { attr: AttributeId, error: AttributeError },

    /// The battery level stepped.
    BatteryLevel(u8),

    /// The application service has booted (carries initial state).
    Started(StateId),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryData {
    pub state: StateId,
    pub elapsed_secs: u32,
    pub target_time_secs: u32,
    pub intensity_percent: u8,
    pub battery_percent: u8,
}
