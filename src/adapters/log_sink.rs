//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Telemetry is rendered as a single JSON line so a serial capture can be
//! fed straight into a parser.

use log::{info, warn};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Render telemetry as compact JSON.
pub fn telemetry_json(t: &TelemetryData) -> Result<String, serde_json::Error> {
    serde_json::to_string(t)
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match telemetry_json(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | serialise failed: {}", e),
            },
            AppEvent::SessionStarted {
                intensity_percent,
                target_time_secs,
            } => {
                info!(
                    "SESSION | started intensity={}% target={}s",
                    intensity_percent, target_time_secs
                );
            }
            AppEvent::SessionStopped {
                reason,
                elapsed_secs,
            } => {
                info!("SESSION | stopped ({:?}) after {}s", reason, elapsed_secs);
            }
            AppEvent::WriteRejected { attr, error } => {
                warn!("WRITE | {:?} rejected: {}", attr, error);
            }
            AppEvent::BatteryLevel(level) => {
                info!("BATTERY | {}%", level);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
