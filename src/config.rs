//! System configuration parameters
//!
//! All tunable parameters for the therapy module. Every value is a
//! compile-time default: nothing is persisted, so each boot starts from
//! [`SystemConfig::default()`].

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::gatt::attributes::{
    CLIENT_TIMESTAMP_MAX_LEN, DEVICE_ID_MAX_LEN, FIRMWARE_VERSION_MAX_LEN, USER_ID_MAX_LEN,
};

/// Highest value accepted by percentage fields (intensity, battery).
pub const PERCENT_MAX: u8 = 100;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// GAP device name / advertised local name.
    pub device_name: heapless::String<32>,
    /// Device identifier exposed on the Device Info group.
    pub device_id: heapless::String<DEVICE_ID_MAX_LEN>,
    /// Installation location identifier.
    pub location_id: u8,
    /// Firmware version string exposed on the Device Info group.
    pub firmware_version: heapless::String<FIRMWARE_VERSION_MAX_LEN>,

    // --- Attribute defaults ---
    /// Advertised intensity before the first therapy sync (0-100%).
    pub default_intensity_percent: u8,
    /// Advertised target time before the first therapy sync (seconds).
    pub default_target_time_secs: u32,
    /// Initial client timestamp passthrough value.
    pub default_client_timestamp: heapless::String<CLIENT_TIMESTAMP_MAX_LEN>,
    /// Initial user id passthrough value.
    pub default_user_id: heapless::String<USER_ID_MAX_LEN>,
    /// Battery level at boot (0-100%).
    pub initial_battery_percent: u8,

    // --- Timing ---
    /// Full Therapy Control re-sync interval (milliseconds)
    pub therapy_sync_interval_ms: u32,
    /// Battery decrement interval (milliseconds)
    pub battery_interval_ms: u32,
    /// Pause between the two halves of a bump-then-set push (milliseconds)
    pub bump_pause_ms: u32,

    // --- Link ---
    /// Preferred connection interval in 1.25 ms units (0x0018 = 30 ms).
    pub conn_interval_units: u16,
    /// Link supervision timeout in 10 ms units (500 = 5 s).
    pub supervision_timeout_units: u16,
}

fn text<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    // Defaults are compile-time literals sized to fit.
    let _ = out.push_str(s);
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_name: text("LM Health Physical"),
            device_id: text("TMP-001"),
            location_id: 1,
            firmware_version: text("1.0.0"),

            // Attribute defaults
            default_intensity_percent: 50,
            default_target_time_secs: 300, // 5 minutes
            default_client_timestamp: text("03-05-2025T00:00:00"),
            default_user_id: text("CJ_02"),
            initial_battery_percent: PERCENT_MAX,

            // Timing
            therapy_sync_interval_ms: 1000, // 1 Hz
            battery_interval_ms: 5000,      // 1 step / 5 s
            bump_pause_ms: 10,

            // Link
            conn_interval_units: 0x0018,
            supervision_timeout_units: 500,
        }
    }
}

impl SystemConfig {
    /// Reject values the firmware cannot run with.
    ///
    /// Returns [`Error::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.device_name.is_empty() {
            return Err(Error::Config("device_name is empty"));
        }
        if self.default_intensity_percent > PERCENT_MAX {
            return Err(Error::Config("default_intensity_percent above 100"));
        }
        if self.initial_battery_percent > PERCENT_MAX {
            return Err(Error::Config("initial_battery_percent above 100"));
        }
        if self.default_target_time_secs > crate::gatt::codec::UINT_MAX_ENCODED {
            return Err(Error::Config("default_target_time_secs exceeds 6 digits"));
        }
        if self.therapy_sync_interval_ms == 0 || self.battery_interval_ms == 0 {
            return Err(Error::Config("sync intervals must be non-zero"));
        }
        // The bump pause runs inside the link service loop.
        if self.bump_pause_ms > 100 {
            return Err(Error::Config("bump_pause_ms above 100"));
        }
        Ok(())
    }
}
