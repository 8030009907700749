//! Device Info group upkeep: static identity plus the simulated battery.
//!
//! There is no fuel gauge on the board.  The battery level counts down one
//! percent per battery interval and wraps from 0 back to 100 so the remote
//! side always sees a moving value.

use log::info;

use crate::app::ports::NotifyPort;
use crate::config::{PERCENT_MAX, SystemConfig};
use crate::gatt::attributes::{AttributeId, DEVICE_ID_MAX_LEN, FIRMWARE_VERSION_MAX_LEN};
use crate::gatt::codec;
use crate::gatt::registry::AttributeRegistry;

/// Identity and battery state of this unit.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    device_id: heapless::String<DEVICE_ID_MAX_LEN>,
    firmware_version: heapless::String<FIRMWARE_VERSION_MAX_LEN>,
    location_id: u8,
    battery_percent: u8,
}

impl DeviceInfo {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            device_id: config.device_id.clone(),
            firmware_version: config.firmware_version.clone(),
            location_id: config.location_id,
            battery_percent: config.initial_battery_percent.min(PERCENT_MAX),
        }
    }

    pub fn battery_percent(&self) -> u8 {
        self.battery_percent
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Step the battery down one percent, wrapping 0 → 100.
    pub fn tick_battery(&mut self) -> u8 {
        self.battery_percent = match self.battery_percent {
            0 => PERCENT_MAX,
            n => n - 1,
        };
        self.battery_percent
    }

    /// Push the static identity attributes.
    pub fn publish_identity(&self, registry: &mut AttributeRegistry, link: &mut impl NotifyPort) {
        registry.push(AttributeId::DeviceId, self.device_id.as_bytes(), link);
        registry.push(
            AttributeId::LocationId,
            &codec::encode_u8(self.location_id),
            link,
        );
        registry.push(
            AttributeId::FirmwareVersion,
            self.firmware_version.as_bytes(),
            link,
        );
        info!(
            "device {} (location {}) firmware {}",
            self.device_id, self.location_id, self.firmware_version
        );
    }

    /// Push the current battery level.
    pub fn publish_battery(&self, registry: &mut AttributeRegistry, link: &mut impl NotifyPort) {
        registry.push(
            AttributeId::Battery,
            &codec::encode_u8(self.battery_percent),
            link,
        );
    }
}
