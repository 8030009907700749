//! Attribute registry: stored values, write handlers and change-gated push.
//!
//! The registry is the firmware's view of every attribute value.  The link
//! adapter mirrors it for remote reads; the registry decides when a value
//! change must also be notified.
//!
//! Notifications are suppressed when a pushed value equals the stored one,
//! which matches how most BLE stacks behave.  [`AttributeRegistry::bump_then_set`]
//! works around that for values that must be re-announced even when
//! unchanged (e.g. "0" after a stop).

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::app::commands::AppCommand;
use crate::app::ports::NotifyPort;
use crate::config::SystemConfig;
use crate::error::AttributeError;
use crate::gatt::attributes::{AttributeId, Encoding, Payload};
use crate::gatt::codec;

/// Handler invoked with the raw bytes of an accepted write.
pub type WriteHandler = Box<dyn FnMut(&[u8]) -> Option<AppCommand>>;

/// Owns the stored value and optional write handler of every attribute.
pub struct AttributeRegistry {
    values: [Payload; AttributeId::COUNT],
    handlers: [Option<WriteHandler>; AttributeId::COUNT],
    notify_count: u32,
}

fn payload(bytes: &[u8]) -> Payload {
    let mut p = Payload::new();
    // Callers pass encoder output or text bounded by the attribute table.
    let _ = p.extend_from_slice(&bytes[..bytes.len().min(p.capacity())]);
    p
}

impl AttributeRegistry {
    /// Registry seeded with the boot-time attribute values.
    pub fn new(config: &SystemConfig) -> Self {
        let mut values: [Payload; AttributeId::COUNT] = core::array::from_fn(|_| Payload::new());

        let mut set = |id: AttributeId, bytes: &[u8]| values[id.index()] = payload(bytes);
        set(AttributeId::ElapsedTime, &codec::encode_uint(0));
        set(
            AttributeId::Intensity,
            &codec::encode_u8(config.default_intensity_percent),
        );
        set(
            AttributeId::TargetTime,
            &codec::encode_uint(config.default_target_time_secs),
        );
        set(AttributeId::Status, crate::fsm::StateId::Inactive.status_text().as_bytes());
        set(
            AttributeId::ClientTimestamp,
            config.default_client_timestamp.as_bytes(),
        );
        set(AttributeId::UserId, config.default_user_id.as_bytes());
        set(AttributeId::DeviceId, config.device_id.as_bytes());
        set(AttributeId::LocationId, &codec::encode_u8(config.location_id));
        set(
            AttributeId::Battery,
            &codec::encode_u8(config.initial_battery_percent),
        );
        set(
            AttributeId::FirmwareVersion,
            config.firmware_version.as_bytes(),
        );

        Self {
            values,
            handlers: core::array::from_fn(|_| None),
            notify_count: 0,
        }
    }

    /// Current stored value.
    pub fn value(&self, id: AttributeId) -> &[u8] {
        &self.values[id.index()]
    }

    /// Number of notifications sent since boot.
    pub fn notify_count(&self) -> u32 {
        self.notify_count
    }

    /// Install the write handler for `id`, replacing any previous one.
    pub fn subscribe(
        &mut self,
        id: AttributeId,
        handler: impl FnMut(&[u8]) -> Option<AppCommand> + 'static,
    ) -> Result<(), AttributeError> {
        if !id.spec().direction.writable() {
            return Err(AttributeError::NotWritable);
        }
        self.handlers[id.index()] = Some(Box::new(handler));
        Ok(())
    }

    /// Validate and store a remote write, mirror it to `link`, then run its
    /// handler.
    ///
    /// A rejected write leaves the stored value untouched and republishes it,
    /// since the link may already hold the rejected bytes.
    pub fn handle_write(
        &mut self,
        id: AttributeId,
        raw: &[u8],
        link: &mut impl NotifyPort,
    ) -> Result<Option<AppCommand>, AttributeError> {
        if let Err(error) = Self::check_write(id, raw) {
            link.publish(id, self.value(id), false);
            return Err(error);
        }

        self.values[id.index()] = payload(raw);
        link.publish(id, raw, false);
        debug!("WRITE | {:?} <- {} bytes", id, raw.len());

        Ok(self.handlers[id.index()]
            .as_mut()
            .and_then(|handler| handler(raw)))
    }

    fn check_write(id: AttributeId, raw: &[u8]) -> Result<(), AttributeError> {
        let spec = id.spec();
        if !spec.direction.writable() {
            return Err(AttributeError::NotWritable);
        }
        if raw.len() > spec.max_len {
            return Err(AttributeError::PayloadTooLong);
        }
        if spec.encoding == Encoding::Text && core::str::from_utf8(raw).is_err() {
            return Err(AttributeError::InvalidUtf8);
        }
        Ok(())
    }

    /// Store `value` and, if it differs from the stored one, publish it.
    ///
    /// Returns whether the value changed.
    pub fn push(&mut self, id: AttributeId, value: &[u8], link: &mut impl NotifyPort) -> bool {
        let spec = id.spec();
        if value.len() > spec.max_len {
            warn!("push to {:?} dropped: {} bytes > {}", id, value.len(), spec.max_len);
            return false;
        }
        if self.values[id.index()].as_slice() == value {
            return false;
        }

        self.values[id.index()] = payload(value);
        let notify = spec.direction.notifiable();
        if notify {
            self.notify_count = self.notify_count.wrapping_add(1);
        }
        link.publish(id, value, notify);
        true
    }

    /// Store and publish `value` with a notification even if unchanged.
    /// Only meaningful on links where [`NotifyPort::supports_forced_notify`].
    pub fn push_forced(&mut self, id: AttributeId, value: &[u8], link: &mut impl NotifyPort) {
        let spec = id.spec();
        if value.len() > spec.max_len {
            warn!("push to {:?} dropped: {} bytes > {}", id, value.len(), spec.max_len);
            return;
        }
        self.values[id.index()] = payload(value);
        let notify = spec.direction.notifiable();
        if notify {
            self.notify_count = self.notify_count.wrapping_add(1);
        }
        link.publish(id, value, notify);
    }

    /// Publish `targets` so that every one of them produces a notification.
    ///
    /// Without forced notify, each attribute is first pushed a transient
    /// value distinct from both its stored and its final one, then after
    /// `pause_ms` the final value.  The observer sees two changes and ends on
    /// the real value.
    pub fn bump_then_set(
        &mut self,
        targets: &[(AttributeId, &[u8])],
        pause_ms: u32,
        link: &mut impl NotifyPort,
        delay: &mut impl DelayNs,
    ) {
        if link.supports_forced_notify() {
            for &(id, value) in targets {
                self.push_forced(id, value, link);
            }
            return;
        }

        for &(id, value) in targets {
            let transient = bump_value(self.value(id), value);
            self.push(id, transient, link);
        }
        delay.delay_ms(pause_ms);
        for &(id, value) in targets {
            self.push(id, value, link);
        }
    }

    /// Publish every stored value without notifying.  Used once the link
    /// has registered its attributes so remote reads see boot values.
    pub fn publish_all(&self, link: &mut impl NotifyPort) {
        for id in AttributeId::ALL {
            link.publish(id, self.value(id), false);
        }
    }
}

/// First of "1", "2", "3" equal to neither `stored` nor `target`.
fn bump_value(stored: &[u8], target: &[u8]) -> &'static [u8] {
    const CANDIDATES: [&[u8]; 3] = [b"1", b"2", b"3"];
    CANDIDATES
        .into_iter()
        .find(|c| *c != stored && *c != target)
        .unwrap_or(b"1")
}
