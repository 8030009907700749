//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (radio link, clock, event sinks) implement these traits.
//! The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::SystemConfig;
use crate::error::LinkError;
use crate::gatt::attributes::{AttributeId, Group};

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: system timer → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Injected so tests control time.
pub trait ClockPort {
    /// Milliseconds since boot.  Never goes backwards.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Notify port (driven adapter: domain → attribute server)
// ───────────────────────────────────────────────────────────────

/// Write side of the attribute server.
pub trait NotifyPort {
    /// Store `value` as the readable value of `attr`.  When `notify` is set,
    /// also signal subscribed peers.
    fn publish(&mut self, attr: AttributeId, value: &[u8], notify: bool);

    /// Whether [`publish`](Self::publish) delivers a notification even when
    /// the value equals the previous one.  Stacks that suppress identical
    /// values need the bump-then-set workaround instead.
    fn supports_forced_notify(&self) -> bool {
        false
    }
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: radio ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Largest inbound write the link adapters buffer.  Anything longer than an
/// attribute's own maximum is still carried far enough to be rejected.
pub const MAX_WRITE_LEN: usize = 64;

/// A remote write, queued by the link adapter and drained by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundWrite {
    pub attr: AttributeId,
    pub payload: heapless::Vec<u8, MAX_WRITE_LEN>,
}

impl InboundWrite {
    /// Copy `data`, clipping at [`MAX_WRITE_LEN`].
    pub fn new(attr: AttributeId, data: &[u8]) -> Self {
        let len = data.len().min(MAX_WRITE_LEN);
        let mut payload = heapless::Vec::new();
        // `len` is clipped to capacity above.
        let _ = payload.extend_from_slice(&data[..len]);
        Self { attr, payload }
    }
}

/// Low-energy peripheral link: GATT server plus advertising.
pub trait LinkPort: NotifyPort {
    /// Bring up the stack and register every attribute of `groups`.
    fn begin(&mut self, config: &SystemConfig, groups: &[Group]) -> Result<(), LinkError>;

    /// Start (or restart) connectable advertising.
    fn advertise(&mut self) -> Result<(), LinkError>;

    /// Next queued remote write, if any.
    fn poll_write(&mut self) -> Option<InboundWrite>;

    /// Whether a central is connected.
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
