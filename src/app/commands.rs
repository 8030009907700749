//! Inbound commands to the application service.
//!
//! Attribute write handlers decode the raw payload and hand one of these
//! to the [`AppService`](super::service::AppService), which applies it to
//! the session synchronously.

use crate::gatt::attributes::{CLIENT_TIMESTAMP_MAX_LEN, USER_ID_MAX_LEN};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// New intensity (0-100%).  Starts a session if target time is also set.
    SetIntensity(u8),

    /// New target time (seconds).  Starts a session if intensity is also set.
    SetTargetTime(u32),

    /// Store the client timestamp and re-sync the therapy attributes.
    SetClientTimestamp(heapless::String<CLIENT_TIMESTAMP_MAX_LEN>),

    /// Store the user id and re-sync the therapy attributes.
    SetUserId(heapless::String<USER_ID_MAX_LEN>),

    /// End the active session now.  Ignored while inactive.
    StopSession,
}
