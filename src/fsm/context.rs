//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the therapy session, the latest monotonic time and
//! the publish requests that handlers leave for the service.  Think of it
//! as the "blackboard" in a blackboard architecture.

use crate::config::SystemConfig;
use crate::gatt::attributes::{CLIENT_TIMESTAMP_MAX_LEN, USER_ID_MAX_LEN};

// ---------------------------------------------------------------------------
// Therapy session (written by remote commands and state handlers)
// ---------------------------------------------------------------------------

/// The single in-progress (or idle) therapy session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TherapySession {
    /// Requested session length (seconds).  0 means "not set".
    pub target_time_secs: u32,
    /// Requested intensity (0-100%).  0 means "not set".
    pub intensity_percent: u8,
    /// Whole seconds since the session started.  Always 0 while inactive.
    pub elapsed_secs: u32,
    /// Opaque client-supplied timestamp, echoed back unchanged.
    pub client_timestamp: heapless::String<CLIENT_TIMESTAMP_MAX_LEN>,
    /// Opaque client-supplied user id, echoed back unchanged.
    pub user_id: heapless::String<USER_ID_MAX_LEN>,
}

impl TherapySession {
    /// Both start fields are set.
    pub fn is_configured(&self) -> bool {
        self.intensity_percent > 0 && self.target_time_secs > 0
    }
}

// ---------------------------------------------------------------------------
// Publish requests (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum StopReason {
    /// Elapsed time reached the target.
    TargetReached,
    /// Remote or local stop command.
    Requested,
}

/// Side effects a transition asks the service to publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRequests {
    /// A session just started: push the status.
    pub started: bool,
    /// A session just ended: run the stop sequence.
    pub stopped: Option<StopReason>,
    /// Actual session duration in whole seconds, which may exceed a target
    /// lowered mid-session.
    pub final_elapsed_secs: u32,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The blackboard passed to every FSM handler.
pub struct FsmContext {
    /// Current session values.
    pub session: TherapySession,
    /// Monotonic time of the current evaluation (milliseconds).
    pub now_ms: u64,
    /// Monotonic time the active session started (milliseconds).
    pub session_start_ms: u64,
    /// Reason for the next Active exit; set before the transition fires.
    pub stop_reason: Option<StopReason>,
    /// Pending publish requests.
    pub requests: SyncRequests,
}

impl FsmContext {
    /// Boot-time context.  Start fields begin unset regardless of the
    /// advertised defaults; passthrough fields take the configured values.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            session: TherapySession {
                client_timestamp: config.default_client_timestamp.clone(),
                user_id: config.default_user_id.clone(),
                ..TherapySession::default()
            },
            now_ms: 0,
            session_start_ms: 0,
            stop_reason: None,
            requests: SyncRequests::default(),
        }
    }

    /// Drain pending publish requests.
    pub fn take_requests(&mut self) -> SyncRequests {
        core::mem::take(&mut self.requests)
    }

    /// Whole seconds since the session started, saturating.
    pub fn secs_since_start(&self) -> u32 {
        let secs = self.now_ms.saturating_sub(self.session_start_ms) / 1000;
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}
