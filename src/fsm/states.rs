//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  INACTIVE ──[intensity > 0 && target > 0]──▶ ACTIVE
//!     ▲                                           │
//!     └─────[elapsed >= target  |  stop]──────────┘
//! ```

use super::context::{FsmContext, StopReason};
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Inactive
        StateDescriptor {
            id: StateId::Inactive,
            name: "Inactive",
            on_enter: Some(inactive_enter),
            on_exit: None,
            on_update: inactive_update,
        },
        // Index 1: Active
        StateDescriptor {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: Some(active_exit),
            on_update: active_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  INACTIVE state
// ═══════════════════════════════════════════════════════════════════════════

fn inactive_enter(ctx: &mut FsmContext) {
    ctx.session.elapsed_secs = 0;
}

fn inactive_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.session.elapsed_secs = 0;

    if ctx.session.is_configured() {
        return Some(StateId::Active);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE state (session timer running)
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    ctx.session_start_ms = ctx.now_ms;
    ctx.session.elapsed_secs = 0;
    ctx.stop_reason = None;
    ctx.requests.started = true;
    info!(
        "ACTIVE: intensity {}% for {}s",
        ctx.session.intensity_percent, ctx.session.target_time_secs
    );
}

fn active_exit(ctx: &mut FsmContext) {
    let reason = ctx.stop_reason.take().unwrap_or(StopReason::Requested);
    ctx.requests.stopped = Some(reason);
    ctx.requests.final_elapsed_secs = ctx.secs_since_start();

    ctx.session.intensity_percent = 0;
    ctx.session.target_time_secs = 0;
    ctx.session.elapsed_secs = 0;
    info!(
        "ACTIVE: session ended ({:?}) after {}s",
        reason, ctx.requests.final_elapsed_secs
    );
}

fn active_update(ctx: &mut FsmContext) -> Option<StateId> {
    let elapsed = ctx.secs_since_start();

    if elapsed >= ctx.session.target_time_secs {
        // The wire value never passes the target.
        ctx.session.elapsed_secs = ctx.session.target_time_secs;
        ctx.stop_reason = Some(StopReason::TargetReached);
        return Some(StateId::Inactive);
    }

    ctx.session.elapsed_secs = elapsed;
    None
}
