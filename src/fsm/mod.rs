//! Function-pointer finite state machine engine for the therapy session.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ StateId  │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Inactive │ fn(ctx)   │ —        │ fn(ctx)->Option<> │ │
//! │  │ Active   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  └──────────┴───────────┴──────────┴───────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each evaluation calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  Handlers only touch [`FsmContext`]; anything that
//! must reach the attribute registry is left in `ctx.requests` for the
//! service to publish.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Session status.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u8)]
pub enum StateId {
    Inactive = 0,
    Active = 1,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert a table index back to `StateId`.  Out-of-range indices fall
    /// back to `Inactive` (asserts in debug builds).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Inactive,
            1 => Self::Active,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Inactive
            }
        }
    }

    /// Text published on the status attribute.
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Active => "Active",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `evaluate()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Run the current state's `on_update` once.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    ///
    /// Called on every loop iteration and right after an inbound write.
    pub fn evaluate(&mut self, ctx: &mut FsmContext) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            if next_id as usize != self.current {
                self.transition(next_id, ctx);
            }
        }
    }

    /// Force an immediate transition (explicit stop request).
    /// No-op when already in `next`.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
