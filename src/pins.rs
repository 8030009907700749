//! GPIO / peripheral pin assignments for the therapy module board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// On-board status LED (active HIGH).  Lit while a session is active.
pub const STATUS_LED_GPIO: i32 = 2;
