//! Periodic sync bookkeeping for the cooperative main loop.
//!
//! Two independent interval timers drive the periodic work:
//!
//! | Timer   | Default | Work                                   |
//! |---------|---------|----------------------------------------|
//! | therapy | 1 s     | full Therapy Control re-sync + telemetry |
//! | battery | 5 s     | battery step + push                    |
//!
//! The session tick itself runs on every loop iteration and is not gated
//! here.  A timer fires when at least its interval has passed since it last
//! fired; a late loop iteration fires it once, never twice.

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy)]
struct IntervalTimer {
    interval_ms: u64,
    last_ms: u64,
}

impl IntervalTimer {
    fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            last_ms: 0,
        }
    }

    fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Which periodic jobs are due on this iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncDue {
    pub therapy_sync: bool,
    pub battery: bool,
}

/// Tracks when each periodic job last ran.
#[derive(Debug, Clone)]
pub struct SyncDriver {
    therapy: IntervalTimer,
    battery: IntervalTimer,
}

impl SyncDriver {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            therapy: IntervalTimer::new(config.therapy_sync_interval_ms),
            battery: IntervalTimer::new(config.battery_interval_ms),
        }
    }

    /// Anchor both timers at `now_ms` (boot).
    pub fn start(&mut self, now_ms: u64) {
        self.therapy.last_ms = now_ms;
        self.battery.last_ms = now_ms;
    }

    /// Report and consume the jobs due at `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> SyncDue {
        SyncDue {
            therapy_sync: self.therapy.poll(now_ms),
            battery: self.battery.poll(now_ms),
        }
    }
}
