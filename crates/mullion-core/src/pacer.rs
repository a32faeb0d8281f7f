//! Frame pacing by deadline accumulation, for backends without vsync.

use std::time::Duration;

/// Holds a target frame interval without drifting.
///
/// The deadline advances by exactly one interval from its previous value,
/// never from "now": after a slow frame the following ones are scheduled
/// back to back until the debt is repaid, instead of the lost time becoming
/// permanent. [`reset`](Self::reset) unsets the deadline so pacing restarts
/// cleanly after a display resize.
#[derive(Clone, Copy, Debug, Default)]
pub struct FramePacer {
    deadline_us: Option<u64>,
}

impl FramePacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long to sleep before the next frame, if at all.
    ///
    /// `now_ms` comes from the runtime clock; the sleep is rounded up to a
    /// whole millisecond so the loop never wakes before the deadline.
    pub fn pace(&mut self, now_ms: u64, refresh_rate: u32) -> Option<Duration> {
        if refresh_rate == 0 {
            return None;
        }
        let interval = 1_000_000 / u64::from(refresh_rate);
        let now_us = now_ms * 1000;
        let Some(deadline) = self.deadline_us else {
            self.deadline_us = Some(now_us + interval);
            return None;
        };
        let sleep = if deadline > now_us {
            Some(Duration::from_millis((deadline - now_us) / 1000 + 1))
        } else {
            None
        };
        self.deadline_us = Some(deadline + interval);
        sleep
    }

    pub fn reset(&mut self) {
        self.deadline_us = None;
    }
}
