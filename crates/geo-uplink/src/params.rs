/// Live scheduler parameters and the partial updates a reconfiguration reply produces.
use std::time::Duration;

use crate::sample::SleepMode;

pub const DEFAULT_FIX_TIMEOUT_S: u8 = 60;
pub const DEFAULT_FIX_INTERVAL_S: u32 = 3600;
/// One reply window per day at the default hourly interval.
pub const DEFAULT_DOWNLINK_MAX_COUNTER: u8 = 23;

/// Parameters governing fix cadence and reply windows. Owned by the cadence controller and
/// replaced as a whole whenever an update is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SchedulerParameters {
    /// Deadline for a single fix attempt. Zero is a valid (immediately failing) budget.
    pub fix_timeout_s: u8,
    pub fix_interval_s: u32,
    pub sleep_mode: SleepMode,
    /// Number of plain transmissions between two reply window requests.
    pub downlink_max_counter: u8,
}

impl Default for SchedulerParameters {
    fn default() -> Self {
        Self {
            fix_timeout_s: DEFAULT_FIX_TIMEOUT_S,
            fix_interval_s: DEFAULT_FIX_INTERVAL_S,
            sleep_mode: SleepMode::Off,
            downlink_max_counter: DEFAULT_DOWNLINK_MAX_COUNTER,
        }
    }
}

impl SchedulerParameters {
    pub fn fix_timeout(&self) -> Duration {
        Duration::from_secs(self.fix_timeout_s.into())
    }

    pub fn fix_interval(&self) -> Duration {
        Duration::from_secs(self.fix_interval_s.into())
    }

    /// Return a copy with `update` applied. Interval and sleep mode always change together.
    pub fn apply(&self, update: &SchedulerUpdate) -> Self {
        let mut next = *self;
        next.fix_timeout_s = update.fix_timeout_s;
        if let Some(interval) = update.interval {
            next.fix_interval_s = interval.fix_interval_s;
            next.sleep_mode = interval.sleep_mode;
        }
        if let Some(max) = update.downlink_max_counter {
            next.downlink_max_counter = max;
        }
        next
    }
}

/// New fix interval together with the sleep mode suited to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IntervalUpdate {
    pub fix_interval_s: u32,
    pub sleep_mode: SleepMode,
}

/// Fields carried by a reconfiguration reply. `None` leaves the live value untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SchedulerUpdate {
    pub fix_timeout_s: u8,
    pub interval: Option<IntervalUpdate>,
    pub downlink_max_counter: Option<u8>,
}
