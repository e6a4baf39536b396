/// Static tracker configuration. Live, remotely adjustable values are in
/// [`SchedulerParameters`].
use crate::{
    params::SchedulerParameters,
    sample::{FixMode, FixQuality},
};

/// Number of times the transport repeats each uplink frame.
pub const DEFAULT_TRANSMIT_REPEATS: u8 = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Fixes below this quality are reported as a timeout.
    pub min_quality: FixQuality,
    pub fix_mode: FixMode,
    pub transmit_repeats: u8,
    /// Parameters in effect until the first reconfiguration reply.
    pub initial_parameters: SchedulerParameters,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_quality: FixQuality::Fix2d,
            fix_mode: FixMode::Navigation,
            transmit_repeats: DEFAULT_TRANSMIT_REPEATS,
            initial_parameters: SchedulerParameters::default(),
        }
    }
}

impl TrackerConfig {
    pub fn with_min_quality(mut self, min_quality: FixQuality) -> Self {
        self.min_quality = min_quality;
        self
    }

    pub fn with_fix_mode(mut self, fix_mode: FixMode) -> Self {
        self.fix_mode = fix_mode;
        self
    }

    pub fn with_transmit_repeats(mut self, repeats: u8) -> Self {
        self.transmit_repeats = repeats;
        self
    }

    pub fn with_parameters(mut self, parameters: SchedulerParameters) -> Self {
        self.initial_parameters = parameters;
        self
    }
}
