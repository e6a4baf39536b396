/// Fix samples as delivered by the positioning collaborator, and the modes it is driven with.
///
/// A single fix result. Positions are in 1e-7 degree units.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GpsFixSample {
    pub latitude: i32,
    pub longitude: i32,
    pub quality: FixQuality,
    /// Horizontal dilution of precision, scaled by 100.
    pub hdop: u16,
    pub satellites: u8,
    /// Time spent acquiring this fix, in seconds.
    pub duration_s: u32,
    pub speed_kmh: u32,
    /// The receiver clock was calibrated when the fix was produced. Uncalibrated fixes are never
    /// reported.
    pub clock_calibrated: bool,
}

impl GpsFixSample {
    /// A sample is reportable when its quality meets `min_quality` and its clock was calibrated.
    pub fn is_acceptable(&self, min_quality: FixQuality) -> bool {
        self.quality >= min_quality && self.clock_calibrated
    }
}

/// Quality of a fix, ordered from worst to best so it can be compared against a configured
/// minimum.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixQuality {
    NoFix,
    /// Only the time of day is known.
    Time,
    /// Date and time are known.
    Date,
    Fix2d,
    Fix3d,
}

/// Acquisition mode requested from the positioning collaborator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FixMode {
    /// Continuous tracking until the deadline, best accuracy.
    #[default]
    Navigation,
    /// Receiver duty-cycles itself while acquiring.
    PowerSave,
}

/// Low-power state the positioning subsystem is put into between fix attempts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SleepMode {
    /// Fully powered off. Cold start on the next attempt.
    #[default]
    Off,
    /// Hardware-backed retention of ephemeris and time, for fast reacquisition.
    HardwareBackup,
}
