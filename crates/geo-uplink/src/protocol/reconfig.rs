/// Reconfiguration reply received in a downlink window.
///
/// ```text
/// byte 0   fix timeout, seconds           always applied
/// byte 1   fix interval, hours            1..=3 -> retain receiver state between fixes
///                                         4..=47 -> power receiver off between fixes
///                                         other -> ignored
/// byte 2   downlink max counter           0..=47 applied, other ignored
/// ```
use nom::{number::complete::be_u8, Finish, IResult};

use crate::{
    params::{IntervalUpdate, SchedulerUpdate},
    sample::SleepMode,
    Error, GUResult,
};

pub const RECONFIGURATION_LEN: usize = 3;

/// Intervals up to this many hours keep the receiver in hardware backup between fixes.
pub const MAX_BACKUP_INTERVAL_H: u8 = 3;
/// Exclusive upper bound for the interval and counter bytes.
pub const FIELD_LIMIT: u8 = 48;

const SECONDS_PER_HOUR: u32 = 3600;

/// The three raw bytes of a reply.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReconfigurationCommand {
    pub timeout_s: u8,
    pub fix_interval_h: u8,
    pub downlink_max_counter: u8,
}

impl ReconfigurationCommand {
    /// Validate fields. Out of range interval or counter bytes are reserved and leave the
    /// corresponding parameter unchanged.
    pub fn to_update(&self) -> SchedulerUpdate {
        let interval = match self.fix_interval_h {
            h @ 1..=MAX_BACKUP_INTERVAL_H => Some(IntervalUpdate {
                fix_interval_s: h as u32 * SECONDS_PER_HOUR,
                sleep_mode: SleepMode::HardwareBackup,
            }),
            h if h > MAX_BACKUP_INTERVAL_H && h < FIELD_LIMIT => Some(IntervalUpdate {
                fix_interval_s: h as u32 * SECONDS_PER_HOUR,
                sleep_mode: SleepMode::Off,
            }),
            _ => None,
        };
        let downlink_max_counter =
            (self.downlink_max_counter < FIELD_LIMIT).then_some(self.downlink_max_counter);
        SchedulerUpdate {
            fix_timeout_s: self.timeout_s,
            interval,
            downlink_max_counter,
        }
    }
}

/// Parse a reply. Anything but exactly [`RECONFIGURATION_LEN`] bytes is rejected whole.
pub fn parse(bytes: &[u8]) -> GUResult<ReconfigurationCommand> {
    if bytes.len() != RECONFIGURATION_LEN {
        return Err(Error::MalformedReconfiguration { len: bytes.len() });
    }
    let nom_res = nom_parse(bytes);
    nom_res.finish().map(|(_, cmd)| cmd).map_err(|e| e.into())
}

/// Parse and validate a reply into the update to apply.
pub fn decode(bytes: &[u8]) -> GUResult<SchedulerUpdate> {
    parse(bytes).map(|cmd| cmd.to_update())
}

fn nom_parse(bytes: &[u8]) -> IResult<&[u8], ReconfigurationCommand> {
    let (rest, timeout_s) = be_u8(bytes)?;
    let (rest, fix_interval_h) = be_u8(rest)?;
    let (rest, downlink_max_counter) = be_u8(rest)?;
    Ok((
        rest,
        ReconfigurationCommand {
            timeout_s,
            fix_interval_h,
            downlink_max_counter,
        },
    ))
}
