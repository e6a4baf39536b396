/// Hardware collaborators the controllers drive: positioning receiver, supply measurement,
/// uplink radio and the periodic timer.
use std::time::Duration;

use crate::{
    duty_cycle::TransmitRequest,
    sample::{FixMode, SleepMode},
    GUResult,
};

/// Identifies an armed periodic trigger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TriggerHandle(pub u32);

/// API of the platform layer. Completions are delivered back to the host, which forwards them
/// to [`crate::cadence::FixCadenceController`].
pub trait Platform {
    /// Start a fix attempt. The result is delivered once, later, either as a sample or as a
    /// timeout after `timeout` has elapsed.
    fn request_fix(&mut self, mode: FixMode, timeout: Duration);

    /// Stop acquiring and put the receiver into `sleep_mode`.
    fn stop_fix(&mut self, sleep_mode: SleepMode);

    fn read_voltage_mv(&mut self) -> u32;

    /// Hand a frame to the radio. When `request.request_reconfiguration` is set the transport
    /// opens a reply window and reports its phases back to the host.
    fn transmit(&mut self, request: &TransmitRequest) -> GUResult<()>;

    /// Start a periodic trigger firing every `interval`.
    fn arm_periodic_trigger(&mut self, interval: Duration) -> TriggerHandle;

    /// Change the period of an armed trigger. The next firing happens after `first_delay`, then
    /// every `interval`.
    fn rearm_periodic_trigger(
        &mut self,
        handle: TriggerHandle,
        first_delay: Duration,
        interval: Duration,
    );
}
