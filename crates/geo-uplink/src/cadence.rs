/// Fix cadence state machine: starts a fix attempt on every periodic trigger, reports the result
/// and applies reconfiguration replies.
///
/// The host delivers all events serially: periodic triggers, fix results and reply window phases.
/// Exactly one fix attempt is in flight at a time; a trigger arriving while acquiring is dropped.
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use crate::{
    config::TrackerConfig,
    duty_cycle::{DownlinkPhase, DownlinkStatus, DutyCycleController, TransmitRequest},
    params::{SchedulerParameters, SchedulerUpdate},
    platform::{Platform, TriggerHandle},
    protocol::{telemetry, timeout},
    sample::GpsFixSample,
    GUResult,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CadenceState {
    Idle,
    Acquiring,
}

/// How a fix attempt ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A fix meeting the acceptance criteria arrived; a telemetry frame was sent.
    Accepted,
    /// A fix arrived below the minimum quality or with an uncalibrated clock; a timeout frame was
    /// sent.
    Rejected,
    /// No fix before the deadline; a timeout frame was sent.
    TimedOut,
}

/// Result of a completed attempt, for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub outcome: AttemptOutcome,
    pub request: TransmitRequest,
}

pub struct FixCadenceController<P: Platform> {
    platform: P,
    config: TrackerConfig,
    params: SchedulerParameters,
    duty_cycle: DutyCycleController,
    state: CadenceState,
    trigger: Option<TriggerHandle>,
    next_trigger_due: Option<DateTime<Utc>>,
    attempt_started_at: Option<DateTime<Utc>>,
}

impl<P: Platform> FixCadenceController<P> {
    pub fn new(platform: P, config: TrackerConfig) -> Self {
        Self {
            platform,
            params: config.initial_parameters,
            duty_cycle: DutyCycleController::new(config.transmit_repeats),
            config,
            state: CadenceState::Idle,
            trigger: None,
            next_trigger_due: None,
            attempt_started_at: None,
        }
    }

    /// Replace the duty cycle controller, e.g. to install a payload transform.
    pub fn with_duty_cycle(mut self, duty_cycle: DutyCycleController) -> Self {
        self.duty_cycle = duty_cycle;
        self
    }

    pub fn state(&self) -> CadenceState {
        self.state
    }

    pub fn parameters(&self) -> &SchedulerParameters {
        &self.params
    }

    pub fn duty_cycle(&self) -> &DutyCycleController {
        &self.duty_cycle
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// When the periodic trigger is next expected to fire.
    pub fn next_trigger_due(&self) -> Option<DateTime<Utc>> {
        self.next_trigger_due
    }

    /// Arm the periodic trigger and start the first attempt right away.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        let interval = self.params.fix_interval();
        let handle = self.platform.arm_periodic_trigger(interval);
        info!("periodic trigger {:?} armed every {:?}", handle, interval);
        self.trigger = Some(handle);
        self.on_periodic_trigger(now)
    }

    /// Periodic trigger fired. Returns whether a fix attempt was started.
    pub fn on_periodic_trigger(&mut self, now: DateTime<Utc>) -> bool {
        self.next_trigger_due = Some(now + seconds(self.params.fix_interval_s));
        if self.state == CadenceState::Acquiring {
            debug!("trigger at {} ignored, attempt still in flight", now);
            return false;
        }
        let timeout = self.params.fix_timeout();
        info!("start fixing at {} (timeout {:?})", now, timeout);
        self.state = CadenceState::Acquiring;
        self.attempt_started_at = Some(now);
        self.platform.request_fix(self.config.fix_mode, timeout);
        true
    }

    /// Fix attempt completed with a sample, a timeout, or both. The first result of an attempt
    /// wins; later ones are discarded and return `Ok(None)`.
    pub fn on_fix_result(
        &mut self,
        now: DateTime<Utc>,
        sample: Option<GpsFixSample>,
        timed_out: bool,
    ) -> GUResult<Option<AttemptReport>> {
        if self.state != CadenceState::Acquiring {
            warn!(
                "discarding fix result (sample: {}, timed out: {}) outside of an attempt",
                sample.is_some(),
                timed_out
            );
            return Ok(None);
        }
        let (outcome, accepted) = match sample {
            Some(s) if s.is_acceptable(self.config.min_quality) => (AttemptOutcome::Accepted, Some(s)),
            Some(s) => {
                debug!(
                    "fix below threshold: {:?} (min {:?}), clock calibrated: {}",
                    s.quality, self.config.min_quality, s.clock_calibrated
                );
                (AttemptOutcome::Rejected, None)
            }
            None if timed_out => (AttemptOutcome::TimedOut, None),
            None => {
                warn!("fix result without sample or timeout ignored");
                return Ok(None);
            }
        };

        let elapsed = self.attempt_started_at.take().map(|t| now - t);
        info!("fix attempt {:?} after {:?}", outcome, elapsed);
        self.state = CadenceState::Idle;
        self.platform.stop_fix(self.params.sleep_mode);

        let voltage_mv = self.platform.read_voltage_mv();
        let max_counter = self.params.downlink_max_counter;
        let request = match accepted {
            Some(s) => {
                debug!("fix: {:?}, voltage: {} mV", s, voltage_mv);
                self.duty_cycle
                    .on_frame_ready(&telemetry::encode(&s, voltage_mv), max_counter)
            }
            None => {
                debug!("voltage: {} mV", voltage_mv);
                self.duty_cycle
                    .on_frame_ready(&timeout::encode(voltage_mv), max_counter)
            }
        };
        if let Err(e) = self.platform.transmit(&request) {
            warn!("{:?} frame not sent: {}", request.kind, e);
            if request.request_reconfiguration {
                self.duty_cycle.cancel_reply_window();
            }
            return Err(e);
        }
        Ok(Some(AttemptReport { outcome, request }))
    }

    /// One phase of a reply window. A data phase carrying a valid reply is applied immediately; a
    /// malformed one changes nothing and is returned as an error.
    pub fn on_reconfiguration_bytes(
        &mut self,
        now: DateTime<Utc>,
        phase: DownlinkPhase<'_>,
    ) -> GUResult<DownlinkStatus> {
        if let Some(update) = self.duty_cycle.on_reconfiguration_bytes(phase)? {
            self.apply_update(now, &update);
        }
        Ok(DownlinkStatus::Done)
    }

    /// Swap in the updated parameters and rearm the periodic trigger if the interval changed.
    pub fn apply_update(&mut self, now: DateTime<Utc>, update: &SchedulerUpdate) {
        let next = self.params.apply(update);
        if next.fix_interval_s != self.params.fix_interval_s {
            self.rearm(now, next.fix_interval());
        }
        info!(
            "parameters: timeout {} s, interval {} s, sleep {:?}, downlink every {} frames",
            next.fix_timeout_s,
            next.fix_interval_s,
            next.sleep_mode,
            u16::from(next.downlink_max_counter) + 1
        );
        self.params = next;
        self.duty_cycle.clamp_counter(next.downlink_max_counter);
    }

    /// The next trigger keeps its current due time unless the new interval is shorter than what
    /// remains of the old one. A trigger already due fires right away.
    fn rearm(&mut self, now: DateTime<Utc>, interval: Duration) {
        let Some(handle) = self.trigger else {
            debug!("no periodic trigger armed yet");
            return;
        };
        let first_delay = self
            .next_trigger_due
            .map(|due| (due - now).to_std().unwrap_or(Duration::ZERO))
            .map_or(interval, |remaining| remaining.min(interval));
        self.next_trigger_due = TimeDelta::from_std(first_delay).ok().map(|d| now + d);
        info!(
            "periodic trigger {:?} rearmed every {:?}, next in {:?}",
            handle, interval, first_delay
        );
        self.platform
            .rearm_periodic_trigger(handle, first_delay, interval);
    }
}

fn seconds(secs: u32) -> TimeDelta {
    TimeDelta::seconds(secs.into())
}
