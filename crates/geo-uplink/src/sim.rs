/// Simulated platform and fix source, for driving the controllers without hardware.
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::{
    duty_cycle::TransmitRequest,
    platform::{Platform, TriggerHandle},
    protocol::hex,
    sample::{FixMode, FixQuality, GpsFixSample, SleepMode},
    Error, GUResult,
};

//  ____  _       _    __
// |  _ \| | __ _| |_ / _| ___  _ __ _ __ ___
// | |_) | |/ _` | __| |_ / _ \| '__| '_ ` _ \
// |  __/| | (_| | |_|  _| (_) | |  | | | | | |
// |_|   |_|\__,_|\__|_|  \___/|_|  |_| |_| |_|

/// A call made into [`SimPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    RequestFix {
        mode: FixMode,
        timeout: Duration,
    },
    StopFix(SleepMode),
    Transmit(TransmitRequest),
    ArmTrigger {
        handle: TriggerHandle,
        interval: Duration,
    },
    RearmTrigger {
        handle: TriggerHandle,
        first_delay: Duration,
        interval: Duration,
    },
}

/// Platform that records every call. Supply voltage is fixed, transmissions can be made to fail.
#[derive(Debug, Default)]
pub struct SimPlatform {
    pub voltage_mv: u32,
    pub fail_transmit: bool,
    pub calls: Vec<PlatformCall>,
    next_handle: u32,
}

impl SimPlatform {
    pub fn new(voltage_mv: u32) -> Self {
        Self {
            voltage_mv,
            ..Default::default()
        }
    }

    pub fn fix_requests(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PlatformCall::RequestFix { .. }))
            .count()
    }

    /// Successfully transmitted frames, oldest first.
    pub fn transmitted(&self) -> Vec<&TransmitRequest> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PlatformCall::Transmit(req) => Some(req),
                _ => None,
            })
            .collect()
    }
}

impl Platform for SimPlatform {
    fn request_fix(&mut self, mode: FixMode, timeout: Duration) {
        self.calls.push(PlatformCall::RequestFix { mode, timeout });
    }

    fn stop_fix(&mut self, sleep_mode: SleepMode) {
        self.calls.push(PlatformCall::StopFix(sleep_mode));
    }

    fn read_voltage_mv(&mut self) -> u32 {
        self.voltage_mv
    }

    fn transmit(&mut self, request: &TransmitRequest) -> GUResult<()> {
        if self.fail_transmit {
            return Err(Error::TransmitFailure(format!(
                "simulated failure sending {}",
                hex(&request.payload)
            )));
        }
        debug!(
            "tx {} (repeats {}, reply window {})",
            hex(&request.payload),
            request.repeats,
            request.request_reconfiguration
        );
        self.calls.push(PlatformCall::Transmit(request.clone()));
        Ok(())
    }

    fn arm_periodic_trigger(&mut self, interval: Duration) -> TriggerHandle {
        self.next_handle += 1;
        let handle = TriggerHandle(self.next_handle);
        self.calls.push(PlatformCall::ArmTrigger { handle, interval });
        handle
    }

    fn rearm_periodic_trigger(
        &mut self,
        handle: TriggerHandle,
        first_delay: Duration,
        interval: Duration,
    ) {
        self.calls.push(PlatformCall::RearmTrigger {
            handle,
            first_delay,
            interval,
        });
    }
}

//  _____ _        ____
// |  ___(_)_  __ / ___|  ___  _   _ _ __ ___ ___
// | |_  | \ \/ / \___ \ / _ \| | | | '__/ __/ _ \
// |  _| | |>  <   ___) | (_) | |_| | | | (_|  __/
// |_|   |_/_/\_\ |____/ \___/ \__,_|_|  \___\___|

/// Latitude/longitude box in degrees.
#[derive(Debug, Copy, Clone)]
pub struct GeoBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBox {
    pub const WORLD: GeoBox = GeoBox {
        lat_min: -90.0,
        lat_max: 90.0,
        lon_min: -180.0,
        lon_max: 180.0,
    };
}

const QUALITIES: [FixQuality; 5] = [
    FixQuality::NoFix,
    FixQuality::Time,
    FixQuality::Date,
    FixQuality::Fix2d,
    FixQuality::Fix3d,
];

/// Random fixes inside a box. Not realistic, but covers every field range.
pub struct RandomFixSource {
    bbox: GeoBox,
}

impl RandomFixSource {
    pub fn new(bbox: GeoBox) -> Self {
        Self { bbox }
    }

    pub fn next_sample(&mut self) -> GpsFixSample {
        let mut rng = rand::thread_rng();
        let lat = rng.gen_range(self.bbox.lat_min..=self.bbox.lat_max);
        let lon = rng.gen_range(self.bbox.lon_min..=self.bbox.lon_max);
        GpsFixSample {
            latitude: (lat * 1e7).round() as i32,
            longitude: (lon * 1e7).round() as i32,
            quality: QUALITIES[rng.gen_range(0..QUALITIES.len())],
            hdop: rng.gen_range(50..2000),
            satellites: rng.gen_range(0..16),
            duration_s: rng.gen_range(0..120),
            speed_kmh: rng.gen_range(0..130),
            clock_calibrated: rng.gen_bool(0.9),
        }
    }
}
