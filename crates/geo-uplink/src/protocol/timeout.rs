use nom::{number::complete::be_u8, Finish, IResult};

use super::{
    quantize::{battery_code, battery_floor_mv},
    FrameKind, UplinkMsg,
};
use crate::{Error, GUResult};

/// Battery-only report: a single battery byte, quantized like byte 8 of the telemetry frame.
pub const TIMEOUT_FRAME_LEN: usize = 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimeoutFrame(pub [u8; TIMEOUT_FRAME_LEN]);

impl UplinkMsg for TimeoutFrame {
    fn kind(&self) -> FrameKind {
        FrameKind::Timeout
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

pub fn encode(voltage_mv: u32) -> TimeoutFrame {
    TimeoutFrame([battery_code(voltage_mv)])
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodedTimeout {
    pub battery: u8,
}

impl DecodedTimeout {
    pub fn battery_floor_mv(&self) -> u32 {
        battery_floor_mv(self.battery)
    }
}

pub fn parse(bytes: &[u8]) -> GUResult<DecodedTimeout> {
    if bytes.len() != TIMEOUT_FRAME_LEN {
        return Err(Error::InvalidFrameLength {
            kind: FrameKind::Timeout,
            expected: TIMEOUT_FRAME_LEN,
            actual: bytes.len(),
        });
    }
    let nom_res = nom_parse(bytes);
    nom_res.finish().map(|(_, t)| t).map_err(|e| e.into())
}

fn nom_parse(bytes: &[u8]) -> IResult<&[u8], DecodedTimeout> {
    let (rest, battery) = be_u8(bytes)?;
    Ok((rest, DecodedTimeout { battery }))
}
