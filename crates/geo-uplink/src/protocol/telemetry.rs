use nom::{
    number::complete::{be_u32, be_u8},
    Finish, IResult,
};

use super::{
    quantize::{battery_code, battery_floor_mv, hdop_tier, satellite_tier, timing_nibble},
    FrameKind, UplinkMsg,
};
use crate::{sample::GpsFixSample, Error, GUResult};

/// Position report, 12 bytes, multi-byte fields big-endian.
///
/// ```text
/// byte  0..4   latitude   bit 31 = south, bits 0..31 = |lat| in 1e-6 deg
/// byte  4..8   longitude  bit 31 = west,  bits 0..31 = |lon| in 1e-6 deg
/// byte  8      battery    15 mV per code, 0xff saturated
/// byte  9      quality    h h s s 0 0 0 0   (h = hdop tier, s = satellite tier)
/// byte 10      timing     a a a a v v v v   (a = acquisition time bucket, v = speed bucket)
/// byte 11      reserved   0x00
/// ```
pub const TELEMETRY_FRAME_LEN: usize = 12;

/// Hemisphere flag of a coordinate word.
pub const SIGN_BIT: u32 = 0x8000_0000;
pub const MAGNITUDE_MASK: u32 = !SIGN_BIT;

/// Ratio between sample resolution (1e-7 deg) and transmitted resolution (1e-6 deg).
const COORD_DIVISOR: u32 = 10;

const HDOP_SHIFT: u8 = 6;
const SATELLITE_SHIFT: u8 = 4;
const DURATION_SHIFT: u8 = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TelemetryFrame(pub [u8; TELEMETRY_FRAME_LEN]);

impl UplinkMsg for TelemetryFrame {
    fn kind(&self) -> FrameKind {
        FrameKind::Telemetry
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Pack an accepted fix and the supply voltage measured alongside it.
pub fn encode(sample: &GpsFixSample, voltage_mv: u32) -> TelemetryFrame {
    let mut bytes = [0u8; TELEMETRY_FRAME_LEN];
    bytes[0..4].copy_from_slice(&encode_coord(sample.latitude).to_be_bytes());
    bytes[4..8].copy_from_slice(&encode_coord(sample.longitude).to_be_bytes());
    bytes[8] = battery_code(voltage_mv);
    bytes[9] =
        hdop_tier(sample.hdop) << HDOP_SHIFT | satellite_tier(sample.satellites) << SATELLITE_SHIFT;
    bytes[10] = timing_nibble(sample.duration_s) << DURATION_SHIFT | timing_nibble(sample.speed_kmh);
    TelemetryFrame(bytes)
}

/// Sign-magnitude coordinate word. The division truncates toward zero.
pub fn encode_coord(raw: i32) -> u32 {
    let magnitude = (raw.unsigned_abs() / COORD_DIVISOR) & MAGNITUDE_MASK;
    if raw < 0 {
        magnitude | SIGN_BIT
    } else {
        magnitude
    }
}

/// Inverse of [`encode_coord`], in 1e-6 degree units.
pub fn decode_coord(word: u32) -> i32 {
    // magnitude fits in 31 bits
    let magnitude = (word & MAGNITUDE_MASK) as i32;
    if word & SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Fields recovered from a received [`TelemetryFrame`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodedTelemetry {
    /// 1e-6 degree units.
    pub latitude: i32,
    pub longitude: i32,
    pub south: bool,
    pub west: bool,
    pub battery: u8,
    pub hdop_tier: u8,
    pub satellite_tier: u8,
    pub duration_bucket: u8,
    pub speed_bucket: u8,
}

impl DecodedTelemetry {
    pub fn latitude_deg(&self) -> f64 {
        self.latitude as f64 / 1e6
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude as f64 / 1e6
    }

    /// Lower bound of the reported supply voltage.
    pub fn battery_floor_mv(&self) -> u32 {
        battery_floor_mv(self.battery)
    }
}

pub fn parse(bytes: &[u8]) -> GUResult<DecodedTelemetry> {
    if bytes.len() != TELEMETRY_FRAME_LEN {
        return Err(Error::InvalidFrameLength {
            kind: FrameKind::Telemetry,
            expected: TELEMETRY_FRAME_LEN,
            actual: bytes.len(),
        });
    }
    let nom_res = nom_parse(bytes);
    nom_res.finish().map(|(_, t)| t).map_err(|e| e.into())
}

fn nom_parse(bytes: &[u8]) -> IResult<&[u8], DecodedTelemetry> {
    let (rest, lat) = be_u32(bytes)?;
    let (rest, lon) = be_u32(rest)?;
    let (rest, battery) = be_u8(rest)?;
    let (rest, quality) = be_u8(rest)?;
    let (rest, timing) = be_u8(rest)?;
    let (rest, _reserved) = be_u8(rest)?;
    Ok((
        rest,
        DecodedTelemetry {
            latitude: decode_coord(lat),
            longitude: decode_coord(lon),
            south: lat & SIGN_BIT != 0,
            west: lon & SIGN_BIT != 0,
            battery,
            hdop_tier: quality >> HDOP_SHIFT,
            satellite_tier: (quality >> SATELLITE_SHIFT) & 0b11,
            duration_bucket: timing >> DURATION_SHIFT,
            speed_bucket: timing & 0x0F,
        },
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        lazy_init_tracing,
        sample::FixQuality,
        sim::{GeoBox, RandomFixSource},
    };
    use tracing::trace;

    fn sample(latitude: i32, longitude: i32) -> GpsFixSample {
        GpsFixSample {
            latitude,
            longitude,
            quality: FixQuality::Fix3d,
            hdop: 450,
            satellites: 9,
            duration_s: 40,
            speed_kmh: 10,
            clock_calibrated: true,
        }
    }

    #[test]
    fn test_encode_reference_frame() {
        lazy_init_tracing();
        // 48.8583701 N, 2.2944813 E
        let frame = encode(&sample(488_583_701, 22_944_813), 3000);
        let lat: u32 = 48_858_370;
        let lon: u32 = 2_294_481;
        let expected = [
            lat.to_be_bytes().as_slice(),
            &lon.to_be_bytes(),
            &[
                0xC8, // 3000 mV / 15
                0xB0, // hdop tier 10, satellite tier 11
                0x82, // 40 s -> 8, 10 km/h -> 2
                0x00,
            ],
        ]
        .concat();
        assert_eq!(frame.as_bytes(), expected.as_slice());
        assert_eq!(frame.kind(), FrameKind::Telemetry);
        assert_eq!(frame.as_bytes().len(), FrameKind::Telemetry.frame_len());
    }

    #[test]
    fn test_encode_hemispheres() {
        let frame = encode(&sample(-338_567_800, -703_000_015), 3000);
        let bytes = frame.as_bytes();
        assert_eq!(bytes[0] & 0x80, 0x80);
        assert_eq!(bytes[4] & 0x80, 0x80);
        let lat = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let lon = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(lat & MAGNITUDE_MASK, 33_856_780);
        assert_eq!(lon & MAGNITUDE_MASK, 70_300_001);

        let frame = encode(&sample(0, 0), 3000);
        assert_eq!(&frame.as_bytes()[0..8], &[0u8; 8]);
    }

    #[test]
    fn test_encode_saturation() {
        let mut s = sample(10, 10);
        s.duration_s = 300;
        s.speed_kmh = 76;
        s.hdop = 9999;
        s.satellites = 3;
        let frame = encode(&s, 4200);
        assert_eq!(frame.0[8], 0xFF);
        assert_eq!(frame.0[9], 0xC0);
        assert_eq!(frame.0[10], 0xFF);
        assert_eq!(frame.0[11], 0x00);
    }

    #[test]
    fn test_parse_reference_frame() {
        let frame = encode(&sample(-123_456_789, 987_654_321), 3001);
        let decoded = parse(frame.as_bytes()).unwrap();
        assert_eq!(decoded.latitude, -12_345_678);
        assert_eq!(decoded.longitude, 98_765_432);
        assert!(decoded.south);
        assert!(!decoded.west);
        assert_eq!(decoded.battery, 200);
        assert_eq!(decoded.battery_floor_mv(), 3000);
        assert_eq!(decoded.hdop_tier, 0b10);
        assert_eq!(decoded.satellite_tier, 0b11);
        assert_eq!(decoded.duration_bucket, 8);
        assert_eq!(decoded.speed_bucket, 2);
        assert!((decoded.latitude_deg() + 12.345678).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_recovery() {
        lazy_init_tracing();
        let mut source = RandomFixSource::new(GeoBox::WORLD);
        for _ in 0..500 {
            let s = source.next_sample();
            let decoded = parse(encode(&s, 3300).as_bytes()).unwrap();
            trace!("sample: {:?} decoded: {:?}", s, decoded);
            assert!((decoded.latitude as i64 * 10 - s.latitude as i64).abs() < 10);
            assert!((decoded.longitude as i64 * 10 - s.longitude as i64).abs() < 10);
            assert_eq!(decoded.south, s.latitude < 0);
            assert_eq!(decoded.west, s.longitude < 0);
        }
    }

    #[test]
    fn test_parse_wrong_length() {
        for len in [0, 1, 11, 13] {
            let bytes = vec![0u8; len];
            match parse(&bytes) {
                Err(Error::InvalidFrameLength {
                    kind: FrameKind::Telemetry,
                    expected: 12,
                    actual,
                }) => assert_eq!(actual, len),
                other => panic!("unexpected result for len {}: {:?}", len, other),
            }
        }
    }
}
