/// Quantizers shared by the uplink frames.
///
/// Every continuous measurement maps onto bucket `i` when `i * step <= v < (i + 1) * step`.
/// Values at or past the start of the saturation bucket all map to the field's all-ones code:
/// `value / step`, saturating at `saturated`.
pub const fn bucket(value: u32, step: u32, saturated: u8) -> u8 {
    let i = value / step;
    if i >= saturated as u32 {
        saturated
    } else {
        i as u8
    }
}

/// Millivolts per battery code.
pub const BATTERY_STEP_MV: u32 = 15;
/// Readings of this many millivolts or more saturate the battery byte.
pub const BATTERY_SATURATION_MV: u32 = BATTERY_STEP_MV * 0xFF; // 3825

/// Width of an acquisition-duration bucket (seconds) and of a speed bucket (km/h).
pub const TIMING_STEP: u32 = 5;
pub const NIBBLE_SATURATED: u8 = 0x0F;

/// Battery byte: 15 mV per code, `0xFF` from 3825 mV up.
pub const fn battery_code(voltage_mv: u32) -> u8 {
    bucket(voltage_mv, BATTERY_STEP_MV, 0xFF)
}

/// Lower bound, in millivolts, of the range a battery code stands for.
pub const fn battery_floor_mv(code: u8) -> u32 {
    code as u32 * BATTERY_STEP_MV
}

/// 4 bit bucket for acquisition duration (s) or speed (km/h): 5 units per bucket, `0xF` from 75 up.
pub const fn timing_nibble(value: u32) -> u8 {
    bucket(value, TIMING_STEP, NIBBLE_SATURATED)
}

/// 2 bit horizontal accuracy tier. `hdop` is scaled by 100.
///
/// | hdop / 100 | tier |
/// |---|---|
/// | > 5 | `11` |
/// | 2..=5 | `10` |
/// | 1 | `01` |
/// | 0 | `00` |
pub const fn hdop_tier(hdop: u16) -> u8 {
    match hdop / 100 {
        0 => 0b00,
        1 => 0b01,
        2..=5 => 0b10,
        _ => 0b11,
    }
}

/// 2 bit satellite count tier: `>= 8` -> `11`, `6..8` -> `10`, `4..6` -> `01`, else `00`.
pub const fn satellite_tier(satellites: u8) -> u8 {
    match satellites {
        0..=3 => 0b00,
        4..=5 => 0b01,
        6..=7 => 0b10,
        _ => 0b11,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_battery_code() {
        let test_cases = [
            (0, 0x00),
            (14, 0x00),
            (15, 0x01),
            (29, 0x01),
            (30, 0x02),
            (3000, 200),
            (3824, 0xFE),
            (3825, 0xFF),
            (3826, 0xFF),
            (u32::MAX, 0xFF),
        ];
        for (mv, expected) in test_cases {
            assert_eq!(battery_code(mv), expected, "battery_code({})", mv);
        }
    }

    #[test]
    fn test_battery_code_monotonic() {
        let mut last = 0;
        for mv in 0..=4000 {
            let code = battery_code(mv);
            assert!(code >= last, "battery code dropped at {} mV", mv);
            assert!(battery_floor_mv(code) <= mv);
            last = code;
        }
    }

    #[test]
    fn test_timing_nibble() {
        let test_cases = [
            (0, 0),
            (4, 0),
            (5, 1),
            (10, 2),
            (40, 8),
            (74, 14),
            (75, 15),
            (76, 15),
            (1000, 15),
        ];
        for (v, expected) in test_cases {
            assert_eq!(timing_nibble(v), expected, "timing_nibble({})", v);
        }
    }

    #[test]
    fn test_hdop_tier() {
        let test_cases = [
            (0, 0b00),
            (99, 0b00),
            (100, 0b01),
            (199, 0b01),
            (200, 0b10),
            (450, 0b10),
            (599, 0b10),
            (600, 0b11),
            (u16::MAX, 0b11),
        ];
        for (hdop, expected) in test_cases {
            assert_eq!(hdop_tier(hdop), expected, "hdop_tier({})", hdop);
        }
    }

    #[test]
    fn test_satellite_tier() {
        let expected = [0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 3];
        for (sats, tier) in expected.iter().enumerate() {
            assert_eq!(satellite_tier(sats as u8), *tier, "satellite_tier({})", sats);
        }
        assert_eq!(satellite_tier(u8::MAX), 0b11);
    }
}
