//! Binary/BCD time-field codec.
//!
//! The chip stores every time, date and alarm field either as plain binary
//! or as binary-coded decimal, selected by one Register B bit for the whole
//! store. The mode is re-derived from Register B at every call site rather
//! than cached, so a mode change mid-session can never desynchronize the
//! interpretation from the hardware.

use crate::nvr::regs;

/// Store-wide field encoding, from Register B's DM bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataMode {
    Bcd,
    Binary,
}

impl DataMode {
    /// Derive the mode from a Register B value. DM set means binary.
    pub fn from_reg_b(reg_b: u8) -> Self {
        if reg_b & regs::B_DM != 0 {
            Self::Binary
        } else {
            Self::Bcd
        }
    }

    /// Convert a raw cell value to binary.
    pub fn decode(self, raw: u8) -> u8 {
        match self {
            Self::Bcd => bcd_to_bin(raw),
            Self::Binary => raw,
        }
    }

    /// Convert a binary value to the on-chip representation.
    pub fn encode(self, value: u8) -> u8 {
        match self {
            Self::Bcd => bin_to_bcd(value),
            Self::Binary => value,
        }
    }
}

/// Hour-field format, from Register B's 24H bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HourMode {
    H12,
    H24,
}

impl HourMode {
    pub fn from_reg_b(reg_b: u8) -> Self {
        if reg_b & regs::B_24H != 0 {
            Self::H24
        } else {
            Self::H12
        }
    }
}

/// High nibble x10 + low nibble.
pub fn bcd_to_bin(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Tens into the high nibble, units into the low.
pub fn bin_to_bcd(bin: u8) -> u8 {
    ((bin / 10) << 4) | (bin % 10)
}

/// PM flag carried in bit 7 of the raw hour byte in 12-hour mode.
const HOUR_PM: u8 = 0x80;

/// Decode the hour cell to 0-23.
///
/// In 12-hour mode bit 7 is a PM flag and must be stripped before codec
/// conversion; 12 AM is stored as 12 and maps to 0, and PM hours below 12
/// gain 12.
pub fn decode_hours(raw: u8, mode: DataMode, hours: HourMode) -> u8 {
    match hours {
        HourMode::H24 => mode.decode(raw),
        HourMode::H12 => {
            let pm = raw & HOUR_PM != 0;
            let mut h = mode.decode(raw & !HOUR_PM);
            if pm {
                if h < 12 {
                    h += 12;
                }
            } else if h == 12 {
                h = 0;
            }
            h
        }
    }
}

/// Encode an hour value 0-23 into the cell representation.
pub fn encode_hours(hour: u8, mode: DataMode, hours: HourMode) -> u8 {
    match hours {
        HourMode::H24 => mode.encode(hour),
        HourMode::H12 => match hour {
            0 => mode.encode(12),
            1..=11 => mode.encode(hour),
            12 => mode.encode(12) | HOUR_PM,
            _ => mode.encode(hour - 12) | HOUR_PM,
        },
    }
}

/// Clamp a decoded day-of-week to the unknown sentinel 0 when outside 1-7.
///
/// A display-layer safety net for corrupted cells, not a hardware
/// guarantee; the raw cell is left as-is.
pub fn clamp_day_of_week(value: u8) -> u8 {
    if (1..=7).contains(&value) { value } else { 0 }
}

/// Clamp a decoded month to the unknown sentinel 0 when outside 1-12.
pub fn clamp_month(value: u8) -> u8 {
    if (1..=12).contains(&value) { value } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcd_vectors() {
        assert_eq!(bcd_to_bin(0x59), 59);
        assert_eq!(bcd_to_bin(0x00), 0);
        assert_eq!(bcd_to_bin(0x17), 17);
        assert_eq!(bin_to_bcd(59), 0x59);
        assert_eq!(bin_to_bcd(0), 0x00);
        assert_eq!(bin_to_bcd(23), 0x23);
    }

    #[test]
    fn mode_from_reg_b() {
        assert_eq!(DataMode::from_reg_b(0x02), DataMode::Bcd);
        assert_eq!(DataMode::from_reg_b(0x06), DataMode::Binary);
        assert_eq!(HourMode::from_reg_b(0x02), HourMode::H24);
        assert_eq!(HourMode::from_reg_b(0x00), HourMode::H12);
    }

    #[test]
    fn field_roundtrip_both_modes() {
        for mode in [DataMode::Bcd, DataMode::Binary] {
            for v in 0..=99u8 {
                assert_eq!(mode.decode(mode.encode(v)), v);
            }
        }
    }

    #[test]
    fn hours_roundtrip_all_formats() {
        for mode in [DataMode::Bcd, DataMode::Binary] {
            for hours in [HourMode::H12, HourMode::H24] {
                for h in 0..24u8 {
                    let raw = encode_hours(h, mode, hours);
                    assert_eq!(decode_hours(raw, mode, hours), h, "{mode:?} {hours:?} {h}");
                }
            }
        }
    }

    #[test]
    fn twelve_hour_midnight_and_noon() {
        // Midnight stores as 12 with PM clear, noon as 12 with PM set.
        assert_eq!(encode_hours(0, DataMode::Bcd, HourMode::H12), 0x12);
        assert_eq!(encode_hours(12, DataMode::Bcd, HourMode::H12), 0x92);
        assert_eq!(decode_hours(0x12, DataMode::Bcd, HourMode::H12), 0);
        assert_eq!(decode_hours(0x92, DataMode::Bcd, HourMode::H12), 12);
    }

    #[test]
    fn twelve_hour_pm_offsets() {
        // 11 PM = raw 11 | PM
        assert_eq!(encode_hours(23, DataMode::Binary, HourMode::H12), 0x8B);
        assert_eq!(decode_hours(0x8B, DataMode::Binary, HourMode::H12), 23);
    }

    #[test]
    fn clamps_use_zero_sentinel() {
        assert_eq!(clamp_day_of_week(0), 0);
        assert_eq!(clamp_day_of_week(3), 3);
        assert_eq!(clamp_day_of_week(8), 0);
        assert_eq!(clamp_month(12), 12);
        assert_eq!(clamp_month(13), 0);
        assert_eq!(clamp_month(0xFF), 0);
    }
}
