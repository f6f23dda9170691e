//! Clock, calendar and alarm operations.
//!
//! High-level reads decode the ten time/date cells through the codec after
//! waiting out the chip's update cycle; high-level writes validate first
//! (no hardware is touched on bad input) and then run bracketed by the
//! update gate so readers never see a partial set.

use crate::nvr::codec::{self, DataMode, HourMode};
use crate::nvr::error::{check_range, NvrError};
use crate::nvr::regs;
use crate::nvr::NvrBus;
use crate::port::PortIo;

/// A validated time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl ClockTime {
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, NvrError> {
        check_range("hours", i64::from(hours), 0, 23)?;
        check_range("minutes", i64::from(minutes), 0, 59)?;
        check_range("seconds", i64::from(seconds), 0, 59)?;
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

/// A validated calendar date. Years 1980-2099, the range the BIOS handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockDate {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl ClockDate {
    pub fn new(day: u8, month: u8, year: u16) -> Result<Self, NvrError> {
        check_range("day", i64::from(day), 1, 31)?;
        check_range("month", i64::from(month), 1, 12)?;
        check_range("year", i64::from(year), 1980, 2099)?;
        Ok(Self { day, month, year })
    }
}

/// Decoded snapshot of the clock and calendar cells.
///
/// `day_of_week` and `month` are clamped to the unknown sentinel 0 when the
/// cells hold garbage; everything else is reported as decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSnapshot {
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    /// 1 = Sunday .. 7 = Saturday, 0 = unknown.
    pub day_of_week: u8,
    pub day_of_month: u8,
    /// 1-12, 0 = unknown.
    pub month: u8,
    /// Full year, century cell included.
    pub year: u16,
    pub data_mode: DataMode,
    pub hour_mode: HourMode,
}

/// One alarm field: a concrete value or the wildcard.
///
/// Any stored byte at or above 0xC0 matches every value of that field,
/// independent of the data mode; an explicit wildcard is stored as exactly
/// 0xC0. Value 0 always encodes as 0x00, distinct from the wildcard range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmField {
    At(u8),
    Any,
}

impl AlarmField {
    fn decode(raw: u8, mode: DataMode) -> Self {
        if raw >= regs::ALARM_WILDCARD {
            Self::Any
        } else {
            Self::At(mode.decode(raw))
        }
    }

    fn encode(self, mode: DataMode) -> u8 {
        match self {
            Self::Any => regs::ALARM_WILDCARD,
            Self::At(v) => mode.encode(v),
        }
    }
}

/// A validated alarm setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlarmSetting {
    pub hours: AlarmField,
    pub minutes: AlarmField,
    pub seconds: AlarmField,
}

impl AlarmSetting {
    /// `None` means wildcard for that field.
    pub fn new(
        hours: Option<u8>,
        minutes: Option<u8>,
        seconds: Option<u8>,
    ) -> Result<Self, NvrError> {
        if let Some(h) = hours {
            check_range("alarm hours", i64::from(h), 0, 23)?;
        }
        if let Some(m) = minutes {
            check_range("alarm minutes", i64::from(m), 0, 59)?;
        }
        if let Some(s) = seconds {
            check_range("alarm seconds", i64::from(s), 0, 59)?;
        }
        let field = |v: Option<u8>| v.map_or(AlarmField::Any, AlarmField::At);
        Ok(Self {
            hours: field(hours),
            minutes: field(minutes),
            seconds: field(seconds),
        })
    }

    /// True when every field is a wildcard (the "not set" state).
    pub fn is_unset(&self) -> bool {
        self.hours == AlarmField::Any
            && self.minutes == AlarmField::Any
            && self.seconds == AlarmField::Any
    }
}

/// Register B flags that can be toggled individually.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegBFlag {
    /// 24-hour format (clear = 12-hour).
    Hour24,
    /// Binary data mode (clear = BCD).
    BinaryMode,
    SquareWave,
    DaylightSavings,
    PeriodicIrq,
    AlarmIrq,
    UpdateIrq,
}

impl RegBFlag {
    fn mask(self) -> u8 {
        match self {
            Self::Hour24 => regs::B_24H,
            Self::BinaryMode => regs::B_DM,
            Self::SquareWave => regs::B_SQWE,
            Self::DaylightSavings => regs::B_DSE,
            Self::PeriodicIrq => regs::B_PIE,
            Self::AlarmIrq => regs::B_AIE,
            Self::UpdateIrq => regs::B_UIE,
        }
    }
}

impl<P: PortIo> NvrBus<P> {
    /// Snapshot and decode the clock, calendar and mode cells.
    ///
    /// Waits for the update cycle to go idle first; on a stuck chip the
    /// read proceeds best-effort after the bounded poll.
    pub fn read_clock(&mut self) -> ClockSnapshot {
        self.wait_update_idle();

        let raw_sec = self.read(regs::SECONDS);
        let raw_min = self.read(regs::MINUTES);
        let raw_hrs = self.read(regs::HOURS);
        let raw_dow = self.read(regs::DAY_OF_WEEK);
        let raw_dom = self.read(regs::DAY_OF_MONTH);
        let raw_mon = self.read(regs::MONTH);
        let raw_yr = self.read(regs::YEAR);
        let raw_cen = self.read(regs::CENTURY);
        let reg_b = self.read(regs::REG_B);

        let mode = DataMode::from_reg_b(reg_b);
        let hours_mode = HourMode::from_reg_b(reg_b);

        ClockSnapshot {
            seconds: mode.decode(raw_sec),
            minutes: mode.decode(raw_min),
            hours: codec::decode_hours(raw_hrs, mode, hours_mode),
            day_of_week: codec::clamp_day_of_week(mode.decode(raw_dow)),
            day_of_month: mode.decode(raw_dom),
            month: codec::clamp_month(mode.decode(raw_mon)),
            year: u16::from(mode.decode(raw_cen)) * 100 + u16::from(mode.decode(raw_yr)),
            data_mode: mode,
            hour_mode: hours_mode,
        }
    }

    /// Write the three time cells as one halted update.
    pub fn set_time(&mut self, time: ClockTime) {
        let reg_b = self.read(regs::REG_B);
        let mode = DataMode::from_reg_b(reg_b);
        let hours_mode = HourMode::from_reg_b(reg_b);
        self.with_updates_halted(|bus| {
            bus.write(regs::SECONDS, mode.encode(time.seconds));
            bus.write(regs::MINUTES, mode.encode(time.minutes));
            bus.write(regs::HOURS, codec::encode_hours(time.hours, mode, hours_mode));
        });
    }

    /// Write the calendar cells (day, month, year, century) as one halted
    /// update.
    pub fn set_date(&mut self, date: ClockDate) {
        let mode = DataMode::from_reg_b(self.read(regs::REG_B));
        let century = (date.year / 100) as u8;
        let year = (date.year % 100) as u8;
        self.with_updates_halted(|bus| {
            bus.write(regs::DAY_OF_MONTH, mode.encode(date.day));
            bus.write(regs::MONTH, mode.encode(date.month));
            bus.write(regs::YEAR, mode.encode(year));
            bus.write(regs::CENTURY, mode.encode(century));
        });
    }

    /// Set the day-of-week cell (1 = Sunday .. 7 = Saturday).
    pub fn set_day_of_week(&mut self, day: u8) -> Result<(), NvrError> {
        check_range("day of week", i64::from(day), 1, 7)?;
        let mode = DataMode::from_reg_b(self.read(regs::REG_B));
        self.with_updates_halted(|bus| {
            bus.write(regs::DAY_OF_WEEK, mode.encode(day));
        });
        Ok(())
    }

    /// Decode the three alarm cells.
    pub fn read_alarm(&mut self) -> AlarmSetting {
        self.wait_update_idle();
        let mode = DataMode::from_reg_b(self.read(regs::REG_B));
        AlarmSetting {
            hours: AlarmField::decode(self.read(regs::ALARM_HOURS), mode),
            minutes: AlarmField::decode(self.read(regs::ALARM_MINUTES), mode),
            seconds: AlarmField::decode(self.read(regs::ALARM_SECONDS), mode),
        }
    }

    /// Write the three alarm cells as one halted update.
    pub fn set_alarm(&mut self, alarm: AlarmSetting) {
        let mode = DataMode::from_reg_b(self.read(regs::REG_B));
        self.with_updates_halted(|bus| {
            bus.write(regs::ALARM_SECONDS, alarm.seconds.encode(mode));
            bus.write(regs::ALARM_MINUTES, alarm.minutes.encode(mode));
            bus.write(regs::ALARM_HOURS, alarm.hours.encode(mode));
        });
    }

    /// Toggle one Register B flag, leaving the rest of the register as-is.
    pub fn set_reg_b_flag(&mut self, flag: RegBFlag, on: bool) {
        let reg_b = self.read(regs::REG_B);
        let updated = if on {
            reg_b | flag.mask()
        } else {
            reg_b & !flag.mask()
        };
        self.write(regs::REG_B, updated);
    }

    /// Set Register A's periodic-interrupt rate-select field (0-15).
    pub fn set_periodic_rate(&mut self, rate: u8) -> Result<(), NvrError> {
        check_range("rate select", i64::from(rate), 0, 15)?;
        let reg_a = self.read(regs::REG_A);
        self.write(regs::REG_A, (reg_a & !regs::A_RS_MASK) | (rate & regs::A_RS_MASK));
        Ok(())
    }

    /// Register D's Valid RAM and Time flag: false means the battery is
    /// dead and the store contents are suspect.
    pub fn battery_ok(&mut self) -> bool {
        self.read(regs::REG_D) & regs::D_VRT != 0
    }
}
