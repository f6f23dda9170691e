//! Register map for the MC146818 RTC/NVR chip and the Amstrad ports that
//! share its bus.
//!
//! The PC1640 exposes a 64-byte battery-backed store (mask 0x3F) through
//! the standard address/data port pair. Cells 0x00-0x0D belong to the
//! clock chip itself; the rest is BIOS configuration data.

/// RTC/NVR address register (write the cell index here).
pub const ADDR_PORT: u16 = 0x70;
/// RTC/NVR data register (read/write the selected cell here).
pub const DATA_PORT: u16 = 0x71;

/// The PC1640 carries a 64-byte store; larger addresses alias into it.
pub const NVR_SIZE: usize = 64;
/// Cell addresses are masked to 6 bits, never rejected.
pub const ADDR_MASK: u8 = 0x3F;

// -- Time/date/alarm cells --------------------------------------------------

pub const SECONDS: u8 = 0x00;
pub const ALARM_SECONDS: u8 = 0x01;
pub const MINUTES: u8 = 0x02;
pub const ALARM_MINUTES: u8 = 0x03;
pub const HOURS: u8 = 0x04;
pub const ALARM_HOURS: u8 = 0x05;
pub const DAY_OF_WEEK: u8 = 0x06;
pub const DAY_OF_MONTH: u8 = 0x07;
pub const MONTH: u8 = 0x08;
pub const YEAR: u8 = 0x09;
/// Vendor extension outside the chip's native register set (BCD, e.g. 0x20).
pub const CENTURY: u8 = 0x32;

// -- Status registers -------------------------------------------------------

pub const REG_A: u8 = 0x0A;
pub const REG_B: u8 = 0x0B;
/// Read-only; reading clears all interrupt flags.
pub const REG_C: u8 = 0x0C;
/// Read-only; carries the battery-health (VRT) flag.
pub const REG_D: u8 = 0x0D;

/// Register A: Update In Progress (read-only bit).
pub const A_UIP: u8 = 0x80;
/// Register A: oscillator divider select field.
pub const A_DV_MASK: u8 = 0x70;
pub const A_DV_SHIFT: u8 = 4;
/// Register A: periodic interrupt rate select field.
pub const A_RS_MASK: u8 = 0x0F;

/// Register B: SET -- halt clock updates for safe multi-byte access.
pub const B_SET: u8 = 0x80;
/// Register B: periodic interrupt enable.
pub const B_PIE: u8 = 0x40;
/// Register B: alarm interrupt enable.
pub const B_AIE: u8 = 0x20;
/// Register B: update-ended interrupt enable.
pub const B_UIE: u8 = 0x10;
/// Register B: square wave output enable.
pub const B_SQWE: u8 = 0x08;
/// Register B: data mode, 1 = binary, 0 = BCD.
pub const B_DM: u8 = 0x04;
/// Register B: 1 = 24-hour format, 0 = 12-hour.
pub const B_24H: u8 = 0x02;
/// Register B: daylight savings enable.
pub const B_DSE: u8 = 0x01;

/// Register C: composite IRQ flag.
pub const C_IRQF: u8 = 0x80;
/// Register C: periodic interrupt flag.
pub const C_PF: u8 = 0x40;
/// Register C: alarm flag.
pub const C_AF: u8 = 0x20;
/// Register C: update-ended flag.
pub const C_UF: u8 = 0x10;

/// Register D: Valid RAM and Time (battery OK).
pub const D_VRT: u8 = 0x80;

// -- BIOS configuration cells -----------------------------------------------

/// Diagnostic status byte (POST results).
pub const DIAG: u8 = 0x0E;
/// Shutdown status byte.
pub const SHUTDOWN: u8 = 0x0F;
/// Floppy drive types (high nibble = A, low nibble = B).
pub const FLOPPY: u8 = 0x10;
/// Hard disk types (high nibble = drive 0, low nibble = drive 1).
pub const DISK: u8 = 0x12;
/// Equipment byte.
pub const EQUIP: u8 = 0x14;
/// Base memory in KB, little-endian pair.
pub const BASEMEM_LO: u8 = 0x15;
pub const BASEMEM_HI: u8 = 0x16;
/// Extended memory in KB, little-endian pair.
pub const EXTMEM_LO: u8 = 0x17;
pub const EXTMEM_HI: u8 = 0x18;
/// Hard disk 0 extended type (consulted when the 0x12 nibble is 0xF).
pub const DISK0_EXT: u8 = 0x19;
/// Hard disk 1 extended type.
pub const DISK1_EXT: u8 = 0x1A;
/// Stored checksum over 0x10-0x2D, big-endian pair.
pub const CHECKSUM_HI: u8 = 0x2E;
pub const CHECKSUM_LO: u8 = 0x2F;

/// Alarm cells at or above this value match any time (wildcard).
pub const ALARM_WILDCARD: u8 = 0xC0;

// -- Amstrad system ports ---------------------------------------------------

/// Keyboard scancode, or system status 1 when PB.7 is set.
pub const KBD_DATA_PORT: u16 = 0x60;
/// PB register: speaker gate/enable, nibble select, kbd reset, status mode.
pub const PB_PORT: u16 = 0x61;
/// System status 2, nibble-selected by PB.2.
pub const STATUS2_PORT: u16 = 0x62;
/// System status 1 latch (write side).
pub const SYSSTAT1_WR_PORT: u16 = 0x64;
/// System status 2 latch / NVR latch address (write side).
pub const SYSSTAT2_WR_PORT: u16 = 0x65;

/// PB.2: 0 = status 2 high nibble on port 0x62, 1 = low nibble.
pub const PB_NIBBLE_SEL: u8 = 0x04;
/// PB.7: 0 = port 0x60 reads keyboard data, 1 = system status 1.
pub const PB_STATUS_MODE: u8 = 0x80;

// -- Decoded register views -------------------------------------------------

/// Decoded Register A fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegA {
    pub raw: u8,
    /// Update In Progress: the chip is mid-way through its once-a-second
    /// copy of the time fields; reads would race it.
    pub update_in_progress: bool,
    /// Oscillator divider select (0-7).
    pub divider: u8,
    /// Periodic interrupt rate select (0-15).
    pub rate: u8,
}

impl RegA {
    pub fn from_byte(raw: u8) -> Self {
        Self {
            raw,
            update_in_progress: raw & A_UIP != 0,
            divider: (raw & A_DV_MASK) >> A_DV_SHIFT,
            rate: raw & A_RS_MASK,
        }
    }
}

/// Decoded Register B flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegB {
    pub raw: u8,
    pub set: bool,
    pub periodic_irq: bool,
    pub alarm_irq: bool,
    pub update_irq: bool,
    pub square_wave: bool,
    /// true = binary data mode, false = BCD.
    pub binary_mode: bool,
    /// true = 24-hour format, false = 12-hour.
    pub hour_24: bool,
    pub daylight_savings: bool,
}

impl RegB {
    pub fn from_byte(raw: u8) -> Self {
        Self {
            raw,
            set: raw & B_SET != 0,
            periodic_irq: raw & B_PIE != 0,
            alarm_irq: raw & B_AIE != 0,
            update_irq: raw & B_UIE != 0,
            square_wave: raw & B_SQWE != 0,
            binary_mode: raw & B_DM != 0,
            hour_24: raw & B_24H != 0,
            daylight_savings: raw & B_DSE != 0,
        }
    }
}
