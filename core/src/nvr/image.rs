//! Whole-store images: snapshot, restore, compare, factory defaults.
//!
//! The persisted format is the raw 64-byte store in address order. For
//! backward compatibility with double-size CMOS dumps, a 128-byte file is
//! accepted on load and only its first 64 bytes are used.

use crate::nvr::error::NvrError;
use crate::nvr::regs;
use crate::nvr::NvrBus;
use crate::port::PortIo;

/// Size of the persisted image: one byte per store address.
pub const IMAGE_SIZE: usize = regs::NVR_SIZE;

/// Double-size CMOS images are accepted on load; only the first 64 bytes
/// are used.
const LEGACY_IMAGE_SIZE: usize = 128;

/// A 64-byte snapshot of the configuration store.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NvrImage {
    data: [u8; IMAGE_SIZE],
}

impl NvrImage {
    /// Snapshot the live store, one read per cell, after waiting for the
    /// chip's update cycle to go idle.
    pub fn snapshot<P: PortIo>(bus: &mut NvrBus<P>) -> Self {
        bus.wait_update_idle();
        let mut data = [0u8; IMAGE_SIZE];
        for (addr, cell) in data.iter_mut().enumerate() {
            *cell = bus.read(addr as u8);
        }
        Self { data }
    }

    /// Parse an image from file contents. Exactly 64 or 128 bytes;
    /// anything else is a size error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NvrError> {
        if bytes.len() != IMAGE_SIZE && bytes.len() != LEGACY_IMAGE_SIZE {
            return Err(NvrError::ImageSize {
                actual: bytes.len() as u64,
            });
        }
        let mut data = [0u8; IMAGE_SIZE];
        data.copy_from_slice(&bytes[..IMAGE_SIZE]);
        Ok(Self { data })
    }

    pub fn as_bytes(&self) -> &[u8; IMAGE_SIZE] {
        &self.data
    }

    /// Read one cell of the snapshot. `addr` is masked like live access.
    pub fn get(&self, addr: u8) -> u8 {
        self.data[(addr & regs::ADDR_MASK) as usize]
    }

    /// List the cells where the two images differ, as
    /// `(addr, self_value, other_value)`.
    pub fn diff(&self, other: &Self) -> Vec<(u8, u8, u8)> {
        (0..IMAGE_SIZE as u8)
            .filter(|&a| self.data[a as usize] != other.data[a as usize])
            .map(|a| (a, self.data[a as usize], other.data[a as usize]))
            .collect()
    }
}

impl std::fmt::Debug for NvrImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NvrImage({} bytes)", IMAGE_SIZE)
    }
}

/// Human-readable label for a store cell, for diff/compare reports.
pub fn cell_name(addr: u8) -> Option<&'static str> {
    Some(match addr {
        regs::SECONDS => "Seconds",
        regs::ALARM_SECONDS => "Alarm seconds",
        regs::MINUTES => "Minutes",
        regs::ALARM_MINUTES => "Alarm minutes",
        regs::HOURS => "Hours",
        regs::ALARM_HOURS => "Alarm hours",
        regs::DAY_OF_WEEK => "Day of week",
        regs::DAY_OF_MONTH => "Day of month",
        regs::MONTH => "Month",
        regs::YEAR => "Year",
        regs::REG_A => "Register A",
        regs::REG_B => "Register B",
        regs::REG_C => "Register C (flags)",
        regs::REG_D => "Register D (battery)",
        regs::DIAG => "Diagnostic status",
        regs::SHUTDOWN => "Shutdown status",
        regs::FLOPPY => "Floppy types",
        regs::DISK => "Hard disk types",
        regs::EQUIP => "Equipment byte",
        regs::BASEMEM_LO => "Base mem low",
        regs::BASEMEM_HI => "Base mem high",
        regs::EXTMEM_LO => "Ext mem low",
        regs::EXTMEM_HI => "Ext mem high",
        regs::DISK0_EXT => "HD0 ext type",
        regs::DISK1_EXT => "HD1 ext type",
        regs::CHECKSUM_HI => "Checksum high",
        regs::CHECKSUM_LO => "Checksum low",
        regs::CENTURY => "Century",
        _ => return None,
    })
}

impl<P: PortIo> NvrBus<P> {
    /// Write an image back to the store.
    ///
    /// The whole sequence runs with updates halted. Registers C and D are
    /// read-only and skipped -- they keep whatever the hardware holds.
    /// Free-running state is restored from the *loaded* Register B value
    /// with its SET bit forced clear, so the image's mode bits take effect
    /// and the clock is guaranteed to resume.
    pub fn restore_image(&mut self, image: &NvrImage) {
        let reg_b = self.read(regs::REG_B);
        self.write(regs::REG_B, reg_b | regs::B_SET);

        for addr in 0..IMAGE_SIZE as u8 {
            if addr == regs::REG_B || addr == regs::REG_C || addr == regs::REG_D {
                continue;
            }
            self.write(addr, image.get(addr));
        }

        self.write(regs::REG_B, image.get(regs::REG_B) & !regs::B_SET);
    }

    /// Reset the store to the PC1640 factory configuration.
    ///
    /// 24-hour BCD clock, standard 32.768 kHz divider with a 1024 Hz
    /// periodic rate, one 720 KB floppy, no hard disk, EGA video, 640 KB
    /// base memory, alarm disabled (all wildcards). The checksum is
    /// updated last, after the clock is resumed.
    pub fn factory_reset(&mut self) {
        let reg_b = self.read(regs::REG_B);
        self.write(regs::REG_B, reg_b | regs::B_SET);

        self.write(regs::REG_A, 0x26); // DV=010, RS=0110
        self.write(regs::DIAG, 0x00);
        self.write(regs::SHUTDOWN, 0x00);
        self.write(regs::FLOPPY, 0x30); // drive A = 720 KB 3.5"
        self.write(regs::DISK, 0x00);
        self.write(regs::EQUIP, 0x01); // floppy present, EGA, no FPU
        self.write(regs::BASEMEM_LO, 0x80); // 640 KB
        self.write(regs::BASEMEM_HI, 0x02);
        self.write(regs::EXTMEM_LO, 0x00);
        self.write(regs::EXTMEM_HI, 0x00);
        self.write(regs::DISK0_EXT, 0x00);
        self.write(regs::DISK1_EXT, 0x00);
        self.write(regs::CENTURY, 0x20);

        self.write(regs::ALARM_SECONDS, regs::ALARM_WILDCARD);
        self.write(regs::ALARM_MINUTES, regs::ALARM_WILDCARD);
        self.write(regs::ALARM_HOURS, regs::ALARM_WILDCARD);

        for addr in 0x1B..=0x2D {
            self.write(addr, 0x00);
        }
        for addr in 0x33..=0x3F {
            self.write(addr, 0x00);
        }

        // Resume updates: 24-hour, BCD, all interrupts off.
        self.write(regs::REG_B, regs::B_24H);

        self.update_checksum();
    }

    /// Fill a cell range with one value, skipping the read-only registers.
    /// The checksum is brought up to date when the range overlaps the
    /// covered region.
    pub fn fill(&mut self, start: u8, end: u8, value: u8) -> Result<(), NvrError> {
        if start > end || end as usize >= regs::NVR_SIZE {
            return Err(NvrError::FillRange { start, end });
        }
        for addr in start..=end {
            if addr == regs::REG_C || addr == regs::REG_D {
                continue;
            }
            self.write(addr, value);
        }
        if start <= 0x2D && end >= 0x10 {
            self.update_checksum();
        }
        Ok(())
    }
}
