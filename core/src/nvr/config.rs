//! Typed views over the user-configuration cells.
//!
//! Floppy and hard-disk type nibbles, the equipment byte, the memory size
//! pairs and the POST diagnostic bytes. Every setter goes through
//! [`write_config`](crate::nvr::NvrBus::write_config) so the checksum pair
//! stays coherent with the cells it covers.

use crate::nvr::error::{check_range, NvrError};
use crate::nvr::regs;
use crate::nvr::NvrBus;
use crate::port::PortIo;

/// Floppy drive select for the type nibbles at 0x10 (high = A, low = B).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloppyDrive {
    A,
    B,
}

/// BIOS floppy type table name, or None for codes past 4.
pub fn floppy_type_name(ftype: u8) -> Option<&'static str> {
    Some(match ftype {
        0 => "Not installed",
        1 => "360 KB 5.25\" DD",
        2 => "1.2 MB 5.25\" HD",
        3 => "720 KB 3.5\" DD",
        4 => "1.44 MB 3.5\" HD",
        _ => return None,
    })
}

/// Decoded floppy type byte plus the equipment byte's drive count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloppyConfig {
    pub raw: u8,
    pub drive_a: u8,
    pub drive_b: u8,
    /// Number of drives the equipment byte claims are installed.
    pub equip_count: u8,
}

/// Standard AT BIOS hard-disk geometry, consulted for types 1-14.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HdGeometry {
    pub cylinders: u16,
    pub heads: u8,
    /// Write-precompensation cylinder; None when the type disables it.
    pub precomp: Option<u16>,
    pub landing_zone: u16,
    pub sectors: u8,
}

impl HdGeometry {
    /// Approximate formatted capacity assuming 512-byte sectors.
    pub fn capacity_mb(&self) -> u32 {
        u32::from(self.cylinders) * u32::from(self.heads) * u32::from(self.sectors) * 512
            / (1024 * 1024)
    }
}

/// Geometry for a standard type code 1-14. Type 15 is the extended-type
/// escape and has no geometry of its own.
pub fn hd_geometry(hd_type: u8) -> Option<HdGeometry> {
    let g = |cylinders, heads, precomp, landing_zone, sectors| HdGeometry {
        cylinders,
        heads,
        precomp,
        landing_zone,
        sectors,
    };
    Some(match hd_type {
        1 => g(306, 4, Some(128), 305, 17),
        2 => g(615, 4, Some(300), 615, 17),
        3 => g(615, 6, Some(300), 615, 17),
        4 => g(940, 8, Some(512), 940, 17),
        5 => g(940, 6, Some(512), 940, 17),
        6 => g(615, 4, None, 615, 17),
        7 => g(462, 8, Some(256), 511, 17),
        8 => g(733, 5, None, 733, 17),
        9 => g(900, 15, None, 901, 17),
        10 => g(820, 3, None, 820, 17),
        11 => g(855, 5, None, 855, 17),
        12 => g(855, 7, None, 855, 17),
        13 => g(306, 8, Some(128), 319, 17),
        14 => g(733, 7, None, 733, 17),
        _ => return None,
    })
}

/// Resolved type of one hard-disk slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardDiskType {
    NotInstalled,
    /// Type 1-14, geometry from the standard table.
    Standard(u8),
    /// Nibble 15: the real type lives in the extended cell.
    Extended(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HardDiskConfig {
    pub raw: u8,
    pub drive0: HardDiskType,
    pub drive1: HardDiskType,
}

fn resolve_hd(nibble: u8, ext: u8) -> HardDiskType {
    match nibble {
        0 => HardDiskType::NotInstalled,
        0x0F => HardDiskType::Extended(ext),
        t => HardDiskType::Standard(t),
    }
}

/// Initial video mode field of the equipment byte (bits 4-5).
pub fn video_mode_name(mode: u8) -> &'static str {
    match mode & 0x03 {
        0 => "EGA/VGA (built-in PEGA)",
        1 => "40-column CGA",
        2 => "80-column CGA",
        _ => "MDA/Hercules",
    }
}

/// Decoded equipment byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Equipment {
    pub raw: u8,
    pub floppy_installed: bool,
    pub fpu_installed: bool,
    /// Initial video mode 0-3.
    pub video: u8,
    /// Installed floppy drives, 0-4. Zero when the installed bit is clear
    /// regardless of the count field.
    pub floppy_count: u8,
}

impl Equipment {
    pub fn from_byte(raw: u8) -> Self {
        let floppy_installed = raw & 0x01 != 0;
        Self {
            raw,
            floppy_installed,
            fpu_installed: raw & 0x02 != 0,
            video: (raw >> 4) & 0x03,
            floppy_count: if floppy_installed {
                ((raw >> 6) & 0x03) + 1
            } else {
                0
            },
        }
    }
}

/// Memory sizes from the little-endian KB pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryConfig {
    pub base_kb: u16,
    pub extended_kb: u16,
}

/// Decoded POST diagnostic byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagStatus {
    pub raw: u8,
}

impl DiagStatus {
    pub fn is_clear(&self) -> bool {
        self.raw == 0
    }

    pub fn power_lost(&self) -> bool {
        self.raw & 0x80 != 0
    }

    /// Human-readable message per set bit, highest first.
    pub fn messages(&self) -> Vec<&'static str> {
        const BITS: [(u8, &str); 8] = [
            (0x80, "RTC lost power (battery failed during outage)"),
            (0x40, "CMOS checksum bad"),
            (0x20, "Invalid configuration info"),
            (0x10, "Memory size mismatch (POST vs CMOS)"),
            (0x08, "Hard disk controller init failed"),
            (0x04, "Time invalid"),
            (0x02, "Installed adapters error"),
            (0x01, "Timeout reading adapter ROM"),
        ];
        BITS.iter()
            .filter(|(mask, _)| self.raw & mask != 0)
            .map(|&(_, msg)| msg)
            .collect()
    }
}

/// BIOS shutdown-status code description.
pub fn shutdown_description(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "Normal POST",
        0x01 => "Chip set init for real mode return",
        0x04 => "Jump to bootstrap (INT 19h)",
        0x05 => "User-defined warm boot",
        0x09 => "Return to real mode (block move)",
        0x0A => "Jump to DWORD at 0040:0067",
        _ => return None,
    })
}

/// Battery state from two independent sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryHealth {
    /// Register D valid-RAM-and-time bit: the cell contents are trustworthy.
    pub vrt: bool,
    /// Diagnostic bit 7: POST recorded a power loss at some point.
    pub power_was_lost: bool,
}

impl<P: PortIo> NvrBus<P> {
    pub fn read_floppy(&mut self) -> FloppyConfig {
        let raw = self.read(regs::FLOPPY);
        FloppyConfig {
            raw,
            drive_a: (raw >> 4) & 0x0F,
            drive_b: raw & 0x0F,
            equip_count: Equipment::from_byte(self.read(regs::EQUIP)).floppy_count,
        }
    }

    /// Set one floppy type nibble, type 0-4.
    pub fn set_floppy(&mut self, drive: FloppyDrive, ftype: u8) -> Result<(), NvrError> {
        check_range("floppy type", i64::from(ftype), 0, 4)?;
        let raw = self.read(regs::FLOPPY);
        let raw = match drive {
            FloppyDrive::A => (raw & 0x0F) | (ftype << 4),
            FloppyDrive::B => (raw & 0xF0) | ftype,
        };
        self.write_config(regs::FLOPPY, raw);
        Ok(())
    }

    pub fn read_hard_disk(&mut self) -> HardDiskConfig {
        let raw = self.read(regs::DISK);
        let ext0 = self.read(regs::DISK0_EXT);
        let ext1 = self.read(regs::DISK1_EXT);
        HardDiskConfig {
            raw,
            drive0: resolve_hd((raw >> 4) & 0x0F, ext0),
            drive1: resolve_hd(raw & 0x0F, ext1),
        }
    }

    /// Set a hard-disk type nibble, 0-15. `drive` is 0 or 1.
    pub fn set_hard_disk(&mut self, drive: u8, hd_type: u8) -> Result<(), NvrError> {
        check_range("hard disk drive", i64::from(drive), 0, 1)?;
        check_range("hard disk type", i64::from(hd_type), 0, 15)?;
        let raw = self.read(regs::DISK);
        let raw = if drive == 0 {
            (raw & 0x0F) | (hd_type << 4)
        } else {
            (raw & 0xF0) | hd_type
        };
        self.write_config(regs::DISK, raw);
        Ok(())
    }

    pub fn read_equipment(&mut self) -> Equipment {
        Equipment::from_byte(self.read(regs::EQUIP))
    }

    pub fn set_fpu_installed(&mut self, installed: bool) {
        let raw = self.read(regs::EQUIP);
        let raw = if installed { raw | 0x02 } else { raw & !0x02 };
        self.write_config(regs::EQUIP, raw);
    }

    /// Initial video mode, 0-3.
    pub fn set_video_mode(&mut self, mode: u8) -> Result<(), NvrError> {
        check_range("video mode", i64::from(mode), 0, 3)?;
        let raw = self.read(regs::EQUIP);
        self.write_config(regs::EQUIP, (raw & !0x30) | (mode << 4));
        Ok(())
    }

    /// Installed floppy count, 0-4. Zero clears the installed bit and the
    /// count field together.
    pub fn set_floppy_count(&mut self, count: u8) -> Result<(), NvrError> {
        check_range("floppy count", i64::from(count), 0, 4)?;
        let raw = self.read(regs::EQUIP);
        let raw = if count == 0 {
            raw & !0xC1
        } else {
            ((raw | 0x01) & !0xC0) | ((count - 1) << 6)
        };
        self.write_config(regs::EQUIP, raw);
        Ok(())
    }

    pub fn read_memory(&mut self) -> MemoryConfig {
        let base_kb =
            u16::from(self.read(regs::BASEMEM_LO)) | (u16::from(self.read(regs::BASEMEM_HI)) << 8);
        let extended_kb =
            u16::from(self.read(regs::EXTMEM_LO)) | (u16::from(self.read(regs::EXTMEM_HI)) << 8);
        MemoryConfig {
            base_kb,
            extended_kb,
        }
    }

    /// Base memory in KB, 64-640.
    pub fn set_base_memory(&mut self, kb: u16) -> Result<(), NvrError> {
        check_range("base memory KB", i64::from(kb), 64, 640)?;
        self.write_config(regs::BASEMEM_LO, (kb & 0xFF) as u8);
        self.write_config(regs::BASEMEM_HI, (kb >> 8) as u8);
        Ok(())
    }

    pub fn read_diagnostics(&mut self) -> DiagStatus {
        DiagStatus {
            raw: self.read(regs::DIAG),
        }
    }

    pub fn read_shutdown_code(&mut self) -> u8 {
        self.read(regs::SHUTDOWN)
    }

    pub fn clear_diagnostics(&mut self) {
        self.write(regs::DIAG, 0x00);
    }

    pub fn read_battery(&mut self) -> BatteryHealth {
        BatteryHealth {
            vrt: self.battery_ok(),
            power_was_lost: self.read_diagnostics().power_lost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockBoard;

    #[test]
    fn floppy_nibbles_decode_independently() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.set_floppy(FloppyDrive::A, 3).unwrap();
        bus.set_floppy(FloppyDrive::B, 4).unwrap();
        let f = bus.read_floppy();
        assert_eq!(f.raw, 0x34);
        assert_eq!(f.drive_a, 3);
        assert_eq!(f.drive_b, 4);
        assert!(bus.verify_checksum());
        assert!(bus.set_floppy(FloppyDrive::A, 5).is_err());
    }

    #[test]
    fn floppy_names() {
        assert_eq!(floppy_type_name(0), Some("Not installed"));
        assert_eq!(floppy_type_name(3), Some("720 KB 3.5\" DD"));
        assert_eq!(floppy_type_name(5), None);
    }

    #[test]
    fn hd_geometry_table() {
        let t2 = hd_geometry(2).unwrap();
        assert_eq!(t2.cylinders, 615);
        assert_eq!(t2.heads, 4);
        assert_eq!(t2.capacity_mb(), 20);
        let t9 = hd_geometry(9).unwrap();
        assert_eq!(t9.precomp, None);
        assert_eq!(t9.capacity_mb(), 112);
        assert_eq!(hd_geometry(0), None);
        assert_eq!(hd_geometry(15), None);
    }

    #[test]
    fn hard_disk_extended_escape() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.set_hard_disk(0, 15).unwrap();
        bus.write_config(regs::DISK0_EXT, 47);
        bus.set_hard_disk(1, 2).unwrap();
        let hd = bus.read_hard_disk();
        assert_eq!(hd.drive0, HardDiskType::Extended(47));
        assert_eq!(hd.drive1, HardDiskType::Standard(2));
        assert!(bus.set_hard_disk(0, 16).is_err());
        assert!(bus.set_hard_disk(2, 1).is_err());
    }

    #[test]
    fn equipment_fields_roundtrip() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.set_floppy_count(2).unwrap();
        bus.set_fpu_installed(true);
        bus.set_video_mode(3).unwrap();
        let e = bus.read_equipment();
        assert!(e.floppy_installed);
        assert!(e.fpu_installed);
        assert_eq!(e.video, 3);
        assert_eq!(e.floppy_count, 2);
        assert!(bus.verify_checksum());

        bus.set_floppy_count(0).unwrap();
        let e = bus.read_equipment();
        assert!(!e.floppy_installed);
        assert_eq!(e.floppy_count, 0);
    }

    #[test]
    fn floppy_count_zero_when_not_installed() {
        // Count field says 2 drives but the installed bit is clear.
        let e = Equipment::from_byte(0x40);
        assert_eq!(e.floppy_count, 0);
    }

    #[test]
    fn memory_pairs_are_little_endian() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.set_base_memory(640).unwrap();
        let m = bus.read_memory();
        assert_eq!(m.base_kb, 640);
        assert_eq!(bus.read(regs::BASEMEM_LO), 0x80);
        assert_eq!(bus.read(regs::BASEMEM_HI), 0x02);
        assert!(bus.verify_checksum());
        assert!(bus.set_base_memory(63).is_err());
        assert!(bus.set_base_memory(641).is_err());
    }

    #[test]
    fn diag_decode_and_clear() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(regs::DIAG, 0x84);
        let d = bus.read_diagnostics();
        assert!(!d.is_clear());
        assert!(d.power_lost());
        assert_eq!(
            d.messages(),
            vec![
                "RTC lost power (battery failed during outage)",
                "Time invalid"
            ]
        );
        bus.clear_diagnostics();
        assert!(bus.read_diagnostics().is_clear());
    }

    #[test]
    fn shutdown_codes() {
        assert_eq!(shutdown_description(0x00), Some("Normal POST"));
        assert_eq!(shutdown_description(0x04), Some("Jump to bootstrap (INT 19h)"));
        assert_eq!(shutdown_description(0x42), None);
    }

    #[test]
    fn battery_view_combines_both_sources() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(regs::DIAG, 0x80);
        let b = bus.read_battery();
        assert!(b.vrt);
        assert!(b.power_was_lost);
        bus.ports_mut().set_battery_ok(false);
        assert!(!bus.read_battery().vrt);
    }
}
