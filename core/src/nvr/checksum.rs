//! Checksum over the user-configuration region.
//!
//! Cells 0x10-0x2D (the BIOS configuration data, excluding the time/date
//! cells, status registers and the checksum pair itself) are covered by a
//! 16-bit sum stored big-endian at 0x2E/0x2F. Any write into the covered
//! range recomputes and persists the sum before the operation is considered
//! durable; writes outside it must leave the stored sum untouched.

use std::ops::RangeInclusive;

use crate::nvr::regs;
use crate::nvr::NvrBus;
use crate::port::PortIo;

/// The covered sub-range of the store.
pub const CHECKSUM_RANGE: RangeInclusive<u8> = 0x10..=0x2D;

impl<P: PortIo> NvrBus<P> {
    /// Sum the live bytes of the covered range as wrapping 16-bit
    /// arithmetic.
    pub fn compute_checksum(&mut self) -> u16 {
        let mut sum: u16 = 0;
        for addr in CHECKSUM_RANGE {
            sum = sum.wrapping_add(u16::from(self.read(addr)));
        }
        sum
    }

    /// Reassemble the stored checksum pair, high cell first.
    pub fn stored_checksum(&mut self) -> u16 {
        (u16::from(self.read(regs::CHECKSUM_HI)) << 8) | u16::from(self.read(regs::CHECKSUM_LO))
    }

    /// Compare the live sum against the stored pair.
    ///
    /// A mismatch is reported, never auto-corrected; repair happens only
    /// through an explicit [`update_checksum`](Self::update_checksum).
    pub fn verify_checksum(&mut self) -> bool {
        let computed = self.compute_checksum();
        let stored = self.stored_checksum();
        log::debug!("checksum stored=0x{stored:04X} computed=0x{computed:04X}");
        computed == stored
    }

    /// Recompute the sum and persist it to the checksum pair.
    pub fn update_checksum(&mut self) -> u16 {
        let sum = self.compute_checksum();
        self.write(regs::CHECKSUM_HI, (sum >> 8) as u8);
        self.write(regs::CHECKSUM_LO, (sum & 0xFF) as u8);
        sum
    }

    /// Write a cell and keep the checksum coherent.
    ///
    /// The range check is applied here, dynamically, so raw writes to
    /// arbitrary addresses get the right policy without the caller knowing
    /// where the covered region ends. Writes outside the range never touch
    /// the checksum pair.
    pub fn write_config(&mut self, addr: u8, value: u8) {
        let addr = addr & regs::ADDR_MASK;
        self.write(addr, value);
        if CHECKSUM_RANGE.contains(&addr) {
            self.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockBoard;

    #[test]
    fn sum_covers_all_thirty_cells() {
        let mut bus = NvrBus::new(MockBoard::new());
        for addr in CHECKSUM_RANGE {
            bus.write(addr, 0xFF);
        }
        assert_eq!(bus.compute_checksum(), 30 * 0xFF);
    }

    #[test]
    fn config_write_updates_stored_sum() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write_config(regs::FLOPPY, 0x30);
        assert!(bus.verify_checksum());
        assert_eq!(bus.stored_checksum(), 0x30);
    }

    #[test]
    fn write_outside_range_leaves_sum_alone() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write_config(regs::FLOPPY, 0x30);
        let stored = bus.stored_checksum();
        bus.write_config(regs::DIAG, 0xAA); // 0x0E, below the range
        bus.write_config(0x33, 0xBB); // above the range
        assert_eq!(bus.stored_checksum(), stored);
    }

    #[test]
    fn range_boundaries() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write_config(0x10, 1);
        bus.write_config(0x2D, 1);
        assert_eq!(bus.stored_checksum(), 2);
        assert!(bus.verify_checksum());
        // 0x2E/0x2F are the checksum pair itself, not covered.
        bus.write(regs::CHECKSUM_LO, 0x99);
        assert!(!bus.verify_checksum());
    }

    #[test]
    fn mismatch_is_not_auto_repaired() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write_config(regs::EQUIP, 0x01);
        bus.write(regs::FLOPPY, 0x40); // bypasses the ledger
        assert!(!bus.verify_checksum());
        assert!(!bus.verify_checksum()); // still bad: verify has no side effects
        bus.update_checksum();
        assert!(bus.verify_checksum());
    }
}
