//! Amstrad PC1640 system-status latches.
//!
//! The gate array multiplexes two status bytes onto the keyboard
//! controller's ports. System status 2 comes back one nibble at a time on
//! port 0x62, selected by PB bit 2; system status 1 appears on port 0x60
//! while PB bit 7 is held. Both reads snapshot the PB register first and
//! restore it afterwards, whatever happens in between, so the keyboard
//! path and speaker gates are left exactly as found.

use crate::nvr::regs;
use crate::port::PortIo;

/// Read system status 2 through the port 0x62 nibble protocol.
///
/// PB.2 clear selects the high nibble, PB.2 set the low nibble; each
/// select must settle before the read. Only the low four bits of each
/// port 0x62 read belong to the latch.
pub fn read_system_status2<P: PortIo>(ports: &mut P) -> u8 {
    let pb = ports.read(regs::PB_PORT);

    ports.write(regs::PB_PORT, pb & !regs::PB_NIBBLE_SEL);
    ports.settle();
    let hi = ports.read(regs::STATUS2_PORT) & 0x0F;

    ports.write(regs::PB_PORT, pb | regs::PB_NIBBLE_SEL);
    ports.settle();
    let lo = ports.read(regs::STATUS2_PORT) & 0x0F;

    ports.write(regs::PB_PORT, pb);

    let value = (hi << 4) | lo;
    log::debug!("sysstat2: hi=0x{hi:X} lo=0x{lo:X} => 0x{value:02X}");
    value
}

/// Read system status 1 by holding PB bit 7 over a port 0x60 read.
pub fn read_system_status1<P: PortIo>(ports: &mut P) -> u8 {
    let pb = ports.read(regs::PB_PORT);

    ports.write(regs::PB_PORT, pb | regs::PB_STATUS_MODE);
    ports.settle();
    let value = ports.read(regs::KBD_DATA_PORT);

    ports.write(regs::PB_PORT, pb);

    log::debug!("sysstat1: 0x{value:02X}");
    value
}

/// One row of a latch trace: the value written to port 0x65 and the two
/// nibbles read back through port 0x62.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatchProbe {
    pub written: u8,
    pub high: u8,
    pub low: u8,
}

impl LatchProbe {
    pub fn combined(&self) -> u8 {
        (self.high << 4) | self.low
    }
}

/// Walk latch values 0x00-0x0F through port 0x65 and read each back via
/// the status-2 nibble protocol. Shows whether the gate array's latch
/// path is alive and what it reflects.
pub fn trace_latch<P: PortIo>(ports: &mut P) -> Vec<LatchProbe> {
    (0u8..16)
        .map(|written| {
            ports.write(regs::SYSSTAT2_WR_PORT, written);
            ports.settle();
            let value = read_system_status2(ports);
            LatchProbe {
                written,
                high: value >> 4,
                low: value & 0x0F,
            }
        })
        .collect()
}
