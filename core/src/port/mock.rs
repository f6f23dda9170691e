//! Emulated PC1640 board for testing.
//!
//! [`MockBoard`] implements [`PortIo`](super::PortIo) over an in-memory
//! model of exactly the hardware the tool drives: the MC146818 address/data
//! port pair in front of a 64-byte store, and the Amstrad PB register with
//! its nibble-multiplexed status ports. Tests construct a board, script its
//! state, run the real protocol stack against it, and then assert both on
//! results and on the bookkeeping counters (settle discipline, index
//! masking, Register C consumption).

use crate::nvr::regs;
use crate::port::PortIo;

/// In-memory PC1640 board.
///
/// Protocol bookkeeping:
/// - `protocol_faults` counts data-port accesses issued without a settle
///   after the preceding address write (a real-hardware correctness bug);
/// - `max_index_written` records the largest raw value ever written to the
///   address port, so tests can prove the software masks to 6 bits;
/// - `reg_c_reads` counts Register C reads (each one clears the flags, so
///   a correct caller performs at most one per logical check).
pub struct MockBoard {
    /// Backing store, directly poke-able by tests. Register A's UIP bit is
    /// overlaid from the script, and Register C is cleared by reads.
    pub cmos: [u8; regs::NVR_SIZE],

    index: u8,
    index_settled: bool,

    /// Remaining Register A reads that report Update In Progress.
    pub uip_reads: u32,

    pub protocol_faults: u32,
    pub max_index_written: u8,
    pub reg_c_reads: u32,
    pub settle_count: u32,

    /// PB register (port 0x61).
    pub pb: u8,
    /// System status 1 latch, returned from port 0x60 while PB.7 is set.
    pub sysstat1: u8,
    /// System status 2 latch, served one nibble at a time on port 0x62.
    pub sysstat2: u8,
    /// Bits 7-4 of a raw port 0x62 read (speaker output, NMI status).
    pub status2_high: u8,
    /// Keyboard scancode returned from port 0x60 while PB.7 is clear.
    pub scancode: u8,
}

impl MockBoard {
    /// Create a board with a zeroed store and a healthy battery.
    pub fn new() -> Self {
        let mut cmos = [0u8; regs::NVR_SIZE];
        cmos[regs::REG_D as usize] = regs::D_VRT;
        Self {
            cmos,
            index: 0,
            index_settled: true,
            uip_reads: 0,
            protocol_faults: 0,
            max_index_written: 0,
            reg_c_reads: 0,
            settle_count: 0,
            pb: 0,
            sysstat1: 0,
            sysstat2: 0,
            status2_high: 0,
            scancode: 0,
        }
    }

    /// Report Update In Progress for the next `reads` Register A reads.
    pub fn script_uip(&mut self, reads: u32) {
        self.uip_reads = reads;
    }

    /// Set the battery-health flag in Register D.
    pub fn set_battery_ok(&mut self, ok: bool) {
        self.cmos[regs::REG_D as usize] = if ok { regs::D_VRT } else { 0 };
    }

    fn data_read(&mut self) -> u8 {
        if !self.index_settled {
            self.protocol_faults += 1;
        }
        match self.index {
            i if i == regs::REG_A => {
                let base = self.cmos[regs::REG_A as usize] & !regs::A_UIP;
                if self.uip_reads > 0 {
                    self.uip_reads -= 1;
                    base | regs::A_UIP
                } else {
                    base
                }
            }
            i if i == regs::REG_C => {
                self.reg_c_reads += 1;
                let flags = self.cmos[regs::REG_C as usize];
                self.cmos[regs::REG_C as usize] = 0;
                flags
            }
            i => self.cmos[i as usize],
        }
    }

    fn data_write(&mut self, value: u8) {
        if !self.index_settled {
            self.protocol_faults += 1;
        }
        match self.index {
            // Registers C and D are read-only; the chip ignores writes.
            i if i == regs::REG_C || i == regs::REG_D => {}
            // Register A's UIP bit is read-only.
            i if i == regs::REG_A => self.cmos[i as usize] = value & !regs::A_UIP,
            i => self.cmos[i as usize] = value,
        }
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PortIo for MockBoard {
    fn read(&mut self, port: u16) -> u8 {
        match port {
            regs::ADDR_PORT => self.index,
            regs::DATA_PORT => self.data_read(),
            regs::PB_PORT => self.pb,
            regs::STATUS2_PORT => {
                let nibble = if self.pb & regs::PB_NIBBLE_SEL == 0 {
                    self.sysstat2 >> 4
                } else {
                    self.sysstat2 & 0x0F
                };
                (self.status2_high & 0xF0) | nibble
            }
            regs::KBD_DATA_PORT => {
                if self.pb & regs::PB_STATUS_MODE != 0 {
                    self.sysstat1
                } else {
                    self.scancode
                }
            }
            _ => 0xFF, // floating bus
        }
    }

    fn write(&mut self, port: u16, value: u8) {
        match port {
            regs::ADDR_PORT => {
                self.max_index_written = self.max_index_written.max(value);
                self.index = value & regs::ADDR_MASK;
                self.index_settled = false;
            }
            regs::DATA_PORT => self.data_write(value),
            regs::PB_PORT => self.pb = value,
            regs::SYSSTAT1_WR_PORT => self.sysstat1 = value,
            // Latching an NVR address makes that address readable back
            // through the status-2 nibble protocol.
            regs::SYSSTAT2_WR_PORT => self.sysstat2 = value,
            crate::port::DELAY_PORT => self.settle(),
            _ => {}
        }
    }

    fn settle(&mut self) {
        self.index_settled = true;
        self.settle_count += 1;
    }
}
