//! The two-register NVR access protocol.
//!
//! Every cell access is an address phase on port 0x70 followed by a data
//! phase on port 0x71, with a bus-settle delay between the phases. The
//! address is masked to 6 bits before touching hardware: larger addresses
//! alias into the valid range, a deliberate legacy compatibility behavior,
//! not an error.

use crate::nvr::regs;
use crate::port::PortIo;

/// Register-protocol access to the 64-byte configuration store.
///
/// Owns the port backend. No caching: every `read` and `write` is a fresh
/// hardware transaction, so the store can change under us (the clock cells
/// do, once a second) without any software state going stale.
pub struct NvrBus<P: PortIo> {
    ports: P,
}

impl<P: PortIo> NvrBus<P> {
    pub fn new(ports: P) -> Self {
        Self { ports }
    }

    /// Direct access to the underlying ports, for the status-latch
    /// protocols and raw peek/poke that bypass NVR addressing.
    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    pub fn into_ports(self) -> P {
        self.ports
    }

    /// Read one cell. `addr` is masked to 6 bits.
    pub fn read(&mut self, addr: u8) -> u8 {
        let addr = addr & regs::ADDR_MASK;
        self.ports.write(regs::ADDR_PORT, addr);
        self.ports.settle();
        let value = self.ports.read(regs::DATA_PORT);
        log::trace!("nvr read  [0x{addr:02X}] = 0x{value:02X}");
        value
    }

    /// Write one cell. `addr` is masked to 6 bits.
    ///
    /// All 64 addresses are writable from this layer's point of view;
    /// callers are expected to know that Registers C and D are read-only
    /// and avoid them.
    pub fn write(&mut self, addr: u8, value: u8) {
        let addr = addr & regs::ADDR_MASK;
        log::trace!("nvr write [0x{addr:02X}] = 0x{value:02X}");
        self.ports.write(regs::ADDR_PORT, addr);
        self.ports.settle();
        self.ports.write(regs::DATA_PORT, value);
        self.ports.settle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockBoard;

    #[test]
    fn read_write_roundtrip() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(0x20, 0xAB);
        assert_eq!(bus.read(0x20), 0xAB);
    }

    #[test]
    fn addresses_alias_mod_64() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(0x20, 0x11);
        // 0x60 & 0x3F == 0x20
        assert_eq!(bus.read(0x60), 0x11);
        bus.write(0xE0, 0x22);
        assert_eq!(bus.read(0x20), 0x22);
    }

    #[test]
    fn hardware_never_sees_an_unmasked_index() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(0xFF, 0x55);
        bus.read(0xC7);
        assert!(bus.ports_mut().max_index_written <= regs::ADDR_MASK);
    }

    #[test]
    fn every_phase_is_settled() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(0x10, 0x01);
        bus.read(0x10);
        assert_eq!(bus.ports_mut().protocol_faults, 0);
        // write = addr+data settles, read = addr settle
        assert_eq!(bus.ports_mut().settle_count, 3);
    }
}
