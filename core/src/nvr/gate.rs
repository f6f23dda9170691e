//! Atomic update gating.
//!
//! The chip copies its internal counters into the time cells once a second.
//! Two disciplines keep multi-byte access consistent with that cycle:
//! setting Register B's SET bit halts the copy for the duration of a
//! multi-cell write, and polling Register A's UIP flag before a read keeps
//! the read clear of an in-flight update.

use crate::nvr::regs;
use crate::nvr::NvrBus;
use crate::port::PortIo;

/// Iterations of the UIP poll before giving up. The chip clears UIP within
/// ~244us, so exhausting this means a stuck or absent chip, not a transient.
const UIP_POLL_LIMIT: u32 = 10_000;

/// Iterations of the seconds-change poll used by watch mode.
const SECOND_POLL_LIMIT: u32 = 100_000;

/// Decoded Register C flags, captured by a single effectful read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IrqFlags {
    pub raw: u8,
    /// Composite IRQ flag.
    pub irq: bool,
    pub periodic: bool,
    pub alarm: bool,
    pub update_ended: bool,
}

impl IrqFlags {
    pub fn from_byte(raw: u8) -> Self {
        Self {
            raw,
            irq: raw & regs::C_IRQF != 0,
            periodic: raw & regs::C_PF != 0,
            alarm: raw & regs::C_AF != 0,
            update_ended: raw & regs::C_UF != 0,
        }
    }
}

impl<P: PortIo> NvrBus<P> {
    /// Run `f` with clock updates halted.
    ///
    /// Snapshots Register B, sets SET, runs the closure, then restores the
    /// snapshot with SET clear. Any write touching two or more time, date
    /// or alarm cells as one logical update must go through here so a
    /// reader never observes a partially updated set.
    pub fn with_updates_halted<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let reg_b = self.read(regs::REG_B);
        self.write(regs::REG_B, reg_b | regs::B_SET);
        let result = f(self);
        self.write(regs::REG_B, reg_b & !regs::B_SET);
        result
    }

    /// Poll until the chip's update cycle is idle.
    ///
    /// Returns false if the flag never cleared; the caller proceeds with a
    /// best-effort read rather than blocking on broken hardware. The bound
    /// is an iteration count, not a duration -- host speed changes how long
    /// it really waits, which is accepted.
    pub fn wait_update_idle(&mut self) -> bool {
        for _ in 0..UIP_POLL_LIMIT {
            if self.read(regs::REG_A) & regs::A_UIP == 0 {
                return true;
            }
        }
        log::warn!("RTC update-in-progress flag never cleared; reading anyway");
        false
    }

    /// Read and consume Register C.
    ///
    /// The hardware clears every interrupt flag on read, so this both
    /// returns a value and mutates chip state. Capture the result once per
    /// logical check; a second read will not repeat the answer.
    pub fn take_interrupt_flags(&mut self) -> IrqFlags {
        IrqFlags::from_byte(self.read(regs::REG_C))
    }

    /// Busy-poll until the seconds cell moves off `last_seconds`, bounded
    /// by an iteration count. Returns false on exhaustion. Used by the
    /// continuous-display mode to pace itself to the chip.
    pub fn wait_second_change(&mut self, last_seconds: u8) -> bool {
        for _ in 0..SECOND_POLL_LIMIT {
            if self.read(regs::SECONDS) != last_seconds {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockBoard;

    #[test]
    fn halt_bracket_sets_and_restores() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(regs::REG_B, 0x22); // AIE + 24H
        bus.with_updates_halted(|bus| {
            assert_eq!(bus.read(regs::REG_B), 0x22 | regs::B_SET);
        });
        assert_eq!(bus.read(regs::REG_B), 0x22);
    }

    #[test]
    fn halt_bracket_restore_clears_a_preexisting_set() {
        let mut bus = NvrBus::new(MockBoard::new());
        // SET already on (e.g. a previous run died mid-update): the
        // bracket still leaves the clock free-running afterwards.
        bus.write(regs::REG_B, regs::B_SET | regs::B_24H);
        bus.with_updates_halted(|_| {});
        assert_eq!(bus.read(regs::REG_B), regs::B_24H);
    }

    #[test]
    fn wait_update_idle_consumes_scripted_uip() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.ports_mut().script_uip(5);
        assert!(bus.wait_update_idle());
        assert_eq!(bus.ports_mut().uip_reads, 0);
    }

    #[test]
    fn wait_update_idle_times_out_but_returns() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.ports_mut().script_uip(u32::MAX);
        assert!(!bus.wait_update_idle());
    }

    #[test]
    fn interrupt_flags_read_once() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.ports_mut().cmos[regs::REG_C as usize] = regs::C_IRQF | regs::C_AF;
        let flags = bus.take_interrupt_flags();
        assert!(flags.irq);
        assert!(flags.alarm);
        assert!(!flags.periodic);
        assert_eq!(bus.ports_mut().reg_c_reads, 1);
        // The hardware already cleared the flags.
        let again = bus.take_interrupt_flags();
        assert_eq!(again.raw, 0);
    }

    #[test]
    fn second_change_poll_gives_up() {
        let mut bus = NvrBus::new(MockBoard::new());
        bus.write(regs::SECONDS, 30);
        assert!(!bus.wait_second_change(30));
        assert!(bus.wait_second_change(29));
    }
}
