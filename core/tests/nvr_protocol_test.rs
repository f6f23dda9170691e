mod common;

use common::test_bus;
use nvr_core::nvr::regs;

// ==========================================================================
// Address/data protocol tests
// ==========================================================================

#[test]
fn test_every_address_aliases_mod_64() {
    let mut bus = test_bus();
    for addr in 0u8..64 {
        bus.write(addr, addr ^ 0x5A);
    }
    // All 256 possible address bytes resolve to cell addr % 64.
    for addr in 0u16..=255 {
        let addr = addr as u8;
        assert_eq!(bus.read(addr), (addr & 0x3F) ^ 0x5A, "addr 0x{addr:02X}");
    }
}

#[test]
fn test_index_port_never_sees_unmasked_address() {
    let mut bus = test_bus();
    bus.write(0xFF, 0x12);
    bus.read(0xC5);
    // Masking happens in software before the port write, not in the mock.
    assert!(bus.ports_mut().max_index_written <= regs::ADDR_MASK);
}

#[test]
fn test_settle_follows_every_address_write() {
    let mut bus = test_bus();
    bus.write(0x10, 0xAA);
    bus.read(0x10);
    assert_eq!(bus.ports_mut().protocol_faults, 0);
    // One settle per address select plus one per data write.
    assert_eq!(bus.ports_mut().settle_count, 3);
}

#[test]
fn test_read_only_registers_ignore_writes() {
    let mut bus = test_bus();
    bus.write(regs::REG_C, 0xFF);
    bus.write(regs::REG_D, 0x00);
    bus.ports_mut().cmos[regs::REG_C as usize] = 0;
    assert_eq!(bus.read(regs::REG_C), 0);
    assert_eq!(bus.read(regs::REG_D), regs::D_VRT);
}

// ==========================================================================
// Register C consumption
// ==========================================================================

#[test]
fn test_interrupt_flags_consumed_by_single_read() {
    let mut bus = test_bus();
    bus.ports_mut().cmos[regs::REG_C as usize] = regs::C_IRQF | regs::C_PF | regs::C_UF;
    let flags = bus.take_interrupt_flags();
    assert!(flags.irq && flags.periodic && flags.update_ended && !flags.alarm);
    assert_eq!(bus.ports_mut().reg_c_reads, 1);
    assert_eq!(bus.take_interrupt_flags().raw, 0);
}
