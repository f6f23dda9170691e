mod common;

use common::test_bus;
use nvr_core::latch::{read_system_status1, read_system_status2, trace_latch};
use nvr_core::nvr::regs;

// ==========================================================================
// Nibble-multiplexed status reads
// ==========================================================================

#[test]
fn test_status2_combines_high_then_low_nibble() {
    let mut bus = test_bus();
    bus.ports_mut().sysstat2 = 0x9C;
    bus.ports_mut().status2_high = 0xF0; // junk in the raw upper bits
    assert_eq!(read_system_status2(bus.ports_mut()), 0x9C);
}

#[test]
fn test_status2_restores_pb_exactly() {
    let mut bus = test_bus();
    // Speaker gates on and the low nibble already selected.
    let pb = 0x03 | regs::PB_NIBBLE_SEL;
    bus.ports_mut().pb = pb;
    bus.ports_mut().sysstat2 = 0x55;
    assert_eq!(read_system_status2(bus.ports_mut()), 0x55);
    assert_eq!(bus.ports_mut().pb, pb);
}

#[test]
fn test_status1_gates_port_60_and_restores() {
    let mut bus = test_bus();
    bus.ports_mut().sysstat1 = 0x2D;
    bus.ports_mut().scancode = 0x1C;
    bus.ports_mut().pb = 0x01;

    assert_eq!(read_system_status1(bus.ports_mut()), 0x2D);
    assert_eq!(bus.ports_mut().pb, 0x01);
    // Port 0x60 is back to keyboard data once PB.7 drops.
    assert_eq!(
        nvr_core::port::PortIo::read(bus.ports_mut(), regs::KBD_DATA_PORT),
        0x1C
    );
}

// ==========================================================================
// Latch trace
// ==========================================================================

#[test]
fn test_latch_trace_walks_all_sixteen_values() {
    let mut bus = test_bus();
    let rows = trace_latch(bus.ports_mut());
    assert_eq!(rows.len(), 16);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.written, i as u8);
        assert_eq!(row.combined(), i as u8);
    }
    assert_eq!(bus.ports_mut().pb, 0);
}
