use nvr_core::nvr::NvrBus;
use nvr_core::port::MockBoard;

/// Bus over a fresh emulated board: zeroed store, healthy battery.
pub fn test_bus() -> NvrBus<MockBoard> {
    NvrBus::new(MockBoard::new())
}

/// Bus over a board holding the factory configuration: 24-hour BCD clock,
/// one 720 KB floppy, 640 KB base memory, alarm disabled, checksum valid.
pub fn factory_bus() -> NvrBus<MockBoard> {
    let mut bus = test_bus();
    bus.factory_reset();
    bus
}
