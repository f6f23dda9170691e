mod common;

use common::{factory_bus, test_bus};
use nvr_core::nvr::config::{FloppyDrive, HardDiskType};
use nvr_core::nvr::regs;

// ==========================================================================
// Checksum policy across the typed setters
// ==========================================================================

#[test]
fn test_every_config_setter_keeps_checksum_valid() {
    let mut bus = factory_bus();
    bus.set_floppy(FloppyDrive::B, 4).unwrap();
    assert!(bus.verify_checksum());
    bus.set_hard_disk(0, 2).unwrap();
    assert!(bus.verify_checksum());
    bus.set_fpu_installed(true);
    assert!(bus.verify_checksum());
    bus.set_video_mode(2).unwrap();
    assert!(bus.verify_checksum());
    bus.set_floppy_count(2).unwrap();
    assert!(bus.verify_checksum());
    bus.set_base_memory(512).unwrap();
    assert!(bus.verify_checksum());
}

#[test]
fn test_time_and_diag_writes_leave_checksum_alone() {
    let mut bus = factory_bus();
    let stored = bus.stored_checksum();
    // Below the covered range.
    bus.write_config(regs::DIAG, 0x80);
    bus.write_config(regs::SECONDS, 0x30);
    // Above it.
    bus.write_config(regs::CENTURY, 0x19);
    assert_eq!(bus.stored_checksum(), stored);
}

#[test]
fn test_raw_write_inside_range_is_detected() {
    let mut bus = factory_bus();
    bus.write(regs::FLOPPY, 0x44); // no ledger update
    assert!(!bus.verify_checksum());
    bus.update_checksum();
    assert!(bus.verify_checksum());
}

// ==========================================================================
// Factory defaults
// ==========================================================================

#[test]
fn test_factory_defaults_match_the_pc1640() {
    let mut bus = factory_bus();
    assert_eq!(bus.read(regs::REG_A), 0x26);
    assert_eq!(bus.read(regs::REG_B), 0x02); // 24-hour BCD, everything else off
    assert_eq!(bus.read(regs::FLOPPY), 0x30);
    assert_eq!(bus.read(regs::EQUIP), 0x01);
    assert_eq!(bus.read_memory().base_kb, 640);
    assert_eq!(bus.read_memory().extended_kb, 0);
    assert_eq!(bus.read(regs::CENTURY), 0x20);
    assert!(bus.read_alarm().is_unset());
    assert!(bus.verify_checksum());

    let f = bus.read_floppy();
    assert_eq!(f.drive_a, 3); // 720 KB 3.5"
    assert_eq!(f.drive_b, 0);
    assert_eq!(f.equip_count, 1);

    let hd = bus.read_hard_disk();
    assert_eq!(hd.drive0, HardDiskType::NotInstalled);
    assert_eq!(hd.drive1, HardDiskType::NotInstalled);
}

// ==========================================================================
// Battery and diagnostics
// ==========================================================================

#[test]
fn test_battery_view_reports_both_failure_paths() {
    let mut bus = test_bus();
    let healthy = bus.read_battery();
    assert!(healthy.vrt);
    assert!(!healthy.power_was_lost);

    bus.ports_mut().set_battery_ok(false);
    bus.write(regs::DIAG, 0x80);
    let failed = bus.read_battery();
    assert!(!failed.vrt);
    assert!(failed.power_was_lost);
}

#[test]
fn test_clear_diagnostics_resets_the_byte() {
    let mut bus = test_bus();
    bus.write(regs::DIAG, 0xC4);
    assert_eq!(bus.read_diagnostics().messages().len(), 3);
    bus.clear_diagnostics();
    assert!(bus.read_diagnostics().is_clear());
}
