mod common;

use common::{factory_bus, test_bus};
use nvr_core::nvr::image::{cell_name, NvrImage};
use nvr_core::nvr::regs;

// ==========================================================================
// Snapshot / restore round trips
// ==========================================================================

#[test]
fn test_restore_reproduces_a_factory_snapshot() {
    let mut bus = factory_bus();
    let saved = NvrImage::snapshot(&mut bus);

    // Scribble over the configuration, then bring the image back.
    bus.fill(0x10, 0x3F, 0xDB).unwrap();
    bus.restore_image(&saved);

    let restored = NvrImage::snapshot(&mut bus);
    assert!(saved.diff(&restored).is_empty());
    assert!(bus.verify_checksum());
}

#[test]
fn test_restore_leaves_hardware_status_registers_alone() {
    let mut bus = test_bus();
    bus.ports_mut().cmos[regs::REG_C as usize] = 0x00;

    let image = NvrImage::from_bytes(&[0x77u8; 64]).unwrap();
    bus.restore_image(&image);

    assert_eq!(bus.ports_mut().cmos[regs::REG_C as usize], 0x00);
    assert_eq!(bus.ports_mut().cmos[regs::REG_D as usize], regs::D_VRT);
    assert_eq!(bus.read(0x3F), 0x77);
}

#[test]
fn test_restore_never_leaves_the_clock_halted() {
    let mut bus = test_bus();
    let mut bytes = [0u8; 64];
    bytes[regs::REG_B as usize] = regs::B_SET | regs::B_24H;
    bus.restore_image(&NvrImage::from_bytes(&bytes).unwrap());
    assert_eq!(bus.read(regs::REG_B), regs::B_24H);
}

#[test]
fn test_legacy_double_size_image_loads() {
    let mut bytes = vec![0u8; 128];
    bytes[regs::FLOPPY as usize] = 0x34;
    bytes[100] = 0xEE; // ignored tail
    let image = NvrImage::from_bytes(&bytes).unwrap();
    assert_eq!(image.get(regs::FLOPPY), 0x34);
}

#[test]
fn test_odd_sized_images_are_rejected() {
    assert!(NvrImage::from_bytes(&[0u8; 32]).is_err());
    assert!(NvrImage::from_bytes(&[0u8; 127]).is_err());
    assert!(NvrImage::from_bytes(&[]).is_err());
}

// ==========================================================================
// Compare
// ==========================================================================

#[test]
fn test_diff_names_the_interesting_cells() {
    let mut bus = factory_bus();
    let before = NvrImage::snapshot(&mut bus);
    bus.write_config(regs::FLOPPY, 0x44);
    let after = NvrImage::snapshot(&mut bus);

    let changes = before.diff(&after);
    let addrs: Vec<u8> = changes.iter().map(|&(a, _, _)| a).collect();
    // The floppy byte and both checksum cells moved.
    assert!(addrs.contains(&regs::FLOPPY));
    assert!(addrs.contains(&regs::CHECKSUM_LO));
    assert_eq!(cell_name(regs::FLOPPY), Some("Floppy types"));
}
