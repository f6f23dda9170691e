//! Byte-wide I/O port access.
//!
//! Everything the tool does goes through [`PortIo`]: two-byte register
//! handshakes on the RTC chip, the Amstrad status-latch nibble protocol,
//! and raw peek/poke. The trait keeps the hardware behind a seam so the
//! whole protocol stack can run against an emulated board in tests.

pub mod mock;

pub use mock::MockBoard;

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;

/// Port used purely for its bus-settling side effect. Writing any value
/// takes ~1us on the 8 MHz 8086 and touches no device.
pub const DELAY_PORT: u16 = 0x80;

/// Single-byte I/O port access plus the bus-settling delay primitive.
///
/// The settle delay is part of the register protocols built on top of this
/// trait, not an optional nicety: on real hardware, reading the data port
/// immediately after selecting an address returns garbage.
pub trait PortIo {
    /// Read one byte from an I/O port.
    fn read(&mut self, port: u16) -> u8;

    /// Write one byte to an I/O port.
    fn write(&mut self, port: u16, value: u8);

    /// Wait for the I/O bus to settle (roughly 1us on the original host).
    fn settle(&mut self);
}

/// Port access through Linux `/dev/port`.
///
/// Opening the device requires root; that is the single privileged step,
/// taken once at startup. A failure here is fatal to the whole run --
/// there is no per-call fallback.
pub struct DevPort {
    file: File,
}

impl DevPort {
    /// Open `/dev/port` for read/write access.
    pub fn open() -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/port")?;
        Ok(Self { file })
    }
}

impl PortIo for DevPort {
    fn read(&mut self, port: u16) -> u8 {
        let mut buf = [0u8; 1];
        match self.file.read_exact_at(&mut buf, u64::from(port)) {
            Ok(()) => buf[0],
            Err(e) => {
                // Model a failed cycle as a floating bus.
                log::error!("port 0x{port:04X} read failed: {e}");
                0xFF
            }
        }
    }

    fn write(&mut self, port: u16, value: u8) {
        if let Err(e) = self.file.write_all_at(&[value], u64::from(port)) {
            log::error!("port 0x{port:04X} write failed: {e}");
        }
    }

    fn settle(&mut self) {
        self.write(DELAY_PORT, 0x00);
    }
}
