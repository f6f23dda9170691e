//! NVR/RTC access and consistency layer.
//!
//! Everything that talks to the 64-byte battery-backed store lives here:
//! the address/data register protocol ([`bus`]), the binary/BCD time codec
//! ([`codec`]), the update-gating discipline for consistent multi-byte
//! access ([`gate`]), the checksum over the user-configuration region
//! ([`checksum`]), the clock/alarm operations ([`clock`]), whole-store
//! images ([`image`]) and the typed BIOS configuration views ([`config`]).

pub mod bus;
pub mod checksum;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod gate;
pub mod image;
pub mod regs;

pub use bus::NvrBus;
pub use error::NvrError;
pub use image::NvrImage;
