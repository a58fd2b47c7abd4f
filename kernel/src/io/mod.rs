/*
 * Input/Output System
 *
 * Low-level register access (port I/O behind the `Io` trait) and the
 * character-device abstraction that drivers expose through the device
 * filesystem.
 */

pub mod device;
pub mod pio;

#[cfg(target_arch = "x86_64")]
pub use pio::Pio;
pub use pio::{Io, ReadOnly};

pub use device::{Device, Errno, S_IFCHR, S_IFDIR, S_IFMT, Stat};
