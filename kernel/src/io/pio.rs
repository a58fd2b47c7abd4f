/*
 * Register I/O
 *
 * `Io` is the register-access trait device drivers are written against.
 * On x86 the implementation is `Pio`, byte-wide port I/O through IN/OUT;
 * any other implementation (a recorded register bank in tests, for
 * instance) drives the same driver code.
 */

use core::ops::{BitAnd, BitOr, Not};

/// A single device register.
pub trait Io {
    /// Register width.
    type Value: Copy + PartialEq + BitAnd<Output = Self::Value> + BitOr<Output = Self::Value> + Not<Output = Self::Value>;

    /// Read the register.
    fn read(&self) -> Self::Value;

    /// Write the register.
    fn write(&mut self, value: Self::Value);

    /// True if every bit of `flags` is set.
    fn readf(&self, flags: Self::Value) -> bool {
        (self.read() & flags) == flags
    }

    /// Set or clear `flags`, preserving the other bits.
    fn writef(&mut self, flags: Self::Value, value: bool) {
        let current = self.read();
        self.write(if value { current | flags } else { current & !flags });
    }
}

/// Read-only view of a register (status registers).
pub struct ReadOnly<I> {
    inner: I,
}

impl<I> ReadOnly<I> {
    pub const fn new(inner: I) -> ReadOnly<I> {
        ReadOnly { inner }
    }
}

impl<I: Io> ReadOnly<I> {
    #[inline(always)]
    pub fn read(&self) -> I::Value {
        self.inner.read()
    }

    pub fn readf(&self, flags: I::Value) -> bool {
        self.inner.readf(flags)
    }
}

/// Port I/O register.
#[cfg(target_arch = "x86_64")]
#[derive(Copy, Clone)]
pub struct Pio<T> {
    port: u16,
    value: core::marker::PhantomData<T>,
}

#[cfg(target_arch = "x86_64")]
impl<T> Pio<T> {
    /// Register at I/O port `port`.
    pub const fn new(port: u16) -> Self {
        Pio::<T> {
            port,
            value: core::marker::PhantomData,
        }
    }
}

#[cfg(target_arch = "x86_64")]
impl Io for Pio<u8> {
    type Value = u8;

    #[inline(always)]
    fn read(&self) -> u8 {
        let value: u8;
        unsafe {
            core::arch::asm!("in al, dx", in("dx") self.port, out("al") value, options(nostack, nomem, preserves_flags));
        }
        value
    }

    #[inline(always)]
    fn write(&mut self, value: u8) {
        unsafe {
            core::arch::asm!("out dx, al", in("dx") self.port, in("al") value, options(nostack, nomem, preserves_flags));
        }
    }
}
