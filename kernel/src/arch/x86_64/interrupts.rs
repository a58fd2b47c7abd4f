//! RFLAGS.IF control for the current core.

use x86_64::instructions::interrupts;

/// Enable interrupts (`sti`).
#[inline]
pub fn enable() {
    interrupts::enable();
}

/// Disable interrupts (`cli`).
#[inline]
pub fn disable() {
    interrupts::disable();
}

/// Check RFLAGS.IF.
#[inline]
pub fn are_enabled() -> bool {
    interrupts::are_enabled()
}

/// Enable interrupts and halt until the next one (`sti; hlt`).
///
/// `sti` holds off delivery until after the following instruction, so an
/// interrupt pending here wakes the `hlt` instead of slipping in before it.
#[inline]
pub fn enable_and_halt() {
    interrupts::enable_and_hlt();
}
