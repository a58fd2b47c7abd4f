/*
 * Hosted Architecture Backend
 *
 * Stand-ins for the bare-metal primitives when the kernel core runs as an
 * ordinary process (tests, the hosted boot binary):
 *
 * - interrupts: a per-thread interrupt-enable flag, so each thread behaves
 *   like its own core
 * - serial: a UART whose transmitter is stdout and whose receive FIFO is
 *   fed by `serial::inject`
 * - pic: an interrupt controller that counts EOIs per line
 */

pub mod interrupts;
pub mod pic;
pub mod serial;

use crate::irq::InterruptController;

/// Bring up the platform. Nothing to program when hosted.
pub fn init() {
    log::debug!("Hosted platform: no interrupt controller to program");
}

/// Idle the current "core" until something else happens.
pub fn halt() {
    std::thread::yield_now();
}

/// The platform interrupt controller.
pub fn interrupt_controller() -> &'static dyn InterruptController {
    &pic::PIC
}
