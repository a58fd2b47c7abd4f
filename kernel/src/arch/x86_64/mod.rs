/*
 * x86_64 Architecture Support Module
 *
 * Bare-metal backend of the architecture shim.
 *
 * Submodules:
 * - idt: Interrupt Descriptor Table, exception stubs and IRQ entry points
 * - interrupts: RFLAGS.IF control
 * - pic: chained 8259 PICs (remap, masks, EOI)
 * - serial: the 16550 UART on port I/O
 */

pub mod idt;
pub mod interrupts;
pub mod pic;
pub mod serial;

use crate::irq::InterruptController;

/// Program the interrupt controller and load the IDT.
///
/// Must run before interrupts are enabled.
pub fn init() {
    pic::init();
    idt::init();
}

/// Halt the CPU until the next interrupt.
pub fn halt() {
    ::x86_64::instructions::hlt();
}

/// The platform interrupt controller.
pub fn interrupt_controller() -> &'static dyn InterruptController {
    &pic::PIC
}
