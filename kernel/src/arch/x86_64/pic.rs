/*
 * 8259 Programmable Interrupt Controller
 *
 * The legacy PICs are remapped to vectors 32..48 so IRQs do not collide
 * with CPU exceptions. Only the console line is unmasked; every other line
 * stays masked because nothing in the driver core handles it.
 */

use pic8259::ChainedPics;

use crate::config::{COM1_IRQ, PIC_1_OFFSET, PIC_2_OFFSET};
use crate::irq::InterruptController;
use crate::sync::SpinLock;

/// Remapped master/slave pair.
static PICS: SpinLock<ChainedPics> =
    SpinLock::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// End-of-interrupt handle for the chained PICs.
pub struct Pic8259;

/// The platform controller handed out by `arch::interrupt_controller`.
pub static PIC: Pic8259 = Pic8259;

/// Initialize the PICs and unmask the console IRQ.
pub fn init() {
    let mut pics = PICS.lock_disable_irq();
    unsafe {
        pics.initialize();
        // Master: only the console line. Slave: everything masked.
        pics.write_masks(!(1u8 << COM1_IRQ), 0xFF);
    }
    let [master, slave] = unsafe { pics.read_masks() };
    log::info!(
        "PIC masks after init: master=0x{:02x} slave=0x{:02x}",
        master,
        slave
    );
}

impl InterruptController for Pic8259 {
    fn end_of_interrupt(&self, irq: u8) {
        let mut pics = PICS.lock_disable_irq();
        unsafe { pics.notify_end_of_interrupt(PIC_1_OFFSET + irq) };
    }
}
