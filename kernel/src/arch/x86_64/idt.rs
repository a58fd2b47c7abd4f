/*
 * Interrupt Descriptor Table (IDT) Implementation
 *
 * The IDT tells the CPU which code to run for each exception and interrupt
 * vector. Entries 0-31 are CPU exceptions; the remapped PIC lines start at
 * PIC_1_OFFSET.
 *
 * Hardware interrupt entry points do no work of their own: they build an
 * `IrqContext` for their line and hand it to `irq::dispatch`, which calls
 * whichever driver registered for that line (or acknowledges the line if
 * nobody did).
 */

use lazy_static::lazy_static;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};

use crate::config::{COM1_IRQ, PIC_1_OFFSET};
use crate::irq::{self, IrqContext};

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.double_fault.set_handler_fn(double_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);

        // IRQ 4 - Serial COM1
        idt[PIC_1_OFFSET + COM1_IRQ].set_handler_fn(com1_interrupt_handler);

        idt
    };
}

/// Load the Interrupt Descriptor Table
///
/// Must be called before interrupts are enabled.
pub fn init() {
    IDT.load();
    log::info!("IDT loaded");
}

// Exception handlers

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    log::info!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    _stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    // Critical error - halt immediately without panic
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!(
        "EXCEPTION: GENERAL PROTECTION FAULT (Error Code: {})\n{:#?}",
        error_code, stack_frame
    );
}

extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    panic!(
        "EXCEPTION: PAGE FAULT ({:?}) at {:?}\n{:#?}",
        error_code,
        x86_64::registers::control::Cr2::read(),
        stack_frame
    );
}

// Hardware interrupt handlers

extern "x86-interrupt" fn com1_interrupt_handler(_stack_frame: InterruptStackFrame) {
    irq::dispatch(&IrqContext::new(COM1_IRQ));
}
