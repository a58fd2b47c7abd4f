//! Simulated interrupt-enable flag, one per thread.

use std::cell::Cell;

thread_local! {
    static INTERRUPTS_ENABLED: Cell<bool> = const { Cell::new(true) };
}

pub fn enable() {
    INTERRUPTS_ENABLED.with(|flag| flag.set(true));
}

pub fn disable() {
    INTERRUPTS_ENABLED.with(|flag| flag.set(false));
}

pub fn are_enabled() -> bool {
    INTERRUPTS_ENABLED.with(Cell::get)
}

/// Enable interrupts, then give up the time slice in place of `hlt`.
pub fn enable_and_halt() {
    enable();
    std::thread::yield_now();
}
