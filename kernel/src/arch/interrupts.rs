/*
 * Interrupt Management Module
 *
 * Architecture-independent interrupt control built on the selected
 * backend's three primitives (read, set and clear the interrupt-enable
 * flag of the current core).
 *
 * The central piece is `IrqState`: the interrupt-enable state captured
 * immediately before a critical section masked interrupts. Restoring it
 * puts the core back exactly as it was, so critical sections nest and
 * can be entered from interrupt context, where interrupts are already
 * masked.
 */

use super::imp::interrupts as cpu;

/// Enable interrupts on the current core.
///
/// Should only be called after the interrupt tables have been set up.
pub fn enable() {
    cpu::enable();
}

/// Disable interrupts on the current core.
pub fn disable() {
    cpu::disable();
}

/// Check if interrupts are enabled on the current core.
pub fn are_enabled() -> bool {
    cpu::are_enabled()
}

/// Sleep until the next interrupt unless `pending` reports work.
///
/// `pending` runs with interrupts masked and the core halts with the enable
/// in the same step, so an interrupt that queues work after the check still
/// wakes the halt. Interrupts are enabled on return.
pub fn wait_for_interrupt_unless<F>(pending: F)
where
    F: FnOnce() -> bool,
{
    disable();
    if pending() {
        enable();
    } else {
        cpu::enable_and_halt();
    }
}

/// Interrupt-enable state saved by [`save_and_disable`].
#[must_use = "dropping an IrqState leaves interrupts masked"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqState {
    were_enabled: bool,
}

impl IrqState {
    /// Whether interrupts were enabled when the state was captured.
    pub fn were_enabled(self) -> bool {
        self.were_enabled
    }
}

/// Capture the current interrupt-enable state and mask interrupts.
pub fn save_and_disable() -> IrqState {
    let were_enabled = are_enabled();
    if were_enabled {
        disable();
    }
    IrqState { were_enabled }
}

/// Restore the interrupt-enable state captured by [`save_and_disable`].
///
/// Interrupts are re-enabled only if they were enabled at capture time.
pub fn restore(state: IrqState) {
    if state.were_enabled {
        enable();
    }
}

/// Execute a closure with interrupts disabled
///
/// The previous interrupt-enable state is restored afterwards.
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let state = save_and_disable();
    let result = f();
    restore(state);
    result
}

/// RAII guard that disables interrupts for its lifetime
///
/// # Example
/// ```ignore
/// let _guard = DisableInterrupts::new();
/// // Critical section - interrupts are disabled
/// // Previous state restored when _guard is dropped
/// ```
pub struct DisableInterrupts {
    state: IrqState,
}

impl DisableInterrupts {
    /// Create a new interrupt guard, disabling interrupts
    pub fn new() -> Self {
        Self {
            state: save_and_disable(),
        }
    }
}

impl Default for DisableInterrupts {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DisableInterrupts {
    fn drop(&mut self) {
        restore(self.state);
    }
}
