/*
 * Hardware Interrupt Dispatch
 *
 * Drivers claim a legacy IRQ line by registering a handler object; the
 * architecture's interrupt entry point turns the vector into an
 * `IrqContext` and calls `dispatch`.
 *
 * Handlers run in interrupt context: they must not allocate, must not
 * block, and their only synchronization primitive is the IRQ-masking spin
 * lock. A handler that services the interrupt sends its own
 * end-of-interrupt. A line nobody claimed, or an interrupt its handler was
 * not ready for, is acknowledged here so the controller keeps delivering.
 */

use thiserror::Error;

use crate::sync::SpinLock;

/// Number of legacy (8259) IRQ lines.
pub const IRQ_LINES: usize = 16;

/// What an interrupt handler learns about the interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqContext {
    /// Legacy IRQ line that fired.
    pub irq: u8,
}

impl IrqContext {
    pub const fn new(irq: u8) -> Self {
        Self { irq }
    }
}

/// Outcome of [`IrqHandler::handle_irq`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Serviced, EOI already sent by the handler.
    Handled,
    /// Not serviced; the dispatcher sends the EOI.
    NotHandled,
}

/// A driver-side interrupt handler.
pub trait IrqHandler: Sync {
    /// Service the interrupt described by `ctx`. Returns `Handled` only
    /// after sending the EOI itself.
    fn handle_irq(&self, ctx: &IrqContext) -> IrqReturn;
}

/// End-of-interrupt acknowledgement of the platform interrupt controller.
pub trait InterruptController: Sync {
    fn end_of_interrupt(&self, irq: u8);
}

/// Errors returned by [`IrqTable::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IrqError {
    #[error("IRQ line {0} does not exist")]
    InvalidLine(u8),
    #[error("IRQ line {0} already has a handler")]
    AlreadyRegistered(u8),
}

/// Handler slot per IRQ line.
pub struct IrqTable {
    handlers: SpinLock<[Option<&'static dyn IrqHandler>; IRQ_LINES]>,
}

impl IrqTable {
    pub const fn new() -> Self {
        Self {
            handlers: SpinLock::new([None; IRQ_LINES]),
        }
    }

    /// Claim `irq` for `handler`.
    pub fn register(&self, irq: u8, handler: &'static dyn IrqHandler) -> Result<(), IrqError> {
        let mut handlers = self.handlers.lock_disable_irq();
        let slot = handlers
            .get_mut(irq as usize)
            .ok_or(IrqError::InvalidLine(irq))?;
        if slot.is_some() {
            return Err(IrqError::AlreadyRegistered(irq));
        }
        *slot = Some(handler);
        Ok(())
    }

    /// Whether a handler claimed `irq`.
    pub fn is_registered(&self, irq: u8) -> bool {
        self.handler(irq).is_some()
    }

    fn handler(&self, irq: u8) -> Option<&'static dyn IrqHandler> {
        self.handlers
            .lock_disable_irq()
            .get(irq as usize)
            .copied()
            .flatten()
    }

    /// Run the handler for `ctx.irq`. If nobody claimed the line, or the
    /// handler did not service it, acknowledge it through `controller`.
    ///
    /// The table lock is released before the handler runs.
    pub fn dispatch(&self, ctx: &IrqContext, controller: &dyn InterruptController) {
        let serviced = match self.handler(ctx.irq) {
            Some(handler) => handler.handle_irq(ctx),
            None => IrqReturn::NotHandled,
        };
        if serviced == IrqReturn::NotHandled {
            controller.end_of_interrupt(ctx.irq);
        }
    }
}

impl Default for IrqTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Kernel-wide IRQ table.
static IRQ_TABLE: IrqTable = IrqTable::new();

/// Claim `irq` in the kernel-wide table.
pub fn register(irq: u8, handler: &'static dyn IrqHandler) -> Result<(), IrqError> {
    IRQ_TABLE.register(irq, handler)?;
    log::debug!("IRQ {} claimed", irq);
    Ok(())
}

/// Entry point for the architecture's interrupt stubs.
pub fn dispatch(ctx: &IrqContext) {
    IRQ_TABLE.dispatch(ctx, crate::arch::interrupt_controller());
}
