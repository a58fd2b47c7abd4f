/*
 * Architecture Abstraction Layer
 *
 * Selects the architecture backend once, at compile time, and re-exports it
 * under a single surface so the rest of the kernel never names a backend:
 *
 * - `x86_64`: bare-metal x86_64 (`target_os = "none"`): RFLAGS.IF, the
 *   16550 UART on port I/O, the chained 8259 PICs and the IDT
 * - `hosted`: every other target: a per-thread simulated interrupt flag,
 *   an in-process UART and a counting interrupt controller
 *
 * Both backends provide:
 * - `interrupts::{are_enabled, enable, disable, enable_and_halt}`
 * - `serial::{Port, bring_up}`
 * - `interrupt_controller()`, `init()`, `halt()`
 */

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86_64;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
use self::x86_64 as imp;

#[cfg(not(target_os = "none"))]
pub mod hosted;
#[cfg(not(target_os = "none"))]
use self::hosted as imp;

pub mod interrupts;

pub use imp::serial;
pub use imp::{halt, init, interrupt_controller};
