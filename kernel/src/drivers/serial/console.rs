/*
 * Serial Console
 *
 * Process-wide character device on a serial line, shared between normal
 * context (writers, readers, the logger) and the receive interrupt.
 *
 * - Transmit: `write`/`write_string` forward bytes to the port under the
 *   console lock; a string is one critical section, so the receive
 *   interrupt can never land between two of its bytes.
 * - Receive: the interrupt handler drains the port into the receive ring
 *   buffer until the port is empty or the buffer is full, then sends the
 *   EOI. When the buffer is full the byte just taken from the port is lost.
 * - Poll: `read_byte`/`read`/`poll` consume from the receive buffer.
 *
 * The console starts uninitialized (it is a `static`) and becomes live
 * exactly once through `init`. The live state sits behind a `spin::Once`,
 * so "initialized" is published with release ordering and every reader
 * observes it with acquire ordering. Before `init`, every operation fails
 * with `ConsoleError::NotInitialized` and interrupts are left to the
 * dispatcher to acknowledge.
 */

use spin::Once;
use thiserror::Error;

use super::ConsolePort;
use crate::arch::interrupts;
use crate::config::RX_BUFFER_SIZE;
use crate::io::{Device, Errno, Stat};
use crate::irq::{InterruptController, IrqContext, IrqHandler, IrqReturn};
use crate::sync::SpinLock;
use crate::utils::logger::LogSink;
use crate::utils::RingBuffer;

/// Permission bits of the console device node (crw--w----).
const CONSOLE_PERMISSIONS: u32 = 0o620;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("serial console used before init")]
    NotInitialized,
    #[error("serial console already initialized")]
    AlreadyInitialized,
}

/// Everything the console lock protects.
struct ConsoleState<P, const N: usize> {
    port: P,
    rx: RingBuffer<N>,
}

/// State that exists once the console is initialized.
struct Live<P, const N: usize> {
    state: SpinLock<ConsoleState<P, N>>,
    controller: &'static dyn InterruptController,
    irq: u8,
}

/// Serial console over port `P` with an `N`-byte receive buffer.
pub struct SerialConsole<P, const N: usize = RX_BUFFER_SIZE> {
    live: Once<Live<P, N>>,
}

impl<P: ConsolePort, const N: usize> SerialConsole<P, N> {
    /// An uninitialized console, for use in a `static`.
    pub const fn new() -> Self {
        Self { live: Once::new() }
    }

    /// Bind `port` and `controller` and start accepting receive interrupts
    /// for `irq`. Runs with interrupts masked on the current core.
    ///
    /// Only the first call succeeds; later calls drop their `port` and
    /// return `AlreadyInitialized`.
    pub fn init(
        &self,
        port: P,
        controller: &'static dyn InterruptController,
        irq: u8,
    ) -> Result<(), ConsoleError> {
        let mut first = false;
        interrupts::without_interrupts(|| {
            self.live.call_once(|| {
                first = true;
                Live {
                    state: SpinLock::new(ConsoleState {
                        port,
                        rx: RingBuffer::new(),
                    }),
                    controller,
                    irq,
                }
            });
        });
        if first {
            Ok(())
        } else {
            Err(ConsoleError::AlreadyInitialized)
        }
    }

    /// Whether `init` has completed. False before, true forever after.
    pub fn is_inited(&self) -> bool {
        self.live.is_completed()
    }

    fn live(&self) -> Result<&Live<P, N>, ConsoleError> {
        self.live.get().ok_or(ConsoleError::NotInitialized)
    }

    /// Transmit one byte.
    pub fn write(&self, byte: u8) -> Result<(), ConsoleError> {
        self.live()?.state.lock_disable_irq().port.write(byte);
        Ok(())
    }

    /// Transmit `bytes` in one critical section.
    pub fn write_string(&self, bytes: &[u8]) -> Result<(), ConsoleError> {
        let mut state = self.live()?.state.lock_disable_irq();
        for &byte in bytes {
            state.port.write(byte);
        }
        Ok(())
    }

    /// Take the oldest received byte, if any.
    pub fn read_byte(&self) -> Result<Option<u8>, ConsoleError> {
        Ok(self.live()?.state.lock_disable_irq().rx.consume_one())
    }

    /// Move up to `buf.len()` received bytes into `buf`. Never blocks.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, ConsoleError> {
        Ok(self.live()?.state.lock_disable_irq().rx.consume_into(buf))
    }

    /// Whether received bytes are waiting.
    pub fn poll(&self) -> Result<bool, ConsoleError> {
        Ok(!self.live()?.state.lock_disable_irq().rx.is_empty())
    }
}

impl<P: ConsolePort, const N: usize> Default for SerialConsole<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ConsolePort, const N: usize> IrqHandler for SerialConsole<P, N> {
    fn handle_irq(&self, _ctx: &IrqContext) -> IrqReturn {
        // Not bound to a controller yet; the dispatcher acknowledges.
        let Some(live) = self.live.get() else {
            return IrqReturn::NotHandled;
        };
        {
            let mut guard = live.state.lock_disable_irq();
            let ConsoleState { port, rx } = &mut *guard;
            while let Some(byte) = port.try_read() {
                if rx.produce_one(byte).is_err() {
                    break;
                }
            }
        }
        live.controller.end_of_interrupt(live.irq);
        IrqReturn::Handled
    }
}

impl<P: ConsolePort, const N: usize> Device for SerialConsole<P, N> {
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno> {
        SerialConsole::read(self, buf).map_err(|_| Errno::EIO)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
        self.write_string(buf).map_err(|_| Errno::EIO)?;
        Ok(buf.len())
    }

    fn is_tty(&self) -> bool {
        true
    }

    fn stat(&self) -> Stat {
        Stat::char_device(CONSOLE_PERMISSIONS)
    }
}

impl<P: ConsolePort, const N: usize> LogSink for SerialConsole<P, N> {
    fn write_line(&self, line: &str) {
        // Nowhere to report a console that is not up yet.
        let _ = self.write_string(line.as_bytes());
    }
}
