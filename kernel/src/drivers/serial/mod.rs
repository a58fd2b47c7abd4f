/*
 * Serial Communication Drivers
 *
 * The kernel console lives on the first serial port. This module holds the
 * capability the console driver needs from hardware (`ConsolePort`), the
 * 16550 register driver that provides it on bare metal, and `attach`, which
 * wires a console into the rest of the kernel:
 *
 *   bring up port -> SerialConsole::init -> irq::register -> /dev/ttyS0
 */

use thiserror::Error;

use crate::config::SerialConfig;
use crate::devices::{self, DeviceError};
use crate::irq::{self, InterruptController, IrqError};

pub mod console;
pub mod uart_16550;

pub use console::{ConsoleError, SerialConsole};
pub use uart_16550::SerialPort;

/// Device node name of the serial console.
pub const CONSOLE_DEVICE_NAME: &str = "ttyS0";

/// Byte-level access to a serial line, selected once at boot.
pub trait ConsolePort: Send {
    /// Transmit one byte. May spin until the transmitter has room.
    fn write(&mut self, byte: u8);

    /// Take one received byte, or `None` if the receiver is empty.
    fn try_read(&mut self) -> Option<u8>;
}

/// Errors returned by [`attach`].
#[derive(Debug, Error)]
pub enum AttachError {
    #[error("console: {0}")]
    Console(#[from] ConsoleError),
    #[error("irq: {0}")]
    Irq(#[from] IrqError),
    #[error("device: {0}")]
    Device(#[from] DeviceError),
}

/// Bring up the port described by `config` and make `console` the kernel
/// console: receive interrupts routed to it, registered as `/dev/ttyS0`.
pub fn attach<P: ConsolePort + 'static, const N: usize>(
    console: &'static SerialConsole<P, N>,
    config: &SerialConfig,
    controller: &'static dyn InterruptController,
    bring_up: impl FnOnce(&SerialConfig) -> P,
) -> Result<(), AttachError> {
    console.init(bring_up(config), controller, config.irq)?;
    irq::register(config.irq, console)?;
    devices::register_device(CONSOLE_DEVICE_NAME, console)?;
    log::info!(
        "Serial console on 0x{:x} ({} baud, IRQ {})",
        config.base,
        config.baud,
        config.irq
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irq::IrqContext;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct QueuePort(Arc<Mutex<VecDeque<u8>>>);

    impl ConsolePort for QueuePort {
        fn write(&mut self, _byte: u8) {}

        fn try_read(&mut self) -> Option<u8> {
            self.0.lock().unwrap().pop_front()
        }
    }

    struct Eoi(AtomicUsize);

    impl InterruptController for Eoi {
        fn end_of_interrupt(&self, _irq: u8) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_attach_routes_irq_and_registers_device() {
        static CONSOLE: SerialConsole<QueuePort, 8> = SerialConsole::new();
        static EOI: Eoi = Eoi(AtomicUsize::new(0));

        let wire = Arc::new(Mutex::new(VecDeque::from(b"up".to_vec())));
        let config = SerialConfig {
            irq: 9,
            ..SerialConfig::COM1
        };
        let port_wire = Arc::clone(&wire);
        attach(&CONSOLE, &config, &EOI, |cfg| {
            assert_eq!(cfg.irq, 9);
            QueuePort(port_wire)
        })
        .unwrap();

        irq::dispatch(&IrqContext::new(9));
        assert_eq!(EOI.0.load(Ordering::SeqCst), 1);
        assert_eq!(CONSOLE.read_byte().unwrap(), Some(b'u'));

        let tty = devices::lookup_device(CONSOLE_DEVICE_NAME).expect("ttyS0 registered");
        let mut buf = [0u8; 4];
        assert_eq!(tty.read(&mut buf), Ok(1));
        assert_eq!(buf[0], b'p');

        let again = attach(&CONSOLE, &config, &EOI, |_| QueuePort(Arc::clone(&wire)));
        assert!(matches!(
            again,
            Err(AttachError::Console(ConsoleError::AlreadyInitialized))
        ));
    }
}
