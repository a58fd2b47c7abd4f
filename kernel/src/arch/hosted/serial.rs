//! In-process UART: transmit goes to stdout, receive comes from a FIFO
//! filled by [`inject`].

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::config::SerialConfig;
use crate::drivers::serial::ConsolePort;

/// Receive FIFO shared by every hosted port.
static RX_FIFO: Mutex<VecDeque<u8>> = Mutex::new(VecDeque::new());

/// Queue bytes as if they had arrived on the wire.
///
/// The caller raises the receive interrupt itself (`irq::dispatch`).
pub fn inject(bytes: &[u8]) {
    RX_FIFO
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .extend(bytes.iter().copied());
}

/// Number of received bytes not yet read by the driver.
pub fn pending() -> usize {
    RX_FIFO.lock().unwrap_or_else(PoisonError::into_inner).len()
}

/// Hosted serial port.
#[derive(Debug)]
pub struct Port {
    base: u16,
}

impl Port {
    pub fn base(&self) -> u16 {
        self.base
    }
}

/// Bring up the port described by `config`.
pub fn bring_up(config: &SerialConfig) -> Port {
    log::debug!(
        "Hosted UART at 0x{:x}, {} baud, IRQ {}",
        config.base,
        config.baud,
        config.irq
    );
    Port { base: config.base }
}

impl ConsolePort for Port {
    fn write(&mut self, byte: u8) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout has nowhere to report to.
        let _ = stdout.write_all(&[byte]);
        if byte == b'\n' {
            let _ = stdout.flush();
        }
    }

    fn try_read(&mut self) -> Option<u8> {
        RX_FIFO
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}
