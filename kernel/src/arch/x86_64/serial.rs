//! The 16550 UART on x86 port I/O.

use crate::config::SerialConfig;
use crate::drivers::serial::uart_16550::SerialPort;
use crate::io::Pio;

/// Console port type on bare-metal x86_64.
pub type Port = SerialPort<Pio<u8>>;

/// Program the UART at `config.base` for `config.baud` with the receive
/// interrupt enabled.
pub fn bring_up(config: &SerialConfig) -> Port {
    let mut port = SerialPort::<Pio<u8>>::new(config.base);
    port.init(config.divisor());
    port
}
