/*
 * Kernel Configuration
 *
 * Compile-time constants for the driver core. None of these are runtime
 * tunables: the console always lives on COM1 at 115200 baud, and the device
 * directory is always /dev.
 */

use log::LevelFilter;

/// Base I/O port of the first serial port (COM1).
pub const COM1_BASE: u16 = 0x3F8;

/// Legacy IRQ line wired to COM1.
pub const COM1_IRQ: u8 = 4;

/// Console line speed.
pub const CONSOLE_BAUD: u32 = 115_200;

/// 16550 input clock divided by 16 (1.8432 MHz / 16).
pub const UART_CLOCK_HZ: u32 = 115_200;

/// Capacity of the console receive buffer in bytes.
pub const RX_BUFFER_SIZE: usize = 256;

/// Maximum number of boot-time module initializers.
pub const MAX_MODULES: usize = 32;

/// Mount point of the device filesystem.
pub const DEV_ROOT: &str = "/dev";

/// Permission bits of the device directory (rwxr-xr-x).
pub const DEV_ROOT_PERMISSIONS: u32 = 0o755;

/// Vector offsets of the remapped 8259 PICs.
pub const PIC_1_OFFSET: u8 = 32;
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

/// Size of the bare-metal kernel heap (1 MiB).
pub const HEAP_SIZE: usize = 1024 * 1024;

/// Longest log line emitted in one piece; longer records are truncated.
pub const LOG_LINE_MAX: usize = 256;

/// Kernel log level.
#[cfg(feature = "log-debug")]
pub const LOG_LEVEL: LevelFilter = LevelFilter::Debug;
#[cfg(not(feature = "log-debug"))]
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Fixed line configuration of a serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Base I/O port.
    pub base: u16,
    /// Line speed in baud.
    pub baud: u32,
    /// IRQ line raised when data is received.
    pub irq: u8,
}

impl SerialConfig {
    /// The kernel console: COM1, 115200 baud, IRQ 4.
    pub const COM1: SerialConfig = SerialConfig {
        base: COM1_BASE,
        baud: CONSOLE_BAUD,
        irq: COM1_IRQ,
    };

    /// Baud rate divisor programmed into the DLL/DLM registers.
    ///
    /// Clamped to what the registers can hold: a zero or too-fast rate
    /// gives 1, a rate too slow for 16 bits gives `u16::MAX`.
    pub const fn divisor(&self) -> u16 {
        match UART_CLOCK_HZ.checked_div(self.baud) {
            None | Some(0) => 1,
            Some(d) if d > u16::MAX as u32 => u16::MAX,
            Some(d) => d as u16,
        }
    }
}
