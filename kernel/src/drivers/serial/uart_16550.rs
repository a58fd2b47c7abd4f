/*
 * 16550 UART Driver
 *
 * Register-level driver for the PC serial port, written against the `Io`
 * register trait so the same code drives real port I/O on x86 and a fake
 * register bank in tests.
 */

use bitflags::bitflags;

#[cfg(target_arch = "x86_64")]
use crate::io::Pio;
use crate::io::{Io, ReadOnly};

use super::ConsolePort;

bitflags! {
    /// Interrupt enable flags
    struct IntEnFlags: u8 {
        const RECEIVED = 1;
        const SENT = 1 << 1;
        const ERRORED = 1 << 2;
        const STATUS_CHANGE = 1 << 3;
        // 4 to 7 are unused
    }
}

bitflags! {
    /// Line control flags
    struct LineCtrlFlags: u8 {
        /// 8 data bits, no parity, 1 stop bit
        const DATA_8N1 = 0b11;
        /// Divisor latch access: data/int_en address DLL/DLM
        const DLAB = 1 << 7;
    }
}

bitflags! {
    /// Line status flags
    struct LineStsFlags: u8 {
        const INPUT_FULL = 1;
        // 1 to 4 unknown
        const OUTPUT_EMPTY = 1 << 5;
        // 6 and 7 unknown
    }
}

/// FIFO enabled, both FIFOs cleared, 14-byte receive trigger.
const FIFO_ENABLE_CLEAR_14: u8 = 0xC7;

/// DTR, RTS and OUT2 (OUT2 gates the IRQ line on PC hardware).
const MODEM_DTR_RTS_OUT2: u8 = 0x0B;

/// Serial port representation.
pub struct SerialPort<T: Io> {
    data: T,            // Data register, read to receive, write to send
    int_en: T,          // Interrupt enable
    fifo_ctrl: T,       // FIFO control
    line_ctrl: T,       // Line control
    modem_ctrl: T,      // Modem control
    line_sts: ReadOnly<T>,  // Line status
}

#[cfg(target_arch = "x86_64")]
impl SerialPort<Pio<u8>> {
    /// Serial port whose registers start at I/O port `base`.
    pub const fn new(base: u16) -> SerialPort<Pio<u8>> {
        SerialPort {
            data: Pio::new(base),
            int_en: Pio::new(base + 1),
            fifo_ctrl: Pio::new(base + 2),
            line_ctrl: Pio::new(base + 3),
            modem_ctrl: Pio::new(base + 4),
            line_sts: ReadOnly::new(Pio::new(base + 5)),
        }
    }
}

impl<T: Io> SerialPort<T>
where
    T::Value: From<u8> + TryInto<u8>,
{
    /// Serial port over arbitrary registers; `reg(offset)` builds the
    /// register at `offset` from the port base.
    pub fn from_registers(mut reg: impl FnMut(u16) -> T) -> Self {
        SerialPort {
            data: reg(0),
            int_en: reg(1),
            fifo_ctrl: reg(2),
            line_ctrl: reg(3),
            modem_ctrl: reg(4),
            line_sts: ReadOnly::new(reg(5)),
        }
    }

    /// Program the line for 8N1 at `divisor` with FIFOs on and only the
    /// receive interrupt enabled.
    pub fn init(&mut self, divisor: u16) {
        let [divisor_lo, divisor_hi] = divisor.to_le_bytes();

        self.int_en.write(0x00.into());
        self.line_ctrl.write(LineCtrlFlags::DLAB.bits().into());
        self.data.write(divisor_lo.into());
        self.int_en.write(divisor_hi.into());
        self.line_ctrl.write(LineCtrlFlags::DATA_8N1.bits().into());
        self.fifo_ctrl.write(FIFO_ENABLE_CLEAR_14.into());
        self.modem_ctrl.write(MODEM_DTR_RTS_OUT2.into());
        self.int_en.write(IntEnFlags::RECEIVED.bits().into());
    }

    /// Retrieves the line status flags.
    fn line_sts(&self) -> LineStsFlags {
        LineStsFlags::from_bits_truncate(
            (self.line_sts.read() & 0xFF.into())
                .try_into()
                .unwrap_or(0),
        )
    }

    /// Take one byte from the receive FIFO, if any.
    pub fn receive(&mut self) -> Option<u8> {
        if self.line_sts().contains(LineStsFlags::INPUT_FULL) {
            Some(
                (self.data.read() & 0xFF.into())
                    .try_into()
                    .unwrap_or(0),
            )
        } else {
            None
        }
    }

    /// Sends a raw byte, waiting for the transmitter to drain.
    pub fn send(&mut self, data: u8) {
        while !self.line_sts().contains(LineStsFlags::OUTPUT_EMPTY) {
            core::hint::spin_loop();
        }
        self.data.write(data.into())
    }

    /// Writes a byte, translating newline and backspace for terminals.
    pub fn write(&mut self, b: u8) {
        match b {
            8 | 0x7F => {
                self.send(8);
                self.send(b' ');
                self.send(8);
            }
            b'\n' => {
                self.send(b'\r');
                self.send(b'\n');
            }
            _ => {
                self.send(b);
            }
        }
    }
}

impl<T: Io + Send> ConsolePort for SerialPort<T>
where
    T::Value: From<u8> + TryInto<u8>,
{
    fn write(&mut self, byte: u8) {
        SerialPort::write(self, byte);
    }

    fn try_read(&mut self) -> Option<u8> {
        self.receive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Register file of a fake 16550: records writes, serves reads from a
    /// receive queue, transmitter always empty.
    #[derive(Default)]
    struct Bank {
        writes: Vec<(u16, u8)>,
        rx: VecDeque<u8>,
    }

    struct FakeReg {
        offset: u16,
        bank: Arc<Mutex<Bank>>,
    }

    impl Io for FakeReg {
        type Value = u8;

        fn read(&self) -> u8 {
            let mut bank = self.bank.lock().unwrap();
            match self.offset {
                0 => bank.rx.pop_front().unwrap_or(0),
                5 => {
                    let mut sts = LineStsFlags::OUTPUT_EMPTY;
                    if !bank.rx.is_empty() {
                        sts |= LineStsFlags::INPUT_FULL;
                    }
                    sts.bits()
                }
                _ => 0,
            }
        }

        fn write(&mut self, value: u8) {
            self.bank.lock().unwrap().writes.push((self.offset, value));
        }
    }

    fn fake_port() -> (SerialPort<FakeReg>, Arc<Mutex<Bank>>) {
        let bank = Arc::new(Mutex::new(Bank::default()));
        let port = SerialPort::from_registers(|offset| FakeReg {
            offset,
            bank: Arc::clone(&bank),
        });
        (port, bank)
    }

    #[test]
    fn test_init_programs_divisor_and_rx_interrupt() {
        let (mut port, bank) = fake_port();
        port.init(3);
        let writes = bank.lock().unwrap().writes.clone();
        assert_eq!(
            writes,
            vec![
                (1, 0x00),
                (3, 0x80),
                (0, 0x03),
                (1, 0x00),
                (3, 0x03),
                (2, 0xC7),
                (4, 0x0B),
                (1, 0x01),
            ]
        );
    }

    #[test]
    fn test_receive_drains_fifo() {
        let (mut port, bank) = fake_port();
        bank.lock().unwrap().rx.extend(*b"ok");
        assert_eq!(port.try_read(), Some(b'o'));
        assert_eq!(port.try_read(), Some(b'k'));
        assert_eq!(port.try_read(), None);
    }

    #[test]
    fn test_write_translates_newline_and_backspace() {
        let (mut port, bank) = fake_port();
        ConsolePort::write(&mut port, b'a');
        ConsolePort::write(&mut port, b'\n');
        ConsolePort::write(&mut port, 0x7F);
        let sent: Vec<u8> = bank
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(offset, _)| *offset == 0)
            .map(|&(_, value)| value)
            .collect();
        assert_eq!(sent, vec![b'a', b'\r', b'\n', 8, b' ', 8]);
    }
}
