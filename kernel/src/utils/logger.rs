/*
 * Kernel Logging System
 *
 * `log` backend for the kernel. Records are formatted as
 *
 *     [LEVEL] message
 *
 * into a fixed-size line buffer and handed to the log sink in one call, so
 * a line reaches the serial console as a single critical section and is
 * never interleaved with another writer. Lines longer than LOG_LINE_MAX are
 * truncated; nothing is allocated.
 *
 * The sink is whatever the boot code hands to `init` (the serial console).
 * Records logged before `init` are dropped.
 *
 * Interrupt handlers must not log: formatting is too slow for IRQ context
 * and the sink takes the same lock the handler may already hold.
 */

use core::fmt::Write;

use heapless::String;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::Once;

use crate::config::LOG_LINE_MAX;

/// Destination of formatted log lines.
pub trait LogSink: Sync {
    /// Emit one complete line (including the trailing newline).
    fn write_line(&self, line: &str);
}

/// Logger handing every enabled record to the installed sink.
struct KernelLogger {
    sink: Once<&'static dyn LogSink>,
}

impl log::Log for KernelLogger {
    /// Checks if the given log level is enabled.
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = self.sink.get() {
            sink.write_line(&format_line(record));
        }
    }

    /// Every line is written synchronously.
    fn flush(&self) {}
}

/// The KernelLogger instance used for logging.
static LOGGER: KernelLogger = KernelLogger { sink: Once::new() };

/// Install the kernel logger writing to `sink` at `level`.
///
/// Fails if a logger (this one or another) is already installed; the sink
/// of an already installed kernel logger is not replaced.
pub fn init(sink: &'static dyn LogSink, level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.sink.call_once(|| sink);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Line buffer that keeps one byte free for the newline and truncates
/// (at a char boundary) whatever does not fit.
struct LineWriter {
    line: String<LOG_LINE_MAX>,
}

impl Write for LineWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let room = LOG_LINE_MAX - 1 - self.line.len();
        if s.len() <= room {
            return self.line.push_str(s).map_err(|_| core::fmt::Error);
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        let _ = self.line.push_str(&s[..cut]);
        Err(core::fmt::Error)
    }
}

/// Format `record` as one newline-terminated line, truncating as needed.
fn format_line(record: &Record) -> String<LOG_LINE_MAX> {
    let mut writer = LineWriter { line: String::new() };
    // Err only means the line was truncated.
    let _ = write!(writer, "[{}] {}", record.level(), record.args());
    let _ = writer.line.push('\n');
    writer.line
}
