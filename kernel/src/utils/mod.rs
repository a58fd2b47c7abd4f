/*
 * Kernel Utilities
 *
 * - ring_buffer: fixed-capacity byte FIFO
 * - logger: `log` backend that writes whole lines to a log sink
 */

pub mod logger;
pub mod ring_buffer;

pub use ring_buffer::{BufferFull, RingBuffer};
