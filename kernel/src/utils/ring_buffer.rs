/*
 * Fixed-Capacity Byte Ring Buffer
 *
 * FIFO byte queue over an inline backing array, used as the receive buffer
 * of the serial console.
 *
 * Design:
 * - Capacity fixed at compile time, never grows
 * - Explicit element count, so full and empty are distinguishable without
 *   sacrificing a slot
 * - No overwrite on overflow: a produce into a full buffer fails and the
 *   buffer is left untouched
 *
 * Not synchronized: the owner wraps it in a lock.
 */

use thiserror::Error;

/// A produce was attempted while the buffer held `capacity` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer full")]
pub struct BufferFull;

/// Ring buffer of `N` bytes.
pub struct RingBuffer<const N: usize> {
    storage: [u8; N],
    /// Index of the oldest byte.
    head: usize,
    /// Index the next byte is written to.
    tail: usize,
    count: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create a new empty ring buffer
    pub const fn new() -> Self {
        Self::from_storage([0; N])
    }

    /// Empty queue over caller-provided backing storage.
    ///
    /// Previous contents of `storage` are not part of the queue.
    pub const fn from_storage(storage: [u8; N]) -> Self {
        Self {
            storage,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Append `byte` at the tail.
    pub fn produce_one(&mut self, byte: u8) -> Result<(), BufferFull> {
        if self.count == N {
            return Err(BufferFull);
        }
        self.storage[self.tail] = byte;
        self.tail = (self.tail + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Remove and return the byte at the head, or `None` if empty.
    pub fn consume_one(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }
        let byte = self.storage[self.head];
        self.head = (self.head + 1) % N;
        self.count -= 1;
        Some(byte)
    }

    /// Drain up to `dest.len()` bytes into `dest`, returning how many.
    pub fn consume_into(&mut self, dest: &mut [u8]) -> usize {
        let mut read = 0;
        for slot in dest.iter_mut() {
            match self.consume_one() {
                Some(byte) => {
                    *slot = byte;
                    read += 1;
                }
                None => break,
            }
        }
        read
    }

    /// Drop all queued bytes.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Get the number of bytes currently in the buffer
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for RingBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("len", &self.count)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices<const N: usize>(rb: &RingBuffer<N>) -> (usize, usize, usize) {
        (rb.head, rb.tail, rb.count)
    }

    #[test]
    fn test_capacity_four_scenario() {
        let mut rb = RingBuffer::<4>::new();
        for byte in *b"abcd" {
            assert_eq!(rb.produce_one(byte), Ok(()));
        }
        assert!(rb.is_full());
        assert_eq!(rb.produce_one(b'e'), Err(BufferFull));

        let drained: Vec<u8> = (0..4).filter_map(|_| rb.consume_one()).collect();
        assert_eq!(drained, b"abcd");
        assert_eq!(rb.consume_one(), None);
    }

    #[test]
    fn test_full_produce_leaves_state_unchanged() {
        let mut rb = RingBuffer::<3>::new();
        rb.produce_one(1).unwrap();
        rb.consume_one();
        for byte in [2, 3, 4] {
            rb.produce_one(byte).unwrap();
        }
        let before = indices(&rb);
        assert_eq!(rb.produce_one(9), Err(BufferFull));
        assert_eq!(indices(&rb), before);
        assert_eq!(rb.consume_one(), Some(2));
        assert_eq!(rb.consume_one(), Some(3));
        assert_eq!(rb.consume_one(), Some(4));
    }

    #[test]
    fn test_empty_consume_leaves_state_unchanged() {
        let mut rb = RingBuffer::<8>::new();
        rb.produce_one(7).unwrap();
        rb.consume_one();
        let before = indices(&rb);
        assert_eq!(rb.consume_one(), None);
        assert_eq!(indices(&rb), before);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_fifo_across_wrap() {
        let mut rb = RingBuffer::<5>::new();
        let mut expected = Vec::new();
        let mut seen = Vec::new();
        // Interleave produce/consume so head and tail wrap several times.
        for round in 0u8..20 {
            for i in 0..3 {
                let byte = round.wrapping_mul(3).wrapping_add(i);
                if rb.produce_one(byte).is_ok() {
                    expected.push(byte);
                }
            }
            for _ in 0..2 {
                if let Some(byte) = rb.consume_one() {
                    seen.push(byte);
                }
            }
            assert!(rb.head < 5 && rb.tail < 5);
            assert!(rb.len() <= rb.capacity());
        }
        while let Some(byte) = rb.consume_one() {
            seen.push(byte);
        }
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_fifo_law_up_to_capacity() {
        for n in 0..=16usize {
            let mut rb = RingBuffer::<16>::new();
            let input: Vec<u8> = (0..n as u8).map(|b| b ^ 0x5A).collect();
            for &byte in &input {
                rb.produce_one(byte).unwrap();
            }
            let output: Vec<u8> = (0..n).map(|_| rb.consume_one().unwrap()).collect();
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_from_storage_starts_empty() {
        let mut rb = RingBuffer::from_storage([0xFF; 2]);
        assert_eq!(rb.capacity(), 2);
        assert_eq!(rb.consume_one(), None);
        rb.produce_one(1).unwrap();
        rb.produce_one(2).unwrap();
        assert_eq!(rb.produce_one(3), Err(BufferFull));
    }

    #[test]
    fn test_consume_into_and_clear() {
        let mut rb = RingBuffer::<8>::new();
        for byte in *b"hello" {
            rb.produce_one(byte).unwrap();
        }
        let mut buf = [0u8; 3];
        assert_eq!(rb.consume_into(&mut buf), 3);
        assert_eq!(&buf, b"hel");
        rb.clear();
        assert!(rb.is_empty());
        assert_eq!(rb.consume_into(&mut buf), 0);
    }
}
