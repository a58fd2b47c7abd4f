//! Counting interrupt controller.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::irq::{IRQ_LINES, InterruptController};

/// Interrupt controller that records every end-of-interrupt per IRQ line.
pub struct HostedPic {
    eoi: [AtomicUsize; IRQ_LINES],
}

impl HostedPic {
    pub const fn new() -> Self {
        Self {
            eoi: [const { AtomicUsize::new(0) }; IRQ_LINES],
        }
    }

    /// Number of EOIs sent for `irq` so far.
    pub fn eoi_count(&self, irq: u8) -> usize {
        self.eoi
            .get(irq as usize)
            .map_or(0, |count| count.load(Ordering::Acquire))
    }
}

impl Default for HostedPic {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptController for HostedPic {
    fn end_of_interrupt(&self, irq: u8) {
        if let Some(count) = self.eoi.get(irq as usize) {
            count.fetch_add(1, Ordering::AcqRel);
        }
    }
}

/// The hosted platform controller.
pub static PIC: HostedPic = HostedPic::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_line() {
        let pic = HostedPic::new();
        pic.end_of_interrupt(4);
        pic.end_of_interrupt(4);
        pic.end_of_interrupt(1);
        pic.end_of_interrupt(200);
        assert_eq!(pic.eoi_count(4), 2);
        assert_eq!(pic.eoi_count(1), 1);
        assert_eq!(pic.eoi_count(0), 0);
        assert_eq!(pic.eoi_count(200), 0);
    }
}
