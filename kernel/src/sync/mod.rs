/*
 * Synchronization Primitives
 *
 * The driver core has exactly one kind of lock: a spin lock that masks
 * interrupts on the current core while held, usable from both normal and
 * interrupt context.
 */

pub mod spinlock;

pub use spinlock::{SpinLock, SpinLockGuard};
