/*
 * IRQ-Masking Spin Lock
 *
 * A spin lock shared between normal context and interrupt handlers. It must
 * mask interrupts on the current core before taking the lock word;
 * otherwise an interrupt arriving while the lock is held would spin forever
 * in its handler, waiting for code it preempted.
 *
 * Acquire:
 *   1. save the interrupt-enable state and mask interrupts
 *   2. spin on the lock word
 * Release:
 *   1. release the lock word
 *   2. restore exactly the saved interrupt-enable state
 *
 * The lock is not reentrant, has no timeout and no fairness. A holder that
 * never releases hangs every core that tries to take it.
 */

use core::fmt;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use crate::arch::interrupts::{self, IrqState};

/// A spin lock that disables interrupts while held.
///
/// # Examples
/// ```ignore
/// static COUNTER: SpinLock<u64> = SpinLock::new(0);
///
/// {
///     let mut guard = COUNTER.lock_disable_irq();
///     *guard += 1;
/// } // lock released, interrupt state restored
/// ```
pub struct SpinLock<T: ?Sized> {
    inner: spin::Mutex<T>,
}

impl<T> SpinLock<T> {
    /// Creates a new unlocked spin lock. Usable in statics.
    pub const fn new(value: T) -> Self {
        Self {
            inner: spin::Mutex::new(value),
        }
    }

    /// Consumes the lock, returning the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> SpinLock<T> {
    /// Masks interrupts on the current core, then spins until the lock is
    /// acquired.
    ///
    /// The interrupt-enable state that existed before the call travels in
    /// the returned guard and is restored when the guard is dropped.
    pub fn lock_disable_irq(&self) -> SpinLockGuard<'_, T> {
        let irq = interrupts::save_and_disable();
        SpinLockGuard {
            guard: ManuallyDrop::new(self.inner.lock()),
            irq,
        }
    }

    /// Single acquisition attempt. On failure the interrupt state is
    /// restored before returning.
    pub fn try_lock_disable_irq(&self) -> Option<SpinLockGuard<'_, T>> {
        let irq = interrupts::save_and_disable();
        match self.inner.try_lock() {
            Some(guard) => Some(SpinLockGuard {
                guard: ManuallyDrop::new(guard),
                irq,
            }),
            None => {
                interrupts::restore(irq);
                None
            }
        }
    }

    /// Whether some context currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Mutable access without locking; `&mut self` proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_lock_disable_irq() {
            Some(guard) => f.debug_struct("SpinLock").field("data", &&*guard).finish(),
            None => f.write_str("SpinLock { <locked> }"),
        }
    }
}

/// Holds the lock and the saved interrupt-enable state.
pub struct SpinLockGuard<'a, T: ?Sized> {
    guard: ManuallyDrop<spin::MutexGuard<'a, T>>,
    irq: IrqState,
}

impl<T: ?Sized> SpinLockGuard<'_, T> {
    /// Releases the lock and restores the saved interrupt state.
    /// Equivalent to dropping the guard.
    pub fn unlock(self) {
        drop(self);
    }

    /// The interrupt-enable state this guard will restore.
    pub fn saved_irq_state(&self) -> IrqState {
        self.irq
    }
}

impl<T: ?Sized> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: ?Sized> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: ?Sized> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // Lock word first, interrupts second.
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        interrupts::restore(self.irq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_restores_enabled_state() {
        interrupts::enable();
        let lock = SpinLock::new(0u32);
        {
            let mut guard = lock.lock_disable_irq();
            assert!(!interrupts::are_enabled());
            assert!(guard.saved_irq_state().were_enabled());
            *guard += 1;
        }
        assert!(interrupts::are_enabled());
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_lock_restores_disabled_state() {
        interrupts::disable();
        let lock = SpinLock::new(());
        let guard = lock.lock_disable_irq();
        assert!(!interrupts::are_enabled());
        guard.unlock();
        // Interrupts were masked before the lock; they stay masked.
        assert!(!interrupts::are_enabled());
        interrupts::enable();
    }

    #[test]
    fn test_sequential_pairs_restore_each_time() {
        let lock = SpinLock::new(0u8);
        for enabled_before in [true, false, true, true, false] {
            if enabled_before {
                interrupts::enable();
            } else {
                interrupts::disable();
            }
            drop(lock.lock_disable_irq());
            assert_eq!(interrupts::are_enabled(), enabled_before);
        }
        interrupts::enable();
    }

    #[test]
    fn test_try_lock_fails_when_held() {
        interrupts::enable();
        let lock = SpinLock::new(5);
        let held = lock.lock_disable_irq();
        assert!(lock.is_locked());
        // Interrupts are masked by `held`; a failed attempt keeps them so.
        assert!(lock.try_lock_disable_irq().is_none());
        assert!(!interrupts::are_enabled());
        drop(held);
        assert!(interrupts::are_enabled());

        let again = lock.try_lock_disable_irq().expect("lock is free");
        assert_eq!(*again, 5);
    }

    #[test]
    fn test_mutual_exclusion_across_threads() {
        let lock = Arc::new(SpinLock::new(0u64));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        *lock.lock_disable_irq() += 1;
                    }
                    assert!(interrupts::are_enabled());
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker panicked");
        }
        assert_eq!(*lock.lock_disable_irq(), 40_000);
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut lock = SpinLock::new(1);
        *lock.get_mut() = 2;
        assert_eq!(lock.into_inner(), 2);
    }
}
