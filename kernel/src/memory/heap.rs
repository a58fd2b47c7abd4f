/*
 * Kernel Heap Allocator
 *
 * Uses linked_list_allocator::LockedHeap on top of a static arena in the
 * kernel image.
 */

use core::mem::MaybeUninit;

use linked_list_allocator::LockedHeap;
use spin::Once;

use crate::config::HEAP_SIZE;

/// Global allocator instance
#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Backing memory of the heap.
static mut HEAP_ARENA: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];

static HEAP_READY: Once = Once::new();

/// Initialize the kernel heap. Later calls do nothing.
pub fn init() {
    HEAP_READY.call_once(|| {
        // SAFETY: the arena is handed out exactly once, guarded by HEAP_READY.
        let arena = unsafe { &mut *(&raw mut HEAP_ARENA) };
        ALLOCATOR.lock().init_from_slice(arena);
    });
    log::info!("Kernel heap: {} KiB", HEAP_SIZE / 1024);
}

/// Bytes currently free in the heap.
pub fn free() -> usize {
    ALLOCATOR.lock().free()
}
