/*
 * Memory Management
 *
 * The driver core only needs a kernel heap: the device table, the mount
 * table and the device filesystem allocate. Paging is left as the loader
 * set it up.
 */

pub mod heap;

/// Bring up the kernel heap. Must run before anything allocates.
pub fn init() {
    heap::init();
}
