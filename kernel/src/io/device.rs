/*
 * Device Abstraction Layer
 *
 * Character devices as seen through the device filesystem. A driver
 * registers a `&'static dyn Device` under a node name during boot; the
 * device filesystem then resolves `/dev/<name>` to it.
 *
 * Devices are shared between contexts, so every operation takes `&self`
 * and the implementation does its own locking.
 */

/// Character device interface
pub trait Device: Send + Sync {
    /// Read up to buf.len() bytes into buf
    ///
    /// Never blocks: returns 0 when nothing is available.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Write buf.len() bytes from buf
    ///
    /// Returns the number of bytes written, or an error.
    fn write(&self, buf: &[u8]) -> Result<usize, Errno>;

    /// Check if device is a TTY
    fn is_tty(&self) -> bool {
        false
    }

    /// Get device metadata
    fn stat(&self) -> Stat;
}

/// POSIX errno values
///
/// Subset of standard POSIX error codes the driver core reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Errno {
    ENOENT = 2,  // No such file or directory
    EIO = 5,     // I/O error
    EAGAIN = 11, // Try again
    EBUSY = 16,  // Device or resource busy
    EEXIST = 17, // File exists
    ENOTDIR = 20, // Not a directory
    EINVAL = 22, // Invalid argument
}

/// Minimal stat structure
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub st_mode: u32,    // File type and mode
    pub st_size: u64,    // File size in bytes
    pub st_blksize: u64, // Block size for I/O
}

impl Stat {
    /// Stat of a character device node with `perm` permission bits.
    pub const fn char_device(perm: u32) -> Self {
        Stat {
            st_mode: S_IFCHR | (perm & 0o777),
            st_size: 0,
            st_blksize: 1,
        }
    }

    pub fn is_char_device(&self) -> bool {
        (self.st_mode & S_IFMT) == S_IFCHR
    }
}

// File type constants (POSIX)
pub const S_IFMT: u32 = 0o170000; // File type mask
pub const S_IFCHR: u32 = 0o020000; // Character device
pub const S_IFDIR: u32 = 0o040000; // Directory

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_device_stat() {
        let stat = Stat::char_device(0o620);
        assert!(stat.is_char_device());
        assert_eq!(stat.st_mode & 0o777, 0o620);
        assert!(!Stat::default().is_char_device());
    }

    #[test]
    fn test_char_device_masks_type_bits() {
        let stat = Stat::char_device(S_IFDIR | 0o600);
        assert_eq!(stat.st_mode, S_IFCHR | 0o600);
    }
}
