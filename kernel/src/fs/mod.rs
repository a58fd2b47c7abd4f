/*
 * File System Support
 *
 * The driver core needs just enough of a filesystem to publish devices:
 * - `Vfs`: the two namespace operations boot code performs (create a
 *   directory, mount a filesystem on it)
 * - `FileSystem`: a mountable filesystem that resolves names to devices
 * - vfs::MountTable: the in-kernel `Vfs`
 * - devfs::DevFs: the device filesystem mounted at /dev
 */

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use bitflags::bitflags;
use thiserror::Error;

use crate::io::{self, Device, Errno};

pub mod devfs;
pub mod vfs;

pub use devfs::DevFs;
pub use vfs::MountTable;

/// Filesystem error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("File already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Mount point busy: {path}")]
    Busy { path: String },
}

impl FsError {
    /// POSIX errno equivalent.
    pub fn errno(&self) -> Errno {
        match self {
            FsError::NotFound { .. } => Errno::ENOENT,
            FsError::AlreadyExists { .. } => Errno::EEXIST,
            FsError::NotADirectory { .. } => Errno::ENOTDIR,
            FsError::InvalidPath { .. } => Errno::EINVAL,
            FsError::Busy { .. } => Errno::EBUSY,
        }
    }
}

bitflags! {
    /// File type and permission bits, POSIX layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileMode: u32 {
        const DIRECTORY = io::S_IFDIR;
        const CHAR_DEVICE = io::S_IFCHR;

        const USER_READ = 0o400;
        const USER_WRITE = 0o200;
        const USER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHER_READ = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC = 0o001;
    }
}

impl FileMode {
    /// Directory with permission bits `perm`.
    pub const fn directory(perm: u32) -> Self {
        Self::DIRECTORY.union(Self::from_bits_truncate(perm & 0o777))
    }

    pub fn permissions(&self) -> u32 {
        self.bits() & 0o777
    }

    pub fn is_dir(&self) -> bool {
        self.contains(Self::DIRECTORY)
    }
}

/// A mountable filesystem.
pub trait FileSystem: Send + Sync {
    /// Filesystem type name ("devfs").
    fn name(&self) -> &str;

    /// Resolve `path`, relative to the mount point, to a device.
    fn lookup(&self, path: &str) -> Result<&'static dyn Device, FsError>;

    /// Names in the filesystem root.
    fn entries(&self) -> Vec<&str>;
}

/// Namespace operations used at boot.
pub trait Vfs {
    /// Create directory `path` with `mode`. The parent must exist.
    fn create_directory(&mut self, path: &str, mode: FileMode) -> Result<(), FsError>;

    /// Mount `fs` on the existing directory `path`.
    fn mount(&mut self, path: &str, fs: Box<dyn FileSystem>) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_mode() {
        let mode = FileMode::directory(0o755);
        assert!(mode.is_dir());
        assert_eq!(mode.permissions(), 0o755);
        assert_eq!(mode.bits(), io::S_IFDIR | 0o755);
        assert!(!FileMode::CHAR_DEVICE.is_dir());
    }

    #[test]
    fn test_errno_mapping() {
        let path = String::from("/dev");
        assert_eq!(FsError::NotFound { path: path.clone() }.errno(), Errno::ENOENT);
        assert_eq!(FsError::AlreadyExists { path: path.clone() }.errno(), Errno::EEXIST);
        assert_eq!(FsError::Busy { path }.errno(), Errno::EBUSY);
    }
}
