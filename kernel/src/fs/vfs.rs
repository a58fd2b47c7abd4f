/*
 * Mount Table
 *
 * The kernel's namespace: a tree of plain directories rooted at "/" and a
 * set of filesystems mounted on some of them. Paths are absolute, with no
 * empty, "." or ".." components and no trailing slash (except "/").
 *
 * A mounted filesystem shadows its mount point: nothing can be created
 * below it through the mount table.
 */

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use super::{FileMode, FileSystem, FsError, Vfs};
use crate::io::Device;

pub struct MountTable {
    directories: BTreeMap<String, FileMode>,
    mounts: BTreeMap<String, Box<dyn FileSystem>>,
}

impl MountTable {
    /// Namespace holding only the root directory.
    pub fn new() -> Self {
        let mut directories = BTreeMap::new();
        directories.insert("/".to_owned(), FileMode::directory(0o755));
        Self {
            directories,
            mounts: BTreeMap::new(),
        }
    }

    /// Resolve a device path such as `/dev/ttyS0`.
    pub fn open(&self, path: &str) -> Result<&'static dyn Device, FsError> {
        let path = validate(path)?;
        match self.mount_for(path) {
            Some((fs, rest)) if !rest.is_empty() => fs.lookup(rest),
            _ => Err(FsError::NotFound { path: path.to_owned() }),
        }
    }

    /// Names directly below the directory `path`.
    pub fn list(&self, path: &str) -> Result<Vec<String>, FsError> {
        let path = validate(path)?;
        if let Some(fs) = self.mounts.get(path) {
            return Ok(fs.entries().into_iter().map(String::from).collect());
        }
        if !self.directories.contains_key(path) {
            return Err(FsError::NotFound { path: path.to_owned() });
        }
        Ok(self
            .directories
            .keys()
            .filter(|dir| dir.as_str() != "/" && parent(dir) == path)
            .filter_map(|dir| dir.rsplit('/').next())
            .map(String::from)
            .collect())
    }

    /// Mode of directory `path`, if it exists.
    pub fn directory_mode(&self, path: &str) -> Option<FileMode> {
        self.directories.get(path).copied()
    }

    /// `(mount point, filesystem name)` of every mount.
    pub fn mounts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mounts
            .iter()
            .map(|(point, fs)| (point.as_str(), fs.name()))
    }

    /// Innermost mount containing `path`, with the remainder of the path
    /// relative to it ("" for the mount point itself).
    fn mount_for<'p>(&self, path: &'p str) -> Option<(&dyn FileSystem, &'p str)> {
        self.mounts
            .iter()
            .filter_map(|(point, fs)| {
                let rest = if point == "/" {
                    path.strip_prefix('/')?
                } else {
                    let rest = path.strip_prefix(point.as_str())?;
                    if rest.is_empty() {
                        rest
                    } else {
                        rest.strip_prefix('/')?
                    }
                };
                Some((point.len(), &**fs, rest))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, fs, rest)| (fs, rest))
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs for MountTable {
    fn create_directory(&mut self, path: &str, mode: FileMode) -> Result<(), FsError> {
        let path = validate(path)?;
        if self.directories.contains_key(path) {
            return Err(FsError::AlreadyExists { path: path.to_owned() });
        }
        let parent = parent(path);
        if !self.directories.contains_key(parent) {
            return Err(FsError::NotFound { path: parent.to_owned() });
        }
        if self.mount_for(path).is_some() {
            return Err(FsError::Busy { path: parent.to_owned() });
        }
        self.directories
            .insert(path.to_owned(), mode.union(FileMode::DIRECTORY));
        Ok(())
    }

    fn mount(&mut self, path: &str, fs: Box<dyn FileSystem>) -> Result<(), FsError> {
        let path = validate(path)?;
        if !self.directories.contains_key(path) {
            return Err(FsError::NotFound { path: path.to_owned() });
        }
        if self.mounts.contains_key(path) {
            return Err(FsError::Busy { path: path.to_owned() });
        }
        log::debug!("mount {} on {}", fs.name(), path);
        self.mounts.insert(path.to_owned(), fs);
        Ok(())
    }
}

fn validate(path: &str) -> Result<&str, FsError> {
    let invalid = || FsError::InvalidPath { path: path.to_owned() };
    if path == "/" {
        return Ok(path);
    }
    let relative = path.strip_prefix('/').ok_or_else(invalid)?;
    if relative
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(invalid());
    }
    Ok(path)
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}
