/*
 * Device Filesystem
 *
 * Flat filesystem whose nodes are the registered character devices. It is
 * built from a snapshot of the device table taken when /dev is mounted,
 * after every module initializer has run; devices registered later do not
 * appear.
 */

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use super::{FileSystem, FsError};
use crate::devices::DeviceTable;
use crate::io::Device;

pub struct DevFs {
    nodes: BTreeMap<&'static str, &'static dyn Device>,
}

impl DevFs {
    /// Device filesystem over the devices currently in `table`.
    pub fn new(table: &DeviceTable) -> Self {
        Self {
            nodes: table.snapshot(),
        }
    }

    /// Nodes in name order.
    pub fn nodes(&self) -> impl Iterator<Item = (&'static str, &'static dyn Device)> + '_ {
        self.nodes.iter().map(|(name, dev)| (*name, *dev))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FileSystem for DevFs {
    fn name(&self) -> &str {
        "devfs"
    }

    fn lookup(&self, path: &str) -> Result<&'static dyn Device, FsError> {
        if let Some(dev) = self.nodes.get(path) {
            return Ok(*dev);
        }
        // Device nodes are leaves.
        match path.split_once('/') {
            Some((node, _)) if self.nodes.contains_key(node) => {
                Err(FsError::NotADirectory { path: path.to_owned() })
            }
            _ => Err(FsError::NotFound { path: path.to_owned() }),
        }
    }

    fn entries(&self) -> Vec<&str> {
        self.nodes.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Errno, Stat};

    struct Sink;

    impl Device for Sink {
        fn read(&self, _buf: &mut [u8]) -> Result<usize, Errno> {
            Err(Errno::EAGAIN)
        }

        fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
            Ok(buf.len())
        }

        fn stat(&self) -> Stat {
            Stat::char_device(0o600)
        }
    }

    static SINK: Sink = Sink;

    #[test]
    fn test_snapshot_of_device_table() {
        let table = DeviceTable::new();
        table.register("sink", &SINK).unwrap();
        table.register("tty0", &SINK).unwrap();

        let devfs = DevFs::new(&table);
        table.register("late", &SINK).unwrap();

        assert_eq!(devfs.len(), 2);
        assert_eq!(devfs.entries(), vec!["sink", "tty0"]);
        assert!(devfs.lookup("sink").unwrap().stat().is_char_device());
        assert_eq!(
            devfs.lookup("late").err(),
            Some(FsError::NotFound { path: "late".to_owned() })
        );
        assert_eq!(
            devfs.lookup("tty0/x").err(),
            Some(FsError::NotADirectory { path: "tty0/x".to_owned() })
        );
        let names: Vec<_> = devfs.nodes().map(|(name, _)| name).collect();
        assert_eq!(names, ["sink", "tty0"]);
    }

    #[test]
    fn test_empty_table() {
        let devfs = DevFs::new(&DeviceTable::new());
        assert!(devfs.is_empty());
        assert!(devfs.entries().is_empty());
    }
}
