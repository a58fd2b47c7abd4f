/*
 * Device Subsystem
 *
 * Boot orchestration of the driver core:
 *
 *   1. run every registered module initializer, once, in order; drivers
 *      register their character devices in the device table as they come up
 *   2. create the device directory (/dev, rwxr-xr-x)
 *   3. mount a device filesystem over the device table on /dev
 *
 * Any failure is returned to the boot code, which treats it as fatal.
 */

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use thiserror::Error;

use crate::config::{DEV_ROOT, DEV_ROOT_PERMISSIONS};
use crate::fs::{DevFs, FileMode, FsError, Vfs};
use crate::io::Device;
use crate::modules::ModuleRegistry;
use crate::sync::SpinLock;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("{op} {path} failed: {source}")]
    FileOperationFailed {
        op: &'static str,
        path: &'static str,
        #[source]
        source: FsError,
    },

    #[error("device filesystem: {0}")]
    Fs(#[from] FsError),

    #[error("device {0} already registered")]
    AlreadyRegistered(&'static str),
}

/// Character devices by node name.
pub struct DeviceTable {
    devices: SpinLock<BTreeMap<&'static str, &'static dyn Device>>,
}

impl DeviceTable {
    pub const fn new() -> Self {
        Self {
            devices: SpinLock::new(BTreeMap::new()),
        }
    }

    /// Add `device` as `name`. Names are unique.
    pub fn register(&self, name: &'static str, device: &'static dyn Device) -> Result<(), DeviceError> {
        let mut devices = self.devices.lock_disable_irq();
        if devices.contains_key(name) {
            return Err(DeviceError::AlreadyRegistered(name));
        }
        devices.insert(name, device);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&'static dyn Device> {
        self.devices.lock_disable_irq().get(name).copied()
    }

    /// Copy of the current table.
    pub fn snapshot(&self) -> BTreeMap<&'static str, &'static dyn Device> {
        self.devices.lock_disable_irq().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.devices.lock_disable_irq().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.lock_disable_irq().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Kernel-wide device table, filled by module initializers.
pub static DEVICE_TABLE: DeviceTable = DeviceTable::new();

/// Register a character device in the kernel-wide table.
pub fn register_device(name: &'static str, device: &'static dyn Device) -> Result<(), DeviceError> {
    DEVICE_TABLE.register(name, device)?;
    log::debug!("device {} registered", name);
    Ok(())
}

/// Look a device up in the kernel-wide table.
pub fn lookup_device(name: &str) -> Option<&'static dyn Device> {
    DEVICE_TABLE.lookup(name)
}

/// Run all module initializers, then publish the kernel-wide device table
/// on /dev through `vfs`.
pub fn init<const N: usize>(registry: &mut ModuleRegistry<N>, vfs: &mut dyn Vfs) -> Result<(), DeviceError> {
    init_with(registry, vfs, &DEVICE_TABLE)
}

/// `init` against an explicit device table.
pub fn init_with<const N: usize>(
    registry: &mut ModuleRegistry<N>,
    vfs: &mut dyn Vfs,
    table: &DeviceTable,
) -> Result<(), DeviceError> {
    let count = registry.run_all();
    log::info!("{} module(s) initialized", count);

    vfs.create_directory(DEV_ROOT, FileMode::directory(DEV_ROOT_PERMISSIONS))
        .map_err(|source| DeviceError::FileOperationFailed {
            op: "mkdir",
            path: DEV_ROOT,
            source,
        })?;

    let devfs = DevFs::new(table);
    let nodes = devfs.len();
    vfs.mount(DEV_ROOT, Box::new(devfs))?;
    log::info!("devfs mounted on {} ({} device(s))", DEV_ROOT, nodes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystem, MountTable};
    use crate::io::{Errno, Stat};
    use crate::modules::ModuleEntry;
    use alloc::borrow::ToOwned;
    use alloc::string::String;
    use std::sync::Mutex;

    struct Zero;

    impl Device for Zero {
        fn read(&self, buf: &mut [u8]) -> Result<usize, Errno> {
            buf.fill(0);
            Ok(buf.len())
        }

        fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
            Ok(buf.len())
        }

        fn stat(&self) -> Stat {
            Stat::char_device(0o666)
        }
    }

    static ZERO: Zero = Zero;

    /// Vfs that records calls and fails the ones it is told to.
    #[derive(Default)]
    struct RecordingVfs {
        calls: Vec<String>,
        fail_mkdir: Option<FsError>,
        fail_mount: Option<FsError>,
        mounted: Option<Box<dyn FileSystem>>,
    }

    impl Vfs for RecordingVfs {
        fn create_directory(&mut self, path: &str, mode: FileMode) -> Result<(), FsError> {
            self.calls.push(format!("mkdir {} {:o}", path, mode.bits()));
            self.fail_mkdir.take().map_or(Ok(()), Err)
        }

        fn mount(&mut self, path: &str, fs: Box<dyn FileSystem>) -> Result<(), FsError> {
            self.calls.push(format!("mount {} {}", fs.name(), path));
            self.mounted = Some(fs);
            self.fail_mount.take().map_or(Ok(()), Err)
        }
    }

    #[test]
    fn test_init_runs_modules_then_mounts() {
        static TABLE: DeviceTable = DeviceTable::new();
        static LOG: Mutex<Vec<&str>> = Mutex::new(Vec::new());

        fn zero_module() {
            LOG.lock().unwrap().push("zero");
            TABLE.register("zero", &ZERO).unwrap();
        }
        fn other_module() {
            LOG.lock().unwrap().push("other");
        }

        let mut registry = ModuleRegistry::<4>::new();
        registry.register(ModuleEntry::new("zero", zero_module)).unwrap();
        registry.register(ModuleEntry::new("other", other_module)).unwrap();

        let mut vfs = RecordingVfs::default();
        init_with(&mut registry, &mut vfs, &TABLE).unwrap();

        assert_eq!(*LOG.lock().unwrap(), ["zero", "other"]);
        assert_eq!(vfs.calls, ["mkdir /dev 40755", "mount devfs /dev"]);
        let devfs = vfs.mounted.expect("devfs mounted");
        assert_eq!(devfs.entries(), ["zero"]);
        assert!(registry.is_sealed());
    }

    #[test]
    fn test_mkdir_failure_is_file_operation_failed() {
        let mut registry = ModuleRegistry::<1>::new();
        let mut vfs = RecordingVfs {
            fail_mkdir: Some(FsError::AlreadyExists { path: "/dev".to_owned() }),
            ..Default::default()
        };
        let err = init_with(&mut registry, &mut vfs, &DeviceTable::new()).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::FileOperationFailed {
                op: "mkdir",
                path: "/dev",
                source: FsError::AlreadyExists { .. },
            }
        ));
        // Nothing is mounted after a failed mkdir.
        assert_eq!(vfs.calls.len(), 1);
    }

    #[test]
    fn test_mount_failure_is_fs_error() {
        let mut registry = ModuleRegistry::<1>::new();
        let mut vfs = RecordingVfs {
            fail_mount: Some(FsError::Busy { path: "/dev".to_owned() }),
            ..Default::default()
        };
        let err = init_with(&mut registry, &mut vfs, &DeviceTable::new()).unwrap_err();
        assert!(matches!(err, DeviceError::Fs(FsError::Busy { .. })));
    }

    #[test]
    fn test_init_against_mount_table() {
        static TABLE: DeviceTable = DeviceTable::new();
        fn zero_module() {
            TABLE.register("zero", &ZERO).unwrap();
        }

        let mut registry = ModuleRegistry::<2>::new();
        registry.register(ModuleEntry::new("zero", zero_module)).unwrap();
        let mut vfs = MountTable::new();
        init_with(&mut registry, &mut vfs, &TABLE).unwrap();

        let mut buf = [0xFF; 3];
        assert_eq!(vfs.open("/dev/zero").unwrap().read(&mut buf), Ok(3));
        assert_eq!(buf, [0; 3]);
        assert_eq!(
            vfs.directory_mode("/dev").map(|mode| mode.permissions()),
            Some(0o755)
        );

        // A second boot pass finds /dev already there.
        let err = init_with(&mut registry, &mut vfs, &TABLE).unwrap_err();
        assert!(matches!(err, DeviceError::FileOperationFailed { .. }));
    }

    #[test]
    fn test_duplicate_device_name() {
        let table = DeviceTable::new();
        table.register("zero", &ZERO).unwrap();
        assert!(matches!(
            table.register("zero", &ZERO),
            Err(DeviceError::AlreadyRegistered("zero"))
        ));
        assert_eq!(table.names(), ["zero"]);
        assert!(table.lookup("zero").is_some());
        assert!(table.lookup("null").is_none());
    }
}
