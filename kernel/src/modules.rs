/*
 * Boot-Time Module Registry
 *
 * Drivers contribute a zero-argument initializer through `module_init!`;
 * the boot code registers those entries, in the order it wants them run,
 * into a `ModuleRegistry`, and the device subsystem runs them.
 *
 * Guarantees:
 * - every registered initializer runs exactly once
 * - initializers run synchronously, in registration order, on the boot CPU
 * - once run, the registry is sealed: later registrations are rejected and
 *   a second run does nothing
 *
 * Initializers cannot report failure. A module that cannot come up logs the
 * reason itself; one whose failure must stop the boot panics, and the
 * "init <name>" debug line printed before each call tells which one it was.
 */

use heapless::Vec;
use thiserror::Error;

use crate::config::MAX_MODULES;

/// Signature of a module initializer.
pub type ModuleInitFn = fn();

/// One registered initializer.
#[derive(Debug, Clone, Copy)]
pub struct ModuleEntry {
    name: &'static str,
    init: ModuleInitFn,
}

impl ModuleEntry {
    /// `name` identifies the entry; it must be unique within a registry.
    pub const fn new(name: &'static str, init: ModuleInitFn) -> Self {
        Self { name, init }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Declare a module initializer.
///
/// ```ignore
/// fn serial_module() { ... }
/// module_init!(SERIAL_MODULE, serial_module);
///
/// registry.register(SERIAL_MODULE)?;
/// ```
///
/// The entry is named after the initializer's full path, which keeps names
/// unique across modules.
#[macro_export]
macro_rules! module_init {
    ($entry:ident, $init:path) => {
        pub static $entry: $crate::modules::ModuleEntry = $crate::modules::ModuleEntry::new(
            concat!(module_path!(), "::", stringify!($init)),
            $init,
        );
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("module registry full ({0} entries)")]
    Full(usize),
    #[error("module registry already ran")]
    Sealed,
    #[error("module {0} registered twice")]
    Duplicate(&'static str),
}

/// Ordered table of up to `N` module initializers.
pub struct ModuleRegistry<const N: usize = MAX_MODULES> {
    entries: Vec<ModuleEntry, N>,
    sealed: bool,
}

impl<const N: usize> ModuleRegistry<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            sealed: false,
        }
    }

    /// Append `entry`; it will run after every entry registered before it.
    pub fn register(&mut self, entry: ModuleEntry) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        if self.entries.iter().any(|e| e.name == entry.name) {
            return Err(RegistryError::Duplicate(entry.name));
        }
        self.entries
            .push(entry)
            .map_err(|_| RegistryError::Full(N))
    }

    /// Run every initializer once, in registration order, and seal the
    /// registry. Returns how many ran; 0 on every call after the first.
    pub fn run_all(&mut self) -> usize {
        if self.sealed {
            return 0;
        }
        self.sealed = true;
        for entry in &self.entries {
            log::debug!("init {}", entry.name);
            (entry.init)();
        }
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Entry names in run order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(ModuleEntry::name)
    }
}

impl<const N: usize> Default for ModuleRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}
