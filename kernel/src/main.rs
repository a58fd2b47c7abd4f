/*
 * CLUU Kernel Main Entry Point
 *
 * Boot sequence of the driver core:
 *
 *   heap -> module registry (logger, serial console) -> devices::init
 *        -> platform (PIC, IDT) -> interrupts on -> idle
 *
 * On bare metal (`target_os = "none"`) the loader jumps to `_start` and the
 * idle loop echoes console input back through /dev/ttyS0. Hosted, `main`
 * runs the same sequence against the simulated platform, feeds a line
 * through the receive interrupt and reads it back from /dev/ttyS0.
 */

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

use cluu_kernel::config::{LOG_LEVEL, SerialConfig};
use cluu_kernel::drivers::serial::{self, SerialConsole};
use cluu_kernel::fs::MountTable;
use cluu_kernel::modules::ModuleRegistry;
use cluu_kernel::utils::logger;
use cluu_kernel::{arch, devices, module_init};

/// The kernel console on COM1.
static CONSOLE: SerialConsole<arch::serial::Port> = SerialConsole::new();

/// Route the `log` facade to the console. Lines logged before the console
/// is attached are dropped.
fn logger_module() {
    // If someone else owns the facade, keep booting without our logger.
    let _ = logger::init(&CONSOLE, LOG_LEVEL);
}
module_init!(LOGGER_MODULE, logger_module);

/// Bring up COM1 and publish it as /dev/ttyS0.
fn console_module() {
    serial::attach(
        &CONSOLE,
        &SerialConfig::COM1,
        arch::interrupt_controller(),
        arch::serial::bring_up,
    )
    .unwrap_or_else(|err| panic!("serial console: {}", err));
    log::info!("CLUU driver core starting...");
}
module_init!(CONSOLE_MODULE, console_module);

/// Run the driver core up to the point where interrupts may be enabled.
fn boot() -> MountTable {
    let mut registry: ModuleRegistry = ModuleRegistry::new();
    for entry in [LOGGER_MODULE, CONSOLE_MODULE] {
        registry
            .register(entry)
            .unwrap_or_else(|err| panic!("module registry: {}", err));
    }

    let mut vfs = MountTable::new();
    devices::init(&mut registry, &mut vfs)
        .unwrap_or_else(|err| panic!("device subsystem: {}", err));

    arch::init();
    vfs
}

/// ===============================
///  BARE-METAL ENTRY POINT
/// ===============================
#[cfg(target_os = "none")]
#[unsafe(no_mangle)]
pub extern "C" fn _start() -> ! {
    cluu_kernel::memory::init();

    let vfs = boot();
    log::info!(
        "Heap: {} KiB free",
        cluu_kernel::memory::heap::free() / 1024
    );

    arch::interrupts::enable();
    log::info!("Interrupts enabled");

    let tty = vfs
        .open("/dev/ttyS0")
        .unwrap_or_else(|err| panic!("console node: {}", err));
    let mut buf = [0u8; 64];
    loop {
        match tty.read(&mut buf) {
            Ok(0) | Err(_) => {
                arch::interrupts::wait_for_interrupt_unless(|| CONSOLE.poll() == Ok(true))
            }
            Ok(n) => {
                let _ = tty.write(&buf[..n]);
            }
        }
    }
}

/// ===============================
///  HOSTED ENTRY POINT
/// ===============================
#[cfg(not(target_os = "none"))]
fn main() {
    use cluu_kernel::config::COM1_IRQ;
    use cluu_kernel::irq::{self, IrqContext};

    let vfs = boot();
    arch::interrupts::enable();

    arch::serial::inject(b"hello, ttyS0");
    irq::dispatch(&IrqContext::new(COM1_IRQ));

    let tty = vfs
        .open("/dev/ttyS0")
        .unwrap_or_else(|err| panic!("console node: {}", err));
    let mut buf = [0u8; 64];
    let n = tty.read(&mut buf).unwrap_or(0);
    log::info!(
        "ttyS0 received {:?}",
        core::str::from_utf8(&buf[..n]).unwrap_or("<binary>")
    );

    for (point, fs) in vfs.mounts() {
        log::info!("{} mounted on {}", fs, point);
    }
    for name in vfs.list("/dev").unwrap_or_default() {
        log::info!("  /dev/{}", name);
    }
}

///  PANIC HANDLER
/// ===============================
///
/// Logging may fail early, but this is safe once the logger is up.
///
#[cfg(target_os = "none")]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    arch::interrupts::disable();

    if let Some(location) = info.location() {
        log::error!(
            "PANIC at {}:{}: {}",
            location.file(),
            location.line(),
            info.message()
        );
    } else {
        log::error!("PANIC: {}", info.message());
    }

    loop {
        arch::halt();
    }
}
