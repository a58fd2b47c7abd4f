/*
 * CLUU Driver Core
 *
 * The driver and initialization core of the CLUU kernel: the serial console
 * shared between normal and interrupt context, the boot-time module
 * registry, the device subsystem that mounts the device filesystem, and the
 * architecture shim that binds all of it to real hardware or to the hosted
 * simulation.
 *
 * Build modes:
 * - `target_os = "none"`: bare-metal x86_64, `no_std`
 * - anything else: hosted, links `std`; the architecture shim swaps the
 *   CPU interrupt flag and the UART for in-process stand-ins so the same
 *   code runs under `cargo test`
 */

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod devices;
pub mod drivers;
pub mod fs;
pub mod io;
pub mod irq;
#[cfg(target_os = "none")]
pub mod memory;
#[macro_use]
pub mod modules;
pub mod sync;
pub mod utils;
