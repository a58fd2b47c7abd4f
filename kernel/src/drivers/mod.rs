/*
 * Hardware Drivers
 *
 * Drivers are module initializers: each one declares a `module_init!` entry
 * that the device subsystem runs once during boot.
 *
 * Driver categories:
 * - Serial: the 16550 UART and the serial console built on it
 */

pub mod serial;
