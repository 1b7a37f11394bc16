//! D-Bus backend for the service manager seam.
//!
//! Uses zbus for type-safe D-Bus communication with systemd and the bus
//! broker itself. Selected with `install.backend = "dbus"` or `--backend dbus`.

pub mod systemd;

pub use systemd::DbusManager;
