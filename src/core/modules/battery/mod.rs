// src/core/modules/battery/mod.rs

//! Battery status module and its backends

pub mod backend;
pub mod module;
pub mod sysfs_backend;
pub mod upower_backend;

// Expose the module and backend types at the top level
pub use backend::{BatteryBackend, BatteryBackendKind, BatteryReading, BatteryStatus};
pub use module::BatteryModule;
pub use sysfs_backend::SysfsBackend;
pub use upower_backend::UpowerBackend;
