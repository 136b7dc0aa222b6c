// src/core/modules/battery/backend.rs

use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatteryBackendKind {
    #[default]
    Sysfs,
    Upower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Full,
    Unknown,
}

impl BatteryStatus {
    pub fn from_sysfs(raw: &str) -> Self {
        match raw {
            "Charging" => BatteryStatus::Charging,
            "Discharging" => BatteryStatus::Discharging,
            "Full" => BatteryStatus::Full,
            // "Not charging" and friends
            _ => BatteryStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryReading {
    pub percentage: u8,
    pub status: BatteryStatus,
    // Time to empty (discharging) or to full (charging), when the
    // hardware reports enough to estimate it
    pub remaining: Option<Duration>,
}

pub trait BatteryBackend: Send + Sync {
    fn read(&self) -> Result<BatteryReading>;
}
