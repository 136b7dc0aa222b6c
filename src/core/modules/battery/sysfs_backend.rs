// src/core/modules/battery/sysfs_backend.rs

use super::backend::{BatteryBackend, BatteryReading, BatteryStatus};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn power_supply_base() -> PathBuf {
    std::env::var_os("SYS_POWER_SUPPLY_BASE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/sys/class/power_supply"))
}

// Reads battery info from Linux sysfs. The `all` instance aggregates
// every supply of type Battery; a numeric instance selects `BAT<n>`.
pub struct SysfsBackend {
    paths: Vec<PathBuf>,
}

impl SysfsBackend {
    pub fn discover(instance: &str) -> Result<Self> {
        Self::discover_in(&power_supply_base(), instance)
    }

    pub fn discover_in(base: &Path, instance: &str) -> Result<Self> {
        let mut batteries = Vec::new();
        for entry in fs::read_dir(base).with_context(|| format!("Reading {}", base.display()))? {
            let path = entry?.path();
            let type_file = path.join("type");
            if !type_file.exists() {
                continue;
            }
            let typ = fs::read_to_string(&type_file)
                .with_context(|| format!("Reading {}", type_file.display()))?;
            if typ.trim() == "Battery" {
                batteries.push(path);
            }
        }
        batteries.sort();

        let paths = match instance {
            "all" => batteries,
            other => {
                let wanted = match other.parse::<u32>() {
                    Ok(n) => format!("BAT{n}"),
                    Err(_) => other.to_string(),
                };
                batteries
                    .into_iter()
                    .filter(|p| p.file_name().and_then(|n| n.to_str()) == Some(wanted.as_str()))
                    .collect()
            }
        };
        if paths.is_empty() {
            anyhow::bail!(
                "No battery supply matching `{instance}` in {}",
                base.display()
            );
        }

        Ok(Self { paths })
    }

    fn read_one(path: &Path) -> Result<SupplyReading> {
        let capacity: u8 = read_trimmed(&path.join("capacity"))?
            .parse()
            .with_context(|| format!("Parsing capacity from {}", path.display()))?;
        let status = BatteryStatus::from_sysfs(&read_trimmed(&path.join("status"))?);

        // energy_now is in µWh and power_now in µW; charge-based supplies
        // report charge_now/current_now instead, with the same ratio
        let energy = read_micro(&path.join("energy_now"))
            .or_else(|| read_micro(&path.join("charge_now")));
        let rate = read_micro(&path.join("power_now"))
            .or_else(|| read_micro(&path.join("current_now")));
        let capacity_full = read_micro(&path.join("energy_full"))
            .or_else(|| read_micro(&path.join("charge_full")));

        Ok(SupplyReading {
            capacity,
            status,
            energy,
            rate,
            capacity_full,
        })
    }
}

struct SupplyReading {
    capacity: u8,
    status: BatteryStatus,
    energy: Option<u64>,
    rate: Option<u64>,
    capacity_full: Option<u64>,
}

fn read_trimmed(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)
        .with_context(|| format!("Reading sysfs file {}", path.display()))?
        .trim()
        .to_string())
}

fn read_micro(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

impl BatteryBackend for SysfsBackend {
    fn read(&self) -> Result<BatteryReading> {
        let mut readings = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            readings.push(SysfsBackend::read_one(path)?);
        }

        let percentage = (readings.iter().map(|r| r.capacity as u32).sum::<u32>()
            / readings.len() as u32) as u8;

        let status = if readings.iter().any(|r| r.status == BatteryStatus::Charging) {
            BatteryStatus::Charging
        } else if readings
            .iter()
            .any(|r| r.status == BatteryStatus::Discharging)
        {
            BatteryStatus::Discharging
        } else if readings.iter().all(|r| r.status == BatteryStatus::Full) {
            BatteryStatus::Full
        } else {
            BatteryStatus::Unknown
        };

        let remaining = estimate_remaining(&readings, status);

        Ok(BatteryReading {
            percentage,
            status,
            remaining,
        })
    }
}

// Remaining time from summed energy and drain/charge rate across supplies
fn estimate_remaining(readings: &[SupplyReading], status: BatteryStatus) -> Option<Duration> {
    let rate: u64 = readings.iter().map(|r| r.rate.unwrap_or(0)).sum();
    if rate == 0 {
        return None;
    }
    let energy: u64 = readings.iter().map(|r| r.energy.unwrap_or(0)).sum();
    let hours = match status {
        BatteryStatus::Discharging => energy as f64 / rate as f64,
        BatteryStatus::Charging => {
            let full: u64 = readings.iter().map(|r| r.capacity_full.unwrap_or(0)).sum();
            if full <= energy {
                return None;
            }
            (full - energy) as f64 / rate as f64
        }
        _ => return None,
    };
    Some(Duration::from_secs((hours * 3600.0) as u64))
}
